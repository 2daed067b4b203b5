//! Per-view candidate set with last-issued-wins fetch resolution.

use crate::model::Batchmate;

/// Identifies one fetch issued for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchToken(u64);

/// Candidate records held by one view.
///
/// Each fetch takes a token from [`begin`](Self::begin). A response is
/// applied only if its token is the newest issued, so a slow early fetch can
/// never overwrite the result of a later one. Failed fetches leave the
/// current set untouched.
///
/// This is the hook for interactive front ends that keep a view open across
/// overlapping fetches. The REST server and the CLI answer one request at a
/// time and do not hold one.
#[derive(Debug, Default)]
pub struct CandidateBuffer {
    records: Vec<Batchmate>,
    issued: u64,
    applied: Option<u64>,
    loading: bool,
}

impl CandidateBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for a new fetch.
    pub fn begin(&mut self) -> FetchToken {
        self.issued += 1;
        self.loading = true;
        FetchToken(self.issued)
    }

    /// Apply a completed fetch. Returns `false` if the response was stale.
    pub fn complete(&mut self, token: FetchToken, records: Vec<Batchmate>) -> bool {
        if token.0 != self.issued {
            tracing::debug!(token = token.0, latest = self.issued, "discarding stale fetch");
            return false;
        }
        self.records = records;
        self.applied = Some(token.0);
        self.loading = false;
        true
    }

    /// Record a failed fetch. The previous set stays in place.
    pub fn fail(&mut self, token: FetchToken) {
        if token.0 == self.issued {
            self.loading = false;
        }
    }

    pub fn records(&self) -> &[Batchmate] {
        &self.records
    }

    /// Whether the newest fetch is still outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether any fetch has ever been applied.
    pub fn is_loaded(&self) -> bool {
        self.applied.is_some()
    }

    /// Drop the held records, e.g. on logout.
    pub fn clear(&mut self) {
        self.records.clear();
        self.applied = None;
        self.loading = false;
    }
}
