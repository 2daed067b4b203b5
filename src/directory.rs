//! Directory service: scoped reads and authorized writes over a backend.

use std::sync::Arc;

use crate::acl::{authorize_write, resolve_scope, Principal};
use crate::cms::{BatchmateBackend, CmsFilters};
use crate::error::{AccessError, CmsError, Result};
use crate::model::{Batchmate, BatchmateData, BatchmatePatch, EngineeringField};
use crate::search::{search_owned, FilterCriteria};
use crate::views::{
    available_countries, DashboardStats, FullView, Listing, ListingQuery, Report, ReportRequest,
};

/// Batchmate directory bound to a backend.
///
/// Every call takes the acting principal explicitly. Reads push what they
/// can down to the backend and re-apply scope and criteria in memory, so the
/// result never depends on how faithfully the backend filtered.
pub struct Directory<B: ?Sized = dyn BatchmateBackend> {
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for Directory<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<B: BatchmateBackend + ?Sized> Directory<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch the principal's candidate set.
    pub async fn load(&self, principal: Option<&Principal>) -> Result<Vec<Batchmate>> {
        self.search(principal, &FilterCriteria::default(), None)
            .await
    }

    /// Fetch and filter records visible to the principal.
    pub async fn search(
        &self,
        principal: Option<&Principal>,
        criteria: &FilterCriteria,
        free_text: Option<&str>,
    ) -> Result<Vec<Batchmate>> {
        let scope = resolve_scope(principal);
        if scope.is_empty() {
            return Ok(Vec::new());
        }

        let criteria = criteria.clone().normalized();
        let filters = CmsFilters::scoped(criteria.clone(), &scope);
        let fetched = self.backend.list(&filters).await?;
        let results = search_owned(&fetched, &scope, &criteria, free_text);

        tracing::debug!(
            fetched = fetched.len(),
            matched = results.len(),
            active_filters = criteria.active().count(),
            "directory search"
        );
        Ok(results)
    }

    /// Dashboard numbers. Per-field counts cover the whole directory, so the
    /// fetch is not narrowed by scope.
    pub async fn dashboard(
        &self,
        principal: Option<&Principal>,
        recent_limit: usize,
    ) -> Result<DashboardStats> {
        let principal = principal.ok_or(AccessError::Unauthenticated)?;
        let all = self.backend.list(&CmsFilters::default()).await?;
        Ok(DashboardStats::compute(
            &all,
            &resolve_scope(Some(principal)),
            recent_limit,
        ))
    }

    /// Listing page: matching rows with edit flags, plus country choices
    /// drawn from every accessible record.
    pub async fn listing(
        &self,
        principal: Option<&Principal>,
        query: &ListingQuery,
        limit: usize,
    ) -> Result<Listing> {
        let accessible = self.load(principal).await?;
        Ok(Listing::build(&accessible, principal, query, limit))
    }

    /// Per-field browsing. Asking for a field outside scope is forbidden.
    pub async fn full_view(
        &self,
        principal: Option<&Principal>,
        field: EngineeringField,
        criteria: &FilterCriteria,
    ) -> Result<FullView> {
        let principal = principal.ok_or(AccessError::Unauthenticated)?;
        let scope = resolve_scope(Some(principal));
        if !scope.allows_field(field) {
            return Err(AccessError::Forbidden(format!("{} records are outside your scope", field)).into());
        }
        let accessible = self.load(Some(principal)).await?;
        Ok(crate::views::full_view(&accessible, &scope, field, criteria))
    }

    /// Country choices for the principal's records.
    pub async fn countries(&self, principal: Option<&Principal>) -> Result<Vec<String>> {
        Ok(available_countries(&self.load(principal).await?))
    }

    pub async fn report(
        &self,
        principal: Option<&Principal>,
        request: &ReportRequest,
        country_stats_limit: usize,
    ) -> Result<Report> {
        let scope = resolve_scope(principal);
        let accessible = self.load(principal).await?;
        Ok(Report::generate(
            &accessible,
            &scope,
            request,
            country_stats_limit,
        ))
    }

    /// Fetch one record. Records outside the principal's scope are reported
    /// as not found.
    pub async fn get(&self, principal: Option<&Principal>, key: &str) -> Result<Batchmate> {
        let principal = principal.ok_or(AccessError::Unauthenticated)?;
        let record = self.backend.get(key).await?;
        if !resolve_scope(Some(principal)).matches(&record) {
            tracing::debug!(%principal, key, "read outside scope hidden");
            return Err(CmsError::NotFound(format!("batchmate {}", key)).into());
        }
        Ok(record)
    }

    /// Validate and create a record in a field the principal may edit.
    pub async fn create(
        &self,
        principal: Option<&Principal>,
        data: &BatchmateData,
    ) -> Result<Batchmate> {
        authorize_write(principal, data.field)?;
        data.validate()?;
        self.backend.create(data).await
    }

    /// Validate and apply a partial update.
    ///
    /// Moving a record to another field requires edit rights on both the
    /// current and the new field.
    pub async fn update(
        &self,
        principal: Option<&Principal>,
        key: &str,
        patch: &BatchmatePatch,
    ) -> Result<Batchmate> {
        let existing = self.get_for_write(principal, key).await?;
        if let Some(field) = patch.field.filter(|f| *f != existing.field) {
            authorize_write(principal, field)?;
        }
        patch.validate()?;
        self.backend.update(existing.key(), patch).await
    }

    pub async fn delete(&self, principal: Option<&Principal>, key: &str) -> Result<()> {
        let existing = self.get_for_write(principal, key).await?;
        self.backend.delete(existing.key()).await
    }

    async fn get_for_write(&self, principal: Option<&Principal>, key: &str) -> Result<Batchmate> {
        let principal = principal.ok_or(AccessError::Unauthenticated)?;
        let existing = self.backend.get(key).await?;
        authorize_write(Some(principal), existing.field)?;
        Ok(existing)
    }
}
