//! REST API for the alumni directory.
//!
//! Exposes scoped search, record CRUD, dashboard and reports to a front end.
//! Every handler resolves the caller's scope from its session token.

mod handlers;
mod rest;

pub use handlers::*;
pub use rest::*;
