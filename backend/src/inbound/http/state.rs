//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AuthService, FormCatalogue, MaintenanceRecords, SubmissionWorkflow, UserDirectory,
};

/// Dependency bundle for HTTP handlers; build it with a struct literal.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserDirectory>,
    pub forms: Arc<dyn FormCatalogue>,
    pub submissions: Arc<dyn SubmissionWorkflow>,
    pub maintenance: Arc<dyn MaintenanceRecords>,
}
