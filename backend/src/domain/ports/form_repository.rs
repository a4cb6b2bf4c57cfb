//! Port for form definition persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Form, FormId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by form repository adapters.
    pub enum FormRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "form repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "form repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Store a form and its fields in one transaction.
    async fn create(&self, form: &Form) -> Result<(), FormRepositoryError>;

    /// Fetch a form with its fields in display order.
    async fn find_by_id(&self, id: &FormId) -> Result<Option<Form>, FormRepositoryError>;

    /// List forms newest first, optionally including inactive ones.
    async fn list(&self, include_inactive: bool) -> Result<Vec<Form>, FormRepositoryError>;

    /// Toggle whether a form accepts submissions. Returns `false` when the
    /// form does not exist.
    async fn set_active(
        &self,
        id: &FormId,
        is_active: bool,
        at: DateTime<Utc>,
    ) -> Result<bool, FormRepositoryError>;
}
