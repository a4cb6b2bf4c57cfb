//! Ports for wheel specification and bogie checksheet persistence.
//!
//! Form numbers are unique per record kind. Adapters rely on the store's
//! unique constraint, not a prior lookup, and report the losing writer as
//! [`MaintenanceRepositoryError::DuplicateFormNumber`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    BogieChecksheet, BogieChecksheetFilter, FormNumber, RecordStatus, WheelSpecification,
    WheelSpecificationFilter,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by maintenance record repository adapters.
    pub enum MaintenanceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "maintenance repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "maintenance repository query failed: {message}",
        /// Another record already uses the form number.
        DuplicateFormNumber { form_number: String } =>
            "form number {form_number} already exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WheelSpecificationRepository: Send + Sync {
    async fn create(&self, record: &WheelSpecification) -> Result<(), MaintenanceRepositoryError>;

    async fn find_by_form_number(
        &self,
        form_number: &FormNumber,
    ) -> Result<Option<WheelSpecification>, MaintenanceRepositoryError>;

    /// List matching records newest first.
    async fn list(
        &self,
        filter: &WheelSpecificationFilter,
    ) -> Result<Vec<WheelSpecification>, MaintenanceRepositoryError>;

    /// Compare-and-set the status; returns `false` when the stored status no
    /// longer equals `expected`.
    async fn transition(
        &self,
        form_number: &FormNumber,
        expected: RecordStatus,
        next: RecordStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, MaintenanceRepositoryError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BogieChecksheetRepository: Send + Sync {
    async fn create(&self, record: &BogieChecksheet) -> Result<(), MaintenanceRepositoryError>;

    async fn find_by_form_number(
        &self,
        form_number: &FormNumber,
    ) -> Result<Option<BogieChecksheet>, MaintenanceRepositoryError>;

    /// List matching records newest first.
    async fn list(
        &self,
        filter: &BogieChecksheetFilter,
    ) -> Result<Vec<BogieChecksheet>, MaintenanceRepositoryError>;

    /// Compare-and-set the status; returns `false` when the stored status no
    /// longer equals `expected`.
    async fn transition(
        &self,
        form_number: &FormNumber,
        expected: RecordStatus,
        next: RecordStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, MaintenanceRepositoryError>;
}
