//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, token signing) expose strongly typed
//! errors so adapters map their failures into predictable variants. Driving
//! ports (use-cases) return the API-facing [`crate::domain::Error`].

mod macros;
pub(crate) use macros::define_port_error;

mod auth_service;
mod form_catalogue;
mod form_repository;
mod maintenance_records;
mod maintenance_repository;
mod password_hasher;
mod readiness_probe;
mod refresh_token_repository;
mod submission_repository;
mod submission_workflow;
mod token_codec;
mod user_directory;
mod user_repository;

#[cfg(test)]
pub use auth_service::MockAuthService;
pub use auth_service::{AuthGrant, AuthService};
#[cfg(test)]
pub use form_catalogue::MockFormCatalogue;
pub use form_catalogue::FormCatalogue;
#[cfg(test)]
pub use form_repository::MockFormRepository;
pub use form_repository::{FormRepository, FormRepositoryError};
#[cfg(test)]
pub use maintenance_records::MockMaintenanceRecords;
pub use maintenance_records::MaintenanceRecords;
#[cfg(test)]
pub use maintenance_repository::{
    MockBogieChecksheetRepository, MockWheelSpecificationRepository,
};
pub use maintenance_repository::{
    BogieChecksheetRepository, MaintenanceRepositoryError, WheelSpecificationRepository,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use readiness_probe::MockReadinessProbe;
pub use readiness_probe::{ReadinessProbe, ReadinessProbeError};
#[cfg(test)]
pub use refresh_token_repository::MockRefreshTokenRepository;
pub use refresh_token_repository::{RefreshTokenRepository, RefreshTokenRepositoryError};
#[cfg(test)]
pub use submission_repository::MockSubmissionRepository;
pub use submission_repository::{SubmissionRepository, SubmissionRepositoryError};
#[cfg(test)]
pub use submission_workflow::MockSubmissionWorkflow;
pub use submission_workflow::{ReviewRequest, SubmissionWorkflow};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenCodecError};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{NewAccountRequest, UserDirectory};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{AccountFlags, StoredCredentials, UserPersistenceError, UserRepository};
