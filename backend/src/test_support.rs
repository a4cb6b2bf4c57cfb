//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for unit tests and behind
//! the `test-support` feature.

pub mod clock;
pub mod fixtures;
pub mod memory;
pub mod security;

pub use clock::MutableClock;
pub use memory::{
    InMemoryBogieChecksheetRepository, InMemoryFormRepository, InMemoryRefreshTokenRepository,
    InMemorySubmissionRepository, InMemoryUserRepository, InMemoryWheelSpecificationRepository,
};
pub use security::{PlainTextHasher, TransparentTokenCodec};
