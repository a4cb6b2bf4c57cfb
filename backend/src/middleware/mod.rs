//! Request middleware.
//!
//! [`Trace`] gives every request a correlation id that error bodies and the
//! `trace-id` response header share.

pub mod trace;

pub use trace::Trace;
