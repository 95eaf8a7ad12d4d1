//! Logging
//!
//! Diagnostics go through `tracing`; the audit trail of handled requests is
//! written by [`AuditLogger`].

pub mod audit;

pub use audit::{redact, AuditConfig, AuditLogger, RequestRecord};
