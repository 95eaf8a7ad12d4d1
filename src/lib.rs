//! Budget Backoffice - budgeting back-office API
//!
//! CRUD over budgets, budget posts, caps, planned details and fund requests,
//! served as JSON envelopes behind bearer-token authentication.
//!
//! ## Architecture
//!
//! ```text
//! hyper (http) ─▶ EntityService<E> (services) ─▶ verify_keys (integrity)
//!                                             └▶ entity store (db, SQLite)
//!          └─▶ AuditLogger (logging)
//! ```
//!
//! Every write first resolves the foreign keys it names, and for updates and
//! deletes its own id, against their tables. A missing row aborts the write
//! with an entity-named message; a failing lookup aborts it with a generic
//! database error.
//!
//! ## Storage Layout
//!
//! ```text
//! ./
//! ├── budget.db                       # SQLite (WAL)
//! └── log/
//!     └── log_20240301_081500.log     # day-rotated audit log
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod integrity;
pub mod logging;
pub mod services;

pub use error::{BackofficeError, Result};
