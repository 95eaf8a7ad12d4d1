//! SQLite entity store
//!
//! One table per entity. Foreign-key columns are plain integers; whether a
//! referenced row exists is checked by [`crate::integrity`] before every
//! write, not by SQL constraints.
//!
//! ## Tables
//!
//! - `activities`, `budgets`, `budget_posts` - reference data
//! - `budget_caps` - budget × post ceilings
//! - `budget_details`, `budget_details_posts` - planned spending lines
//! - `budget_details_posts_recommendations` - reviewer recommendations
//! - `fund_requests`, `fund_request_details` - disbursement requests
//! - `users` - login accounts

pub mod schema;
pub mod entity;
pub mod lookup;
pub mod activities;
pub mod budgets;
pub mod budget_posts;
pub mod budget_caps;
pub mod budget_details;
pub mod budget_details_posts;
pub mod recommendations;
pub mod fund_requests;
pub mod fund_request_details;
pub mod users;

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{BackofficeError, Result};

/// SQLite database shared by all services
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database file
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening SQLite database at {:?}", path);

        let conn = Connection::open(path)?;

        // WAL for concurrent readers
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory SQLite database");

        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;

        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.with_conn(schema::init_schema)
    }

    /// Run `f` with the connection held
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| BackofficeError::Internal(format!("Lock poisoned: {}", e)))?;
        f(&conn)
    }
}

// Re-exports
pub use activities::{Activity, ActivityInput};
pub use budget_caps::{BudgetCap, BudgetCapInput};
pub use budget_details::{BudgetDetail, BudgetDetailInput};
pub use budget_details_posts::{BudgetDetailPost, BudgetDetailPostInput};
pub use budget_posts::{BudgetPost, BudgetPostInput};
pub use budgets::{Budget, BudgetInput};
pub use entity::{Entity, StatusFlag};
pub use fund_request_details::{FundRequestDetail, FundRequestDetailInput};
pub use fund_requests::{FundRequest, FundRequestInput};
pub use recommendations::{Recommendation, RecommendationInput};
pub use users::UserRow;
