//! Budget caps CRUD - spending ceiling of one budget post within one budget

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{require_positive, Entity};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCap {
    pub id: i64,
    pub budgets_id: i64,
    pub budget_posts_id: i64,
    pub amount: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetCapInput {
    pub budgets_id: i64,
    pub budget_posts_id: i64,
    pub amount: f64,
}

impl Entity for BudgetCap {
    type Input = BudgetCapInput;

    const KIND: EntityKind = EntityKind::BudgetCaps;
    const COLUMNS: &'static str = "id, budgets_id, budget_posts_id, amount, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            budgets_id: row.get("budgets_id")?,
            budget_posts_id: row.get("budget_posts_id")?,
            amount: row.get("amount")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn validate(input: &BudgetCapInput) -> Result<()> {
        require_positive(input.amount, "amount")
    }

    fn references(input: &BudgetCapInput) -> Vec<(EntityKind, i64)> {
        vec![
            (EntityKind::Budgets, input.budgets_id),
            (EntityKind::BudgetPosts, input.budget_posts_id),
        ]
    }

    fn insert(conn: &Connection, input: &BudgetCapInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO budget_caps (budgets_id, budget_posts_id, amount) VALUES (?1, ?2, ?3)",
            params![input.budgets_id, input.budget_posts_id, input.amount],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &BudgetCapInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE budget_caps SET budgets_id = ?1, budget_posts_id = ?2, amount = ?3, updated_at = datetime('now') WHERE id = ?4",
            params![input.budgets_id, input.budget_posts_id, input.amount, id],
        )?)
    }
}
