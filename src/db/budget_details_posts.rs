//! Budget detail posts CRUD - allocation of a detail line to a budget post

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{require_positive, require_positive_id, Entity};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetDetailPost {
    pub id: i64,
    pub budget_details_id: i64,
    pub budget_posts_id: i64,
    pub planned_amount: f64,
    pub approved_amount: f64,
    pub usage_amount: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetDetailPostInput {
    pub budget_details_id: i64,
    pub budget_posts_id: i64,
    pub planned_amount: f64,
    pub approved_amount: f64,
    pub usage_amount: f64,
}

impl Entity for BudgetDetailPost {
    type Input = BudgetDetailPostInput;

    const KIND: EntityKind = EntityKind::BudgetDetailsPosts;
    const COLUMNS: &'static str = "id, budget_details_id, budget_posts_id, planned_amount, approved_amount, \
                                   usage_amount, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            budget_details_id: row.get("budget_details_id")?,
            budget_posts_id: row.get("budget_posts_id")?,
            planned_amount: row.get("planned_amount")?,
            approved_amount: row.get("approved_amount")?,
            usage_amount: row.get("usage_amount")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn validate(input: &BudgetDetailPostInput) -> Result<()> {
        require_positive_id(input.budget_details_id, "budget details id")?;
        require_positive_id(input.budget_posts_id, "budget post id")?;
        require_positive(input.planned_amount, "planned amount")?;
        require_positive(input.approved_amount, "approved amount")?;
        require_positive(input.usage_amount, "usage amount")
    }

    fn references(input: &BudgetDetailPostInput) -> Vec<(EntityKind, i64)> {
        vec![
            (EntityKind::BudgetDetails, input.budget_details_id),
            (EntityKind::BudgetPosts, input.budget_posts_id),
        ]
    }

    fn insert(conn: &Connection, input: &BudgetDetailPostInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO budget_details_posts (budget_details_id, budget_posts_id, planned_amount, approved_amount, usage_amount) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.budget_details_id,
                input.budget_posts_id,
                input.planned_amount,
                input.approved_amount,
                input.usage_amount,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &BudgetDetailPostInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE budget_details_posts SET budget_details_id = ?1, budget_posts_id = ?2, planned_amount = ?3, \
             approved_amount = ?4, usage_amount = ?5, updated_at = datetime('now') WHERE id = ?6",
            params![
                input.budget_details_id,
                input.budget_posts_id,
                input.planned_amount,
                input.approved_amount,
                input.usage_amount,
                id,
            ],
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_checked_in_order() {
        let mut input = BudgetDetailPostInput {
            budget_details_id: 1,
            budget_posts_id: 1,
            planned_amount: 10.0,
            approved_amount: 0.0,
            usage_amount: 0.0,
        };
        assert_eq!(
            BudgetDetailPost::validate(&input).unwrap_err().to_string(),
            "approved amount must be greater than 0"
        );

        input.budget_posts_id = 0;
        assert_eq!(
            BudgetDetailPost::validate(&input).unwrap_err().to_string(),
            "budget post id must be greater than 0"
        );
    }
}
