//! Budget details CRUD - planned activity lines of a budget

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{require_filled, Entity};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetDetail {
    pub id: i64,
    pub budgets_id: i64,
    pub activities_id: i64,
    pub description: String,
    pub target: Option<String>,
    pub quantity: f64,
    pub unit_value: f64,
    pub total: f64,
    pub terms: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BudgetDetailInput {
    pub budgets_id: i64,
    pub activities_id: i64,
    pub description: String,
    pub target: Option<DateTime<Utc>>,
    pub quantity: f64,
    pub unit_value: f64,
    pub total: f64,
    pub terms: f64,
}

impl Entity for BudgetDetail {
    type Input = BudgetDetailInput;

    const KIND: EntityKind = EntityKind::BudgetDetails;
    const COLUMNS: &'static str = "id, budgets_id, activities_id, description, target, quantity, unit_value, \
                                   total, terms, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            budgets_id: row.get("budgets_id")?,
            activities_id: row.get("activities_id")?,
            description: row.get("description")?,
            target: row.get("target")?,
            quantity: row.get("quantity")?,
            unit_value: row.get("unit_value")?,
            total: row.get("total")?,
            terms: row.get("terms")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn validate(input: &BudgetDetailInput) -> Result<()> {
        require_filled(&input.description, "description")
    }

    fn references(input: &BudgetDetailInput) -> Vec<(EntityKind, i64)> {
        vec![
            (EntityKind::Budgets, input.budgets_id),
            (EntityKind::Activities, input.activities_id),
        ]
    }

    fn insert(conn: &Connection, input: &BudgetDetailInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO budget_details (budgets_id, activities_id, description, target, quantity, unit_value, total, terms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                input.budgets_id,
                input.activities_id,
                input.description,
                input.target.map(|t| t.to_rfc3339()),
                input.quantity,
                input.unit_value,
                input.total,
                input.terms,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &BudgetDetailInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE budget_details SET budgets_id = ?1, activities_id = ?2, description = ?3, target = ?4, quantity = ?5, \
             unit_value = ?6, total = ?7, terms = ?8, updated_at = datetime('now') WHERE id = ?9",
            params![
                input.budgets_id,
                input.activities_id,
                input.description,
                input.target.map(|t| t.to_rfc3339()),
                input.quantity,
                input.unit_value,
                input.total,
                input.terms,
                id,
            ],
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_is_optional_rfc3339() {
        let input: BudgetDetailInput = serde_json::from_str(
            r#"{"budgets_id": 1, "activities_id": 2, "description": "Travel", "target": "2024-06-30T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(input.target.is_some());
        assert!(BudgetDetail::validate(&input).is_ok());

        let input: BudgetDetailInput = serde_json::from_str(r#"{"description": ""}"#).unwrap();
        assert!(input.target.is_none());
        assert_eq!(
            BudgetDetail::validate(&input).unwrap_err().to_string(),
            "description must be filled"
        );
    }

    #[test]
    fn references_budget_then_activity() {
        let input = BudgetDetailInput {
            budgets_id: 4,
            activities_id: 9,
            ..Default::default()
        };
        assert_eq!(
            BudgetDetail::references(&input),
            vec![(EntityKind::Budgets, 4), (EntityKind::Activities, 9)]
        );
    }
}
