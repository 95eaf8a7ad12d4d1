//! Fund request details CRUD

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{require_filled, require_positive, require_positive_id, Entity};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundRequestDetail {
    pub id: i64,
    pub fund_requests_id: i64,
    pub activities_id: i64,
    pub budget_details_id: i64,
    pub amount: f64,
    pub recommendation: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FundRequestDetailInput {
    pub fund_requests_id: i64,
    pub activities_id: i64,
    pub budget_details_id: i64,
    pub amount: f64,
    pub recommendation: String,
}

impl Entity for FundRequestDetail {
    type Input = FundRequestDetailInput;

    const KIND: EntityKind = EntityKind::FundRequestDetails;
    const COLUMNS: &'static str = "id, fund_requests_id, activities_id, budget_details_id, amount, recommendation, \
                                   created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            fund_requests_id: row.get("fund_requests_id")?,
            activities_id: row.get("activities_id")?,
            budget_details_id: row.get("budget_details_id")?,
            amount: row.get("amount")?,
            recommendation: row.get("recommendation")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn validate(input: &FundRequestDetailInput) -> Result<()> {
        require_positive_id(input.fund_requests_id, "fund requests id")?;
        require_positive_id(input.activities_id, "activities id")?;
        require_positive_id(input.budget_details_id, "budget details id")?;
        require_positive(input.amount, "amount")?;
        require_filled(&input.recommendation, "recommendation")
    }

    fn references(input: &FundRequestDetailInput) -> Vec<(EntityKind, i64)> {
        vec![
            (EntityKind::FundRequests, input.fund_requests_id),
            (EntityKind::Activities, input.activities_id),
            (EntityKind::BudgetDetails, input.budget_details_id),
        ]
    }

    fn insert(conn: &Connection, input: &FundRequestDetailInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO fund_request_details (fund_requests_id, activities_id, budget_details_id, amount, recommendation) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.fund_requests_id,
                input.activities_id,
                input.budget_details_id,
                input.amount,
                input.recommendation,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &FundRequestDetailInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE fund_request_details SET fund_requests_id = ?1, activities_id = ?2, budget_details_id = ?3, \
             amount = ?4, recommendation = ?5, updated_at = datetime('now') WHERE id = ?6",
            params![
                input.fund_requests_id,
                input.activities_id,
                input.budget_details_id,
                input.amount,
                input.recommendation,
                id,
            ],
        )?)
    }
}
