//! Fund requests CRUD

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{invalid, require_filled, require_positive, Entity};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FundRequest {
    pub id: i64,
    pub budget_posts_id: i64,
    pub date: String,
    #[serde(rename = "type")]
    pub request_type: String,
    pub amount: f64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FundRequestInput {
    pub budget_posts_id: i64,
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub request_type: String,
    pub amount: f64,
    pub status: String,
}

impl FundRequestInput {
    fn date_text(&self) -> Option<String> {
        self.date.map(|d| d.to_rfc3339())
    }
}

impl Entity for FundRequest {
    type Input = FundRequestInput;

    const KIND: EntityKind = EntityKind::FundRequests;
    const COLUMNS: &'static str =
        "id, budget_posts_id, date, type, amount, status, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            budget_posts_id: row.get("budget_posts_id")?,
            date: row.get("date")?,
            request_type: row.get("type")?,
            amount: row.get("amount")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn validate(input: &FundRequestInput) -> Result<()> {
        if input.budget_posts_id <= 0 {
            return Err(invalid("budget posts id must be filled"));
        }
        if input.date.is_none() {
            return Err(invalid("date must be filled"));
        }
        require_filled(&input.request_type, "type")?;
        require_positive(input.amount, "amount")?;
        require_filled(&input.status, "status")
    }

    fn references(input: &FundRequestInput) -> Vec<(EntityKind, i64)> {
        vec![(EntityKind::BudgetPosts, input.budget_posts_id)]
    }

    fn insert(conn: &Connection, input: &FundRequestInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO fund_requests (budget_posts_id, date, type, amount, status) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.budget_posts_id,
                input.date_text(),
                input.request_type,
                input.amount,
                input.status,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &FundRequestInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE fund_requests SET budget_posts_id = ?1, date = ?2, type = ?3, amount = ?4, status = ?5, \
             updated_at = datetime('now') WHERE id = ?6",
            params![
                input.budget_posts_id,
                input.date_text(),
                input.request_type,
                input.amount,
                input.status,
                id,
            ],
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_type_keyword() {
        let input: FundRequestInput = serde_json::from_str(
            r#"{"budget_posts_id": 2, "date": "2024-03-01T08:00:00Z", "type": "advance", "amount": 1500, "status": "open"}"#,
        )
        .unwrap();
        assert_eq!(input.request_type, "advance");
        assert!(FundRequest::validate(&input).is_ok());
    }

    #[test]
    fn malformed_date_fails_decoding() {
        let result: std::result::Result<FundRequestInput, _> =
            serde_json::from_str(r#"{"date": "yesterday"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn rules_in_order() {
        let input = FundRequestInput::default();
        assert_eq!(
            FundRequest::validate(&input).unwrap_err().to_string(),
            "budget posts id must be filled"
        );

        let input = FundRequestInput {
            budget_posts_id: 2,
            ..Default::default()
        };
        assert_eq!(FundRequest::validate(&input).unwrap_err().to_string(), "date must be filled");
    }
}
