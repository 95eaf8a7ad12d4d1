//! Budget detail post recommendations CRUD

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::entity::{require_positive_id, Entity};
use crate::error::Result;
use crate::integrity::EntityKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: i64,
    pub budget_details_posts_id: i64,
    /// Reviewing group; groups live outside this service
    pub user_groups_id: i64,
    pub recommendation: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecommendationInput {
    pub budget_details_posts_id: i64,
    pub user_groups_id: i64,
    pub recommendation: i64,
}

impl Entity for Recommendation {
    type Input = RecommendationInput;

    const KIND: EntityKind = EntityKind::BudgetDetailsPostsRecommendations;
    const COLUMNS: &'static str =
        "id, budget_details_posts_id, user_groups_id, recommendation, created_at, updated_at";

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            budget_details_posts_id: row.get("budget_details_posts_id")?,
            user_groups_id: row.get("user_groups_id")?,
            recommendation: row.get("recommendation")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn validate(input: &RecommendationInput) -> Result<()> {
        require_positive_id(input.budget_details_posts_id, "budget details posts id")?;
        require_positive_id(input.user_groups_id, "user groups id")?;
        require_positive_id(input.recommendation, "recommendation")
    }

    fn references(input: &RecommendationInput) -> Vec<(EntityKind, i64)> {
        vec![(EntityKind::BudgetDetailsPosts, input.budget_details_posts_id)]
    }

    fn insert(conn: &Connection, input: &RecommendationInput) -> Result<i64> {
        conn.execute(
            "INSERT INTO budget_details_posts_recommendations (budget_details_posts_id, user_groups_id, recommendation) \
             VALUES (?1, ?2, ?3)",
            params![input.budget_details_posts_id, input.user_groups_id, input.recommendation],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(conn: &Connection, id: i64, input: &RecommendationInput) -> Result<usize> {
        Ok(conn.execute(
            "UPDATE budget_details_posts_recommendations SET budget_details_posts_id = ?1, user_groups_id = ?2, \
             recommendation = ?3, updated_at = datetime('now') WHERE id = ?4",
            params![input.budget_details_posts_id, input.user_groups_id, input.recommendation, id],
        )?)
    }
}
