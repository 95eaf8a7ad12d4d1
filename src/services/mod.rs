//! Service layer
//!
//! Services sit between the HTTP router and the entity store:
//!
//! ```text
//! HTTP router (thin)
//!     ↓
//! EntityService<E> / AuthService
//!     ↓
//! integrity::verify_keys + db::<entity>
//!     ↓
//! SQLite
//! ```

pub mod auth_service;
pub mod entity_service;
pub mod response;

pub use auth_service::{AuthService, LoginRequest};
pub use entity_service::{EntityService, Resource};
pub use response::*;

use std::sync::Arc;

use crate::auth::JwtValidator;
use crate::db::{
    Activity, Budget, BudgetCap, BudgetDetail, BudgetDetailPost, BudgetPost, Database, FundRequest,
    FundRequestDetail, Recommendation,
};
use crate::integrity::EntityKind;

/// Service container, shared by all connections
pub struct Services {
    pub activities: EntityService<Activity>,
    pub budgets: EntityService<Budget>,
    pub budget_posts: EntityService<BudgetPost>,
    pub budget_caps: EntityService<BudgetCap>,
    pub budget_details: EntityService<BudgetDetail>,
    pub budget_details_posts: EntityService<BudgetDetailPost>,
    pub recommendations: EntityService<Recommendation>,
    pub fund_requests: EntityService<FundRequest>,
    pub fund_request_details: EntityService<FundRequestDetail>,
    pub auth: AuthService,
}

impl Services {
    pub fn new(db: Arc<Database>, jwt: JwtValidator) -> Self {
        Self {
            activities: EntityService::new(db.clone()),
            budgets: EntityService::new(db.clone()),
            budget_posts: EntityService::new(db.clone()),
            budget_caps: EntityService::new(db.clone()),
            budget_details: EntityService::new(db.clone()),
            budget_details_posts: EntityService::new(db.clone()),
            recommendations: EntityService::new(db.clone()),
            fund_requests: EntityService::new(db.clone()),
            fund_request_details: EntityService::new(db.clone()),
            auth: AuthService::new(db, jwt),
        }
    }

    /// CRUD service serving `kind`
    pub fn resource(&self, kind: EntityKind) -> &dyn Resource {
        match kind {
            EntityKind::Activities => &self.activities,
            EntityKind::Budgets => &self.budgets,
            EntityKind::BudgetPosts => &self.budget_posts,
            EntityKind::BudgetCaps => &self.budget_caps,
            EntityKind::BudgetDetails => &self.budget_details,
            EntityKind::BudgetDetailsPosts => &self.budget_details_posts,
            EntityKind::BudgetDetailsPostsRecommendations => &self.recommendations,
            EntityKind::FundRequests => &self.fund_requests,
            EntityKind::FundRequestDetails => &self.fund_request_details,
        }
    }
}
