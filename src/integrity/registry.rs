//! Resolution table registry
//!
//! Static mapping from every entity kind that can appear as a foreign key or
//! self key to its table, its existence lookup and the messages callers use
//! when the id does not resolve.

use serde::Serialize;

/// Entity kinds that participate in foreign-key relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Activities,
    Budgets,
    BudgetPosts,
    BudgetCaps,
    BudgetDetails,
    BudgetDetailsPosts,
    BudgetDetailsPostsRecommendations,
    FundRequests,
    FundRequestDetails,
}

struct Registration {
    table: &'static str,
    lookup_sql: &'static str,
    path_segment: &'static str,
    self_not_found: &'static str,
    reference_not_found: &'static str,
}

const fn registration(kind: EntityKind) -> Registration {
    match kind {
        EntityKind::Activities => Registration {
            table: "activities",
            lookup_sql: "SELECT id FROM activities WHERE id = ?1",
            path_segment: "activities",
            self_not_found: "activities not found",
            reference_not_found: "data activities not found",
        },
        EntityKind::Budgets => Registration {
            table: "budgets",
            lookup_sql: "SELECT id FROM budgets WHERE id = ?1",
            path_segment: "budgets",
            self_not_found: "budgets not found",
            reference_not_found: "data budgets not found",
        },
        EntityKind::BudgetPosts => Registration {
            table: "budget_posts",
            lookup_sql: "SELECT id FROM budget_posts WHERE id = ?1",
            path_segment: "budget-posts",
            self_not_found: "budget posts not found",
            reference_not_found: "data budget post not found",
        },
        EntityKind::BudgetCaps => Registration {
            table: "budget_caps",
            lookup_sql: "SELECT id FROM budget_caps WHERE id = ?1",
            path_segment: "budget-caps",
            self_not_found: "budget caps not found",
            reference_not_found: "data budget caps not found",
        },
        EntityKind::BudgetDetails => Registration {
            table: "budget_details",
            lookup_sql: "SELECT id FROM budget_details WHERE id = ?1",
            path_segment: "budget-details",
            self_not_found: "budget details not found",
            reference_not_found: "data budget details not found",
        },
        EntityKind::BudgetDetailsPosts => Registration {
            table: "budget_details_posts",
            lookup_sql: "SELECT id FROM budget_details_posts WHERE id = ?1",
            path_segment: "budget-details-posts",
            self_not_found: "budget details post not found",
            reference_not_found: "data budget details posts not found",
        },
        EntityKind::BudgetDetailsPostsRecommendations => Registration {
            table: "budget_details_posts_recommendations",
            lookup_sql: "SELECT id FROM budget_details_posts_recommendations WHERE id = ?1",
            path_segment: "budget-details-posts-recommendations",
            self_not_found: "budget detail post recommendation not found",
            reference_not_found: "data budget detail post recommendation not found",
        },
        EntityKind::FundRequests => Registration {
            table: "fund_requests",
            lookup_sql: "SELECT id FROM fund_requests WHERE id = ?1",
            path_segment: "fund-requests",
            self_not_found: "fund requests not found",
            reference_not_found: "data fund request not found",
        },
        EntityKind::FundRequestDetails => Registration {
            table: "fund_request_details",
            lookup_sql: "SELECT id FROM fund_request_details WHERE id = ?1",
            path_segment: "fund-request-details",
            self_not_found: "fund request details not found",
            reference_not_found: "data fund request details not found",
        },
    }
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::Activities,
        EntityKind::Budgets,
        EntityKind::BudgetPosts,
        EntityKind::BudgetCaps,
        EntityKind::BudgetDetails,
        EntityKind::BudgetDetailsPosts,
        EntityKind::BudgetDetailsPostsRecommendations,
        EntityKind::FundRequests,
        EntityKind::FundRequestDetails,
    ];

    /// Backing table name
    pub const fn table(self) -> &'static str {
        registration(self).table
    }

    /// Existence-by-id statement, one positional parameter
    pub const fn lookup_sql(self) -> &'static str {
        registration(self).lookup_sql
    }

    /// URL path segment serving this entity
    pub const fn path_segment(self) -> &'static str {
        registration(self).path_segment
    }

    /// Message when the entity being updated or deleted is missing
    pub const fn self_not_found(self) -> &'static str {
        registration(self).self_not_found
    }

    /// Message when a record references a missing row of this kind
    pub const fn reference_not_found(self) -> &'static str {
        registration(self).reference_not_found
    }

    pub fn from_path_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path_segment() == segment)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_path_segment(kind.path_segment()), Some(kind));
        }
        assert_eq!(EntityKind::from_path_segment("users"), None);
    }

    #[test]
    fn lookup_targets_own_table() {
        for kind in EntityKind::ALL {
            let expected = format!("SELECT id FROM {} WHERE id = ?1", kind.table());
            assert_eq!(kind.lookup_sql(), expected);
        }
    }

    #[test]
    fn caller_messages() {
        assert_eq!(EntityKind::BudgetCaps.self_not_found(), "budget caps not found");
        assert_eq!(EntityKind::BudgetPosts.reference_not_found(), "data budget post not found");
        assert_eq!(EntityKind::FundRequests.self_not_found(), "fund requests not found");
    }
}
