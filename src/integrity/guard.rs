//! Caller-side interpretation of resolved keys
//!
//! Two orthogonal checks run against the same resolver call: the entity's own
//! id must exist (update, delete) and every referenced row must exist
//! (create, update).

use crate::error::{BackofficeError, Result};

use super::{resolve, EntityKind, KeyDescriptor, KeyLookup, ResolvedKeys};

/// Which checks a mutation path enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    /// The entity's own id must resolve
    pub validate_self_id: bool,
    /// Skip the foreign-reference check
    pub check_self_only: bool,
}

impl Guard {
    /// Foreign references only
    pub const CREATE: Guard = Guard {
        validate_self_id: false,
        check_self_only: false,
    };

    /// Own id and foreign references
    pub const UPDATE: Guard = Guard {
        validate_self_id: true,
        check_self_only: false,
    };

    /// Own id only
    pub const DELETE: Guard = Guard {
        validate_self_id: true,
        check_self_only: true,
    };

    /// Turn unresolved slots into a domain error.
    ///
    /// Self is checked before references; references are checked in the
    /// order given. An absent reference fails like a missing one.
    pub fn enforce(
        &self,
        resolved: &ResolvedKeys,
        self_kind: EntityKind,
        references: &[EntityKind],
    ) -> Result<()> {
        if self.validate_self_id && !resolved.is_found(self_kind) {
            return Err(BackofficeError::NotFound(self_kind.self_not_found().to_string()));
        }

        if !self.check_self_only {
            if let Some(kind) = references.iter().find(|kind| !resolved.is_found(**kind)) {
                return Err(BackofficeError::NotFound(kind.reference_not_found().to_string()));
            }
        }

        Ok(())
    }
}

/// Build a descriptor for one mutation, resolve it and enforce `guard`.
///
/// Only the slots the guard will inspect are looked up: the self id when
/// `validate_self_id`, the references unless `check_self_only`.
pub fn verify_keys<L: KeyLookup + ?Sized>(
    lookup: &L,
    guard: Guard,
    self_key: (EntityKind, i64),
    references: &[(EntityKind, i64)],
) -> Result<ResolvedKeys> {
    let (self_kind, self_id) = self_key;
    let mut descriptor = KeyDescriptor::new();

    if !guard.check_self_only {
        for &(kind, id) in references {
            debug_assert_ne!(kind, self_kind, "an entity cannot reference its own kind");
            descriptor.set(kind, id);
        }
    }
    if guard.validate_self_id {
        descriptor.set(self_kind, self_id);
    }

    let resolved = resolve(lookup, &descriptor)?;
    let kinds: Vec<EntityKind> = references.iter().map(|(kind, _)| *kind).collect();
    guard.enforce(&resolved, self_kind, &kinds)?;

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::super::testing::FakeLookup;
    use super::*;

    fn cap_references(budget: i64, post: i64) -> [(EntityKind, i64); 2] {
        [(EntityKind::Budgets, budget), (EntityKind::BudgetPosts, post)]
    }

    #[test]
    fn create_reports_missing_reference() {
        let lookup = FakeLookup::with_rows(&[(EntityKind::Budgets, 7)]);
        let err = verify_keys(&lookup, Guard::CREATE, (EntityKind::BudgetCaps, 0), &cap_references(7, 42))
            .unwrap_err();
        assert_eq!(err.to_string(), "data budget post not found");
    }

    #[test]
    fn create_ignores_self_slot() {
        let lookup = FakeLookup::with_rows(&[(EntityKind::Budgets, 7), (EntityKind::BudgetPosts, 42)]);
        let resolved =
            verify_keys(&lookup, Guard::CREATE, (EntityKind::BudgetCaps, 0), &cap_references(7, 42)).unwrap();
        assert_eq!(resolved.id_or_zero(EntityKind::BudgetPosts), 42);
        assert_eq!(lookup.calls.get(), 2);
    }

    #[test]
    fn absent_reference_fails_foreign_check() {
        let lookup = FakeLookup::with_rows(&[(EntityKind::Budgets, 7)]);
        let err = verify_keys(&lookup, Guard::CREATE, (EntityKind::BudgetCaps, 0), &cap_references(7, 0))
            .unwrap_err();
        assert_eq!(err.to_string(), "data budget post not found");
    }

    #[test]
    fn delete_checks_self_only() {
        let lookup = FakeLookup::default();
        let err = verify_keys(&lookup, Guard::DELETE, (EntityKind::BudgetCaps, 5), &cap_references(1, 2))
            .unwrap_err();
        assert_eq!(err.to_string(), "budget caps not found");
        // references were never looked up
        assert_eq!(lookup.calls.get(), 1);
    }

    #[test]
    fn self_only_passes_with_missing_references() {
        let lookup = FakeLookup::with_rows(&[(EntityKind::BudgetCaps, 5)]);
        verify_keys(&lookup, Guard::DELETE, (EntityKind::BudgetCaps, 5), &cap_references(0, 0)).unwrap();
    }

    #[test]
    fn update_checks_self_before_references() {
        let lookup = FakeLookup::default();
        let err = verify_keys(&lookup, Guard::UPDATE, (EntityKind::BudgetCaps, 5), &cap_references(7, 42))
            .unwrap_err();
        assert_eq!(err.to_string(), "budget caps not found");
    }

    #[test]
    fn update_with_everything_present() {
        let lookup = FakeLookup::with_rows(&[
            (EntityKind::BudgetCaps, 5),
            (EntityKind::Budgets, 7),
            (EntityKind::BudgetPosts, 42),
        ]);
        let resolved =
            verify_keys(&lookup, Guard::UPDATE, (EntityKind::BudgetCaps, 5), &cap_references(7, 42)).unwrap();
        assert_eq!(resolved.missing().count(), 0);
    }

    #[test]
    fn references_checked_in_declared_order() {
        let lookup = FakeLookup::default();
        let references = [
            (EntityKind::FundRequests, 1),
            (EntityKind::Activities, 2),
            (EntityKind::BudgetDetails, 3),
        ];
        let err = verify_keys(&lookup, Guard::CREATE, (EntityKind::FundRequestDetails, 0), &references)
            .unwrap_err();
        assert_eq!(err.to_string(), "data fund request not found");
    }

    #[test]
    fn lookup_error_is_not_a_domain_error() {
        let lookup = FakeLookup {
            fail_after: Some(0),
            ..FakeLookup::default()
        };
        let err = verify_keys(&lookup, Guard::DELETE, (EntityKind::BudgetCaps, 5), &[]).unwrap_err();
        assert!(matches!(err, BackofficeError::Database(_)));
    }
}
