//! Referential-integrity validation
//!
//! Given a sparse set of candidate ids, one per entity kind, resolves which of
//! them currently exist in their tables. The same mechanism backs the
//! create, update and delete paths of every entity:
//!
//! ```text
//! request fields / url id
//!     ↓
//! KeyDescriptor   { budgets: 7, budget_posts: 42 }
//!     ↓  resolve (read-only lookups)
//! ResolvedKeys    { budgets: Found(7), budget_posts: NotFound }
//!     ↓  Guard::enforce
//! Err(NotFound("data budget post not found"))
//! ```
//!
//! A missing row is ordinary output, not an error. Only lookup failures
//! (connectivity, bad statement) come back as `Err`, and after such an error
//! nothing about the descriptor may be trusted.

pub mod guard;
pub mod registry;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{BackofficeError, Result};

pub use guard::{verify_keys, Guard};
pub use registry::EntityKind;

/// Candidate ids to verify, keyed by entity kind.
///
/// Ids less than or equal to zero mean "not supplied" and are never stored,
/// so an absent kind is skipped by the resolver rather than treated as
/// "must not exist".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDescriptor {
    slots: BTreeMap<EntityKind, i64>,
}

impl KeyDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`KeyDescriptor::set`]
    pub fn with(mut self, kind: EntityKind, id: i64) -> Self {
        self.set(kind, id);
        self
    }

    /// Set the candidate for `kind`; a non-positive id clears the slot
    pub fn set(&mut self, kind: EntityKind, id: i64) {
        if id > 0 {
            self.slots.insert(kind, id);
        } else {
            self.slots.remove(&kind);
        }
    }

    /// Candidate id for `kind`, zero when absent
    pub fn get(&self, kind: EntityKind) -> i64 {
        self.slots.get(&kind).copied().unwrap_or(0)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.slots.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, i64)> + '_ {
        self.slots.iter().map(|(kind, id)| (*kind, *id))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<(EntityKind, i64)> for KeyDescriptor {
    fn from_iter<I: IntoIterator<Item = (EntityKind, i64)>>(iter: I) -> Self {
        let mut descriptor = Self::new();
        for (kind, id) in iter {
            descriptor.set(kind, id);
        }
        descriptor
    }
}

/// Outcome of resolving one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The slot was not set on input
    Absent,
    /// A row exists; carries the row's own id
    Found(i64),
    /// The slot was set but no row has that id
    NotFound,
}

impl Resolution {
    pub fn is_found(self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Zero-compatible view: the id when found, otherwise 0
    pub fn id_or_zero(self) -> i64 {
        match self {
            Self::Found(id) => id,
            Self::Absent | Self::NotFound => 0,
        }
    }
}

/// Per-kind results of one [`resolve`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedKeys {
    results: BTreeMap<EntityKind, Resolution>,
}

impl ResolvedKeys {
    pub fn get(&self, kind: EntityKind) -> Resolution {
        self.results.get(&kind).copied().unwrap_or(Resolution::Absent)
    }

    pub fn is_found(&self, kind: EntityKind) -> bool {
        self.get(kind).is_found()
    }

    pub fn id_or_zero(&self, kind: EntityKind) -> i64 {
        self.get(kind).id_or_zero()
    }

    /// Kinds that were supplied but did not resolve
    pub fn missing(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.results
            .iter()
            .filter(|(_, res)| **res == Resolution::NotFound)
            .map(|(kind, _)| *kind)
    }

    /// The input descriptor with every unresolved slot zeroed out
    pub fn to_descriptor(&self) -> KeyDescriptor {
        self.results
            .iter()
            .map(|(kind, res)| (*kind, res.id_or_zero()))
            .collect()
    }
}

/// Read capability the resolver depends on.
///
/// Implementors report the row's id when a row with `id` exists in the
/// table registered for `kind`, `None` when there is no such row, and `Err`
/// for anything else.
pub trait KeyLookup {
    fn find_id(&self, kind: EntityKind, id: i64) -> Result<Option<i64>>;

    /// Resolve several probes at once, answers in probe order.
    ///
    /// Defaults to one lookup per probe; stores that can answer in a single
    /// round trip override this.
    fn find_ids(&self, probes: &[(EntityKind, i64)]) -> Result<Vec<Option<i64>>> {
        probes.iter().map(|&(kind, id)| self.find_id(kind, id)).collect()
    }
}

/// Resolve every set slot of `descriptor` against its table.
///
/// Absent slots stay absent. Set slots come back as `Found` with the row's
/// id or `NotFound`. A lookup failure aborts the whole call.
pub fn resolve<L: KeyLookup + ?Sized>(lookup: &L, descriptor: &KeyDescriptor) -> Result<ResolvedKeys> {
    let probes: Vec<(EntityKind, i64)> = descriptor.iter().collect();
    if probes.is_empty() {
        return Ok(ResolvedKeys::default());
    }

    let answers = lookup.find_ids(&probes)?;
    if answers.len() != probes.len() {
        return Err(BackofficeError::Internal(format!(
            "key lookup returned {} answers for {} probes",
            answers.len(),
            probes.len()
        )));
    }

    let results: BTreeMap<EntityKind, Resolution> = probes
        .iter()
        .zip(answers)
        .map(|(&(kind, _), answer)| {
            let resolution = match answer {
                Some(id) => Resolution::Found(id),
                None => Resolution::NotFound,
            };
            (kind, resolution)
        })
        .collect();

    debug!(probes = probes.len(), resolved = ?results, "Resolved foreign keys");

    Ok(ResolvedKeys { results })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::Cell;
    use std::collections::BTreeSet;

    use super::*;

    /// In-memory lookup with an optional failure after N successful probes
    #[derive(Default)]
    pub struct FakeLookup {
        pub rows: BTreeSet<(EntityKind, i64)>,
        pub fail_after: Option<usize>,
        pub calls: Cell<usize>,
    }

    impl FakeLookup {
        pub fn with_rows(rows: &[(EntityKind, i64)]) -> Self {
            Self {
                rows: rows.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl KeyLookup for FakeLookup {
        fn find_id(&self, kind: EntityKind, id: i64) -> Result<Option<i64>> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if self.fail_after.is_some_and(|limit| n >= limit) {
                return Err(BackofficeError::Database(rusqlite::Error::InvalidQuery));
            }
            Ok(self.rows.contains(&(kind, id)).then_some(id))
        }
    }
}
