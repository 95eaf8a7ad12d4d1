//! Generic validate-then-mutate pipeline
//!
//! ```text
//! body ─▶ decode ─▶ field rules ─▶ verify_keys(guard) ─▶ insert/update/delete ─▶ re-read
//! ```
//!
//! Key verification and the write run as separate statements; a row deleted
//! between the two is reported as missing by the re-read.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::db::entity::{self, Entity, StatusFlag};
use crate::db::Database;
use crate::error::{BackofficeError, Result};
use crate::integrity::{verify_keys, Guard};

/// CRUD service for one entity type
pub struct EntityService<E: Entity> {
    db: Arc<Database>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityService<E> {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    fn not_found() -> BackofficeError {
        BackofficeError::NotFound(E::KIND.self_not_found().to_string())
    }

    /// Decode a request body into the entity's input type
    pub fn decode(body: &[u8]) -> Result<E::Input> {
        Ok(serde_json::from_slice(body)?)
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    pub fn list(&self) -> Result<Vec<E>> {
        self.db.with_conn(entity::list::<E>)
    }

    pub fn get(&self, id: i64) -> Result<E> {
        self.db
            .with_conn(|conn| entity::get::<E>(conn, id))?
            .ok_or_else(Self::not_found)
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    pub fn create(&self, input: E::Input) -> Result<E> {
        E::validate(&input)?;
        let references = E::references(&input);

        self.db.with_conn(|conn| {
            verify_keys(conn, Guard::CREATE, (E::KIND, 0), &references)?;
            let id = E::insert(conn, &input)?;
            info!(entity = %E::KIND, id, "Created");
            entity::get::<E>(conn, id)?.ok_or_else(Self::not_found)
        })
    }

    pub fn update(&self, id: i64, input: E::Input) -> Result<E> {
        E::validate(&input)?;
        let references = E::references(&input);

        self.db.with_conn(|conn| {
            verify_keys(conn, Guard::UPDATE, (E::KIND, id), &references)?;
            let changed = E::update(conn, id, &input)?;
            debug!(entity = %E::KIND, id, changed, "Updated");
            if changed == 0 {
                return Err(Self::not_found());
            }
            entity::get::<E>(conn, id)?.ok_or_else(Self::not_found)
        })
    }

    /// Delete and return the removed row
    pub fn delete(&self, id: i64) -> Result<E> {
        self.db.with_conn(|conn| {
            verify_keys(conn, Guard::DELETE, (E::KIND, id), &[])?;
            let row = entity::get::<E>(conn, id)?.ok_or_else(Self::not_found)?;
            if entity::delete::<E>(conn, id)? == 0 {
                return Err(Self::not_found());
            }
            info!(entity = %E::KIND, id, "Deleted");
            Ok(row)
        })
    }
}

impl<E: StatusFlag> EntityService<E> {
    /// Read the boolean status field out of a body like `{"is_active": true}`
    pub fn decode_status(body: &[u8]) -> Result<bool> {
        let value: Value = serde_json::from_slice(body)?;
        value
            .get(E::STATUS_COLUMN)
            .and_then(Value::as_bool)
            .ok_or_else(|| BackofficeError::InvalidBody(format!("{} must be a boolean", E::STATUS_COLUMN)))
    }

    /// Set the status flag; only the entity's own id is verified
    pub fn set_status(&self, id: i64, value: bool) -> Result<E> {
        self.db.with_conn(|conn| {
            verify_keys(conn, Guard::DELETE, (E::KIND, id), &[])?;
            if entity::set_status::<E>(conn, id, value)? == 0 {
                return Err(Self::not_found());
            }
            info!(entity = %E::KIND, id, column = E::STATUS_COLUMN, value, "Status changed");
            entity::get::<E>(conn, id)?.ok_or_else(Self::not_found)
        })
    }
}

/// Type-erased view of an [`EntityService`] for the router
pub trait Resource: Send + Sync {
    fn list(&self) -> Result<Value>;
    fn get(&self, id: i64) -> Result<Value>;
    fn create(&self, body: &[u8]) -> Result<Value>;
    fn update(&self, id: i64, body: &[u8]) -> Result<Value>;
    fn delete(&self, id: i64) -> Result<Value>;
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| BackofficeError::Internal(format!("encode row: {}", e)))
}

impl<E: Entity> Resource for EntityService<E> {
    fn list(&self) -> Result<Value> {
        to_json(EntityService::list(self)?)
    }

    fn get(&self, id: i64) -> Result<Value> {
        to_json(EntityService::get(self, id)?)
    }

    fn create(&self, body: &[u8]) -> Result<Value> {
        to_json(EntityService::create(self, Self::decode(body)?)?)
    }

    fn update(&self, id: i64, body: &[u8]) -> Result<Value> {
        to_json(EntityService::update(self, id, Self::decode(body)?)?)
    }

    fn delete(&self, id: i64) -> Result<Value> {
        to_json(EntityService::delete(self, id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Activity, ActivityInput, BudgetCap, BudgetCapInput};

    fn db() -> Arc<Database> {
        Arc::new(Database::open_in_memory().unwrap())
    }

    fn activity(name: &str) -> ActivityInput {
        ActivityInput {
            name: name.into(),
            description: String::new(),
            is_active: true,
        }
    }

    #[test]
    fn create_then_get() {
        let service = EntityService::<Activity>::new(db());
        let created = service.create(activity("Audit")).unwrap();
        assert_eq!(service.get(created.id).unwrap(), created);
        assert_eq!(service.list().unwrap().len(), 1);
    }

    #[test]
    fn missing_row_uses_self_message() {
        let service = EntityService::<Activity>::new(db());
        assert_eq!(service.get(99).unwrap_err().to_string(), "activities not found");
        assert_eq!(service.delete(99).unwrap_err().to_string(), "activities not found");
        assert_eq!(
            service.update(99, activity("x")).unwrap_err().to_string(),
            "activities not found"
        );
    }

    #[test]
    fn field_rules_run_before_key_checks() {
        let caps = EntityService::<BudgetCap>::new(db());
        let err = caps
            .create(BudgetCapInput {
                budgets_id: 1,
                budget_posts_id: 1,
                amount: 0.0,
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "amount must be greater than 0");
    }

    #[test]
    fn status_toggle() {
        let service = EntityService::<Activity>::new(db());
        let created = service.create(activity("Audit")).unwrap();

        let value = EntityService::<Activity>::decode_status(br#"{"is_active": false}"#).unwrap();
        let updated = service.set_status(created.id, value).unwrap();
        assert!(!updated.is_active);

        let err = EntityService::<Activity>::decode_status(br#"{"is_active": "no"}"#).unwrap_err();
        assert_eq!(err.public_message(), "invalid data request");
    }

    #[test]
    fn delete_returns_removed_row() {
        let service = EntityService::<Activity>::new(db());
        let created = service.create(activity("Audit")).unwrap();
        assert_eq!(service.delete(created.id).unwrap(), created);
        assert!(service.list().unwrap().is_empty());
    }
}
