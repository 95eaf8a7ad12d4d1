//! Existence lookups backing the integrity resolver
//!
//! All probes of one resolver call go out as a single `UNION ALL` statement,
//! each branch tagged with its probe index so answers map back per slot.

use rusqlite::{params_from_iter, Connection, OptionalExtension};

use crate::error::Result;
use crate::integrity::{EntityKind, KeyLookup};

impl KeyLookup for Connection {
    fn find_id(&self, kind: EntityKind, id: i64) -> Result<Option<i64>> {
        let found = self
            .query_row(kind.lookup_sql(), [id], |row| row.get(0))
            .optional()?;
        Ok(found)
    }

    fn find_ids(&self, probes: &[(EntityKind, i64)]) -> Result<Vec<Option<i64>>> {
        match probes {
            [] => Ok(vec![]),
            [(kind, id)] => Ok(vec![self.find_id(*kind, *id)?]),
            _ => {
                let sql = union_probe_sql(probes);
                let mut stmt = self.prepare(&sql)?;
                let rows = stmt.query_map(params_from_iter(probes.iter().map(|(_, id)| *id)), |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
                })?;

                let mut answers = vec![None; probes.len()];
                for row in rows {
                    let (slot, id) = row?;
                    if let Some(answer) = usize::try_from(slot).ok().and_then(|s| answers.get_mut(s)) {
                        *answer = Some(id);
                    }
                }
                Ok(answers)
            }
        }
    }
}

/// `SELECT <slot>, id FROM <table> WHERE id = ?<n>` per probe, joined with
/// `UNION ALL`. Table names come from the static registry only.
fn union_probe_sql(probes: &[(EntityKind, i64)]) -> String {
    probes
        .iter()
        .enumerate()
        .map(|(slot, (kind, _))| {
            format!(
                "SELECT {} AS slot, id FROM {} WHERE id = ?{}",
                slot,
                kind.table(),
                slot + 1
            )
        })
        .collect::<Vec<_>>()
        .join(" UNION ALL ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_schema;

    fn conn_with_rows() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO budgets (id, name, periode, units_id) VALUES (7, 'Ops', '2024', 1);
             INSERT INTO activities (id, name) VALUES (3, 'Audit');",
        )
        .unwrap();
        conn
    }

    #[test]
    fn union_sql_shape() {
        let sql = union_probe_sql(&[(EntityKind::Budgets, 7), (EntityKind::BudgetPosts, 42)]);
        assert_eq!(
            sql,
            "SELECT 0 AS slot, id FROM budgets WHERE id = ?1 UNION ALL \
             SELECT 1 AS slot, id FROM budget_posts WHERE id = ?2"
        );
    }

    #[test]
    fn single_probe() {
        let conn = conn_with_rows();
        assert_eq!(conn.find_id(EntityKind::Budgets, 7).unwrap(), Some(7));
        assert_eq!(conn.find_id(EntityKind::Budgets, 8).unwrap(), None);
    }

    #[test]
    fn batched_probes_answer_per_slot() {
        let conn = conn_with_rows();
        let answers = conn
            .find_ids(&[
                (EntityKind::Budgets, 7),
                (EntityKind::BudgetPosts, 42),
                (EntityKind::Activities, 3),
            ])
            .unwrap();
        assert_eq!(answers, vec![Some(7), None, Some(3)]);
    }

    #[test]
    fn missing_table_is_a_database_error() {
        let conn = conn_with_rows();
        conn.execute_batch("DROP TABLE budget_posts;").unwrap();
        let err = conn
            .find_ids(&[(EntityKind::Budgets, 7), (EntityKind::BudgetPosts, 42)])
            .unwrap_err();
        assert!(err.is_infrastructure());
    }
}
