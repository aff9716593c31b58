//! Experiment-related database queries.

use crate::pool::{DbError, DbPool, DbResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};

const SELECT_EXPERIMENT: &str = "SELECT id, name, description, status, owner, start_date,
        end_date, revenue_signal, created_at, updated_at
 FROM experiments";

/// Experiment row from database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub owner: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub revenue_signal: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Column values for a new experiment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewExperimentRow<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub owner: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub revenue_signal: Option<&'a str>,
}

/// Column values for a partial update.
///
/// `None` keeps the stored value. An empty string clears an optional column
/// to NULL.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExperimentPatchRow<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub status: Option<&'a str>,
    pub owner: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub revenue_signal: Option<&'a str>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ExperimentRow> {
    Ok(ExperimentRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        owner: row.get(4)?,
        start_date: row.get(5)?,
        end_date: row.get(6)?,
        revenue_signal: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Format a timestamp the way the experiments table stores it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Pick an `updated_at` that is strictly later than `previous`.
fn next_timestamp(previous: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(previous) {
        Ok(prev) => {
            let floor = prev.with_timezone(&Utc) + Duration::microseconds(1);
            now.max(floor)
        }
        Err(_) => now,
    }
}

/// Insert a new experiment and return its id.
pub fn insert_experiment(pool: &DbPool, new: &NewExperimentRow<'_>) -> DbResult<i64> {
    let now = format_timestamp(Utc::now());
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO experiments (name, description, status, owner, start_date,
                                      end_date, revenue_signal, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
            params![
                new.name,
                new.description,
                new.status,
                new.owner,
                new.start_date,
                new.end_date,
                new.revenue_signal,
                now
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Get an experiment by ID.
pub fn get_experiment(pool: &DbPool, id: i64) -> DbResult<ExperimentRow> {
    find_experiment(pool, id)?.ok_or_else(|| DbError::NotFound(format!("Experiment: {}", id)))
}

/// Get an experiment by ID, `None` when it does not exist.
pub fn find_experiment(pool: &DbPool, id: i64) -> DbResult<Option<ExperimentRow>> {
    pool.with_conn(|conn| {
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_EXPERIMENT),
            params![id],
            map_row,
        )
        .optional()
        .map_err(DbError::from)
    })
}

/// List every experiment, newest first. Ties keep insertion order.
pub fn list_experiments(pool: &DbPool) -> DbResult<Vec<ExperimentRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, id ASC",
            SELECT_EXPERIMENT
        ))?;

        let rows = stmt.query_map([], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Apply a partial update. Returns the number of rows changed (0 or 1).
///
/// `updated_at` always moves forward, even when the clock has not.
pub fn update_experiment(pool: &DbPool, id: i64, patch: &ExperimentPatchRow<'_>) -> DbResult<usize> {
    pool.with_conn_mut(|conn| {
        let tx = conn.transaction()?;

        let previous: Option<String> = tx
            .query_row(
                "SELECT updated_at FROM experiments WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(previous) = previous else {
            return Ok(0);
        };

        let updated_at = format_timestamp(next_timestamp(&previous, Utc::now()));
        let changed = tx.execute(
            "UPDATE experiments
             SET name = COALESCE(?1, name),
                 description = NULLIF(COALESCE(?2, description), ''),
                 status = COALESCE(?3, status),
                 owner = NULLIF(COALESCE(?4, owner), ''),
                 start_date = NULLIF(COALESCE(?5, start_date), ''),
                 end_date = NULLIF(COALESCE(?6, end_date), ''),
                 revenue_signal = NULLIF(COALESCE(?7, revenue_signal), ''),
                 updated_at = ?8
             WHERE id = ?9",
            params![
                patch.name,
                patch.description,
                patch.status,
                patch.owner,
                patch.start_date,
                patch.end_date,
                patch.revenue_signal,
                updated_at,
                id
            ],
        )?;

        tx.commit()?;
        Ok(changed)
    })
}

/// Delete an experiment. Returns the number of rows removed (0 or 1).
pub fn delete_experiment(pool: &DbPool, id: i64) -> DbResult<usize> {
    pool.with_conn(|conn| {
        let removed = conn.execute("DELETE FROM experiments WHERE id = ?1", params![id])?;
        Ok(removed)
    })
}

/// Count all experiments.
pub fn count_experiments(pool: &DbPool) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.query_row("SELECT COUNT(*) FROM experiments", [], |row| row.get(0))
            .map_err(DbError::from)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    fn pool() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        run_migrations(&pool).unwrap();
        pool
    }

    fn insert(pool: &DbPool, name: &str) -> i64 {
        insert_experiment(
            pool,
            &NewExperimentRow {
                name,
                status: "todo",
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let pool = pool();
        let id = insert_experiment(
            &pool,
            &NewExperimentRow {
                name: "Pricing test",
                description: Some("Raise tier two by 10%"),
                status: "review",
                owner: Some("Alice"),
                start_date: Some("2026-01-05"),
                end_date: None,
                revenue_signal: Some("+3% MRR"),
            },
        )
        .unwrap();

        let row = get_experiment(&pool, id).unwrap();
        assert_eq!(row.name, "Pricing test");
        assert_eq!(row.description.as_deref(), Some("Raise tier two by 10%"));
        assert_eq!(row.status, "review");
        assert_eq!(row.owner.as_deref(), Some("Alice"));
        assert_eq!(row.start_date.as_deref(), Some("2026-01-05"));
        assert_eq!(row.end_date, None);
        assert_eq!(row.created_at, row.updated_at);
    }

    #[test]
    fn test_get_missing() {
        let pool = pool();
        assert!(matches!(get_experiment(&pool, 42), Err(DbError::NotFound(_))));
        assert_eq!(find_experiment(&pool, 42).unwrap(), None);
    }

    #[test]
    fn test_list_newest_first_ties_by_id() {
        let pool = pool();
        pool.with_conn(|conn| {
            conn.execute_batch(
                "INSERT INTO experiments (name, created_at, updated_at)
                     VALUES ('old', '2026-01-01T00:00:00.000000Z', '2026-01-01T00:00:00.000000Z');
                 INSERT INTO experiments (name, created_at, updated_at)
                     VALUES ('tie-a', '2026-02-01T00:00:00.000000Z', '2026-02-01T00:00:00.000000Z');
                 INSERT INTO experiments (name, created_at, updated_at)
                     VALUES ('tie-b', '2026-02-01T00:00:00.000000Z', '2026-02-01T00:00:00.000000Z');
                 INSERT INTO experiments (name, created_at, updated_at)
                     VALUES ('new', '2026-03-01T00:00:00.000000Z', '2026-03-01T00:00:00.000000Z');",
            )?;
            Ok(())
        })
        .unwrap();

        let names: Vec<String> = list_experiments(&pool)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["new", "tie-a", "tie-b", "old"]);
    }

    #[test]
    fn test_update_keeps_omitted_columns() {
        let pool = pool();
        let id = insert_experiment(
            &pool,
            &NewExperimentRow {
                name: "Onboarding email",
                status: "todo",
                owner: Some("Alice"),
                ..Default::default()
            },
        )
        .unwrap();
        let before = get_experiment(&pool, id).unwrap();

        let changed = update_experiment(
            &pool,
            id,
            &ExperimentPatchRow {
                status: Some("done"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(changed, 1);

        let after = get_experiment(&pool, id).unwrap();
        assert_eq!(after.status, "done");
        assert_eq!(after.owner.as_deref(), Some("Alice"));
        assert_eq!(after.name, before.name);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_update_empty_string_clears() {
        let pool = pool();
        let id = insert_experiment(
            &pool,
            &NewExperimentRow {
                name: "Referral program",
                status: "todo",
                owner: Some("Bob"),
                revenue_signal: Some("unclear"),
                ..Default::default()
            },
        )
        .unwrap();

        update_experiment(
            &pool,
            id,
            &ExperimentPatchRow {
                owner: Some(""),
                ..Default::default()
            },
        )
        .unwrap();

        let row = get_experiment(&pool, id).unwrap();
        assert_eq!(row.owner, None);
        assert_eq!(row.revenue_signal.as_deref(), Some("unclear"));
    }

    #[test]
    fn test_update_missing_changes_nothing() {
        let pool = pool();
        insert(&pool, "Kept");

        let changed = update_experiment(
            &pool,
            999,
            &ExperimentPatchRow {
                status: Some("done"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(changed, 0);
        assert_eq!(list_experiments(&pool).unwrap()[0].status, "todo");
    }

    #[test]
    fn test_updated_at_strictly_increases() {
        let pool = pool();
        let id = insert(&pool, "Fast edits");

        let mut last = get_experiment(&pool, id).unwrap().updated_at;
        for _ in 0..5 {
            update_experiment(&pool, id, &ExperimentPatchRow::default()).unwrap();
            let current = get_experiment(&pool, id).unwrap().updated_at;
            assert!(current > last, "{} should be after {}", current, last);
            last = current;
        }
    }

    #[test]
    fn test_update_rejects_unknown_status() {
        let pool = pool();
        let id = insert(&pool, "Constrained");

        let result = update_experiment(
            &pool,
            id,
            &ExperimentPatchRow {
                status: Some("archived"),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(DbError::Connection(_))));
        assert_eq!(get_experiment(&pool, id).unwrap().status, "todo");
    }

    #[test]
    fn test_delete() {
        let pool = pool();
        let id = insert(&pool, "Short lived");
        insert(&pool, "Survivor");

        assert_eq!(delete_experiment(&pool, id).unwrap(), 1);
        assert_eq!(delete_experiment(&pool, id).unwrap(), 0);
        assert_eq!(count_experiments(&pool).unwrap(), 1);
    }

    #[test]
    fn test_next_timestamp() {
        let now = Utc::now();
        let future = format_timestamp(now + Duration::seconds(5));
        let bumped = next_timestamp(&future, now);
        assert!(bumped > now);
        assert!(format_timestamp(bumped) > future);

        let past = format_timestamp(now - Duration::seconds(5));
        assert_eq!(next_timestamp(&past, now), now);
        assert_eq!(next_timestamp("not a timestamp", now), now);
    }
}
