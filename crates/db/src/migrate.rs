//! Applies module migrations once, recording each in the `_migrations` table.

use std::collections::HashSet;

use anyhow::Context;
use biblio_kernel::Migration;
use serde::Deserialize;

use crate::Database;

const MIGRATIONS_TABLE: &str = "_migrations";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct AppliedMigration {
    pub module: String,
    pub migration: String,
}

/// Migrations from `all` that are not in `applied`, order preserved.
pub fn pending<'a>(
    all: &'a [(String, Migration)],
    applied: &HashSet<AppliedMigration>,
) -> Vec<&'a (String, Migration)> {
    all.iter()
        .filter(|(module, migration)| {
            !applied.contains(&AppliedMigration {
                module: module.clone(),
                migration: migration.id.to_string(),
            })
        })
        .collect()
}

async fn applied(db: &Database) -> anyhow::Result<HashSet<AppliedMigration>> {
    let mut response = db
        .query("SELECT module, migration FROM type::table($table)")
        .bind(("table", MIGRATIONS_TABLE))
        .await
        .with_context(|| "failed to read applied migrations")?;

    let rows: Vec<AppliedMigration> = response.take(0)?;
    Ok(rows.into_iter().collect())
}

/// Run every pending migration, returning the `module/id` keys applied.
pub async fn apply(db: &Database, migrations: &[(String, Migration)]) -> anyhow::Result<Vec<String>> {
    let already = applied(db).await?;
    let mut ran = Vec::new();

    for (module, migration) in pending(migrations, &already) {
        let key = format!("{}/{}", module, migration.id);
        tracing::info!(target: "biblio-db", migration = %key, "applying migration");

        db.query(migration.up)
            .await
            .and_then(|response| response.check())
            .with_context(|| format!("migration '{}' failed", key))?;

        db.query("CREATE type::table($table) CONTENT { module: $module, migration: $migration, applied_at: time::now() }")
            .bind(("table", MIGRATIONS_TABLE))
            .bind(("module", module.clone()))
            .bind(("migration", migration.id))
            .await
            .and_then(|response| response.check())
            .with_context(|| format!("failed to record migration '{}'", key))?;

        ran.push(key);
    }

    tracing::info!(target: "biblio-db", applied = ran.len(), "migrations complete");
    Ok(ran)
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_kernel::settings::DatabaseSettings;

    fn migration(id: &'static str) -> Migration {
        Migration { id, up: "" }
    }

    async fn in_memory_db() -> Database {
        crate::connect(&DatabaseSettings {
            endpoint: "mem://".to_string(),
            ..DatabaseSettings::default()
        })
        .await
        .unwrap()
    }

    #[test]
    fn pending_skips_recorded_migrations() {
        let all = vec![
            ("catalog".to_string(), migration("001_init")),
            ("catalog".to_string(), migration("002_index")),
        ];
        let applied = HashSet::from([AppliedMigration {
            module: "catalog".to_string(),
            migration: "001_init".to_string(),
        }]);

        let ids: Vec<&str> = pending(&all, &applied)
            .into_iter()
            .map(|(_, m)| m.id)
            .collect();
        assert_eq!(ids, vec!["002_index"]);
    }

    #[test]
    fn pending_matches_on_module_as_well_as_id() {
        let all = vec![("users".to_string(), migration("001_init"))];
        let applied = HashSet::from([AppliedMigration {
            module: "catalog".to_string(),
            migration: "001_init".to_string(),
        }]);

        assert_eq!(pending(&all, &applied).len(), 1);
    }

    #[tokio::test]
    async fn apply_runs_each_migration_once() {
        let db = in_memory_db().await;
        let migrations = vec![
            (
                "catalog".to_string(),
                Migration {
                    id: "001_init",
                    up: "DEFINE TABLE IF NOT EXISTS books SCHEMALESS;",
                },
            ),
            (
                "catalog".to_string(),
                Migration {
                    id: "002_index",
                    up: "DEFINE INDEX IF NOT EXISTS books_category ON books FIELDS category;",
                },
            ),
        ];

        let first = apply(&db, &migrations).await.unwrap();
        assert_eq!(first, vec!["catalog/001_init", "catalog/002_index"]);

        let second = apply(&db, &migrations).await.unwrap();
        assert!(second.is_empty());

        let recorded = applied(&db).await.unwrap();
        assert_eq!(recorded.len(), 2);
        assert!(recorded.contains(&AppliedMigration {
            module: "catalog".to_string(),
            migration: "002_index".to_string(),
        }));
    }

    #[tokio::test]
    async fn failed_migration_is_not_recorded() {
        let db = in_memory_db().await;
        let migrations = vec![(
            "catalog".to_string(),
            Migration {
                id: "001_broken",
                up: "DEFINE TABLEX books;",
            },
        )];

        let err = apply(&db, &migrations).await.unwrap_err();
        assert!(err.to_string().contains("catalog/001_broken"));
        assert!(applied(&db).await.unwrap().is_empty());
    }
}
