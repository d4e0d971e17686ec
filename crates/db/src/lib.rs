//! SurrealDB connection factory and the `db` core module.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use biblio_kernel::settings::DatabaseSettings;
use biblio_kernel::{InitCtx, Module};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

pub mod migrate;

/// Shared database handle. Cloning is cheap and clones share one connection.
pub type Database = Surreal<Any>;

/// Open a connection to the configured endpoint, sign in when credentials
/// are present and select the namespace and database.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    tracing::info!(
        target: "biblio-db",
        endpoint = %settings.endpoint,
        namespace = %settings.namespace,
        database = %settings.database,
        "connecting to database"
    );

    let db = any::connect(settings.endpoint.as_str())
        .await
        .with_context(|| format!("failed to connect to {}", settings.endpoint))?;

    if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
        db.signin(Root {
            username: username.as_str(),
            password: password.as_str(),
        })
        .await
        .with_context(|| "failed to sign in to database")?;
    }

    db.use_ns(settings.namespace.as_str())
        .use_db(settings.database.as_str())
        .await
        .with_context(|| "failed to select namespace and database")?;

    Ok(db)
}

/// Core module owning the database connection lifecycle.
pub struct DbModule {
    db: Database,
}

impl DbModule {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.db
            .health()
            .await
            .with_context(|| "database health check failed")?;

        tracing::info!(
            module = self.name(),
            endpoint = %ctx.settings.database.endpoint,
            "database reachable"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "database module stopped");
        Ok(())
    }
}

/// Create the `db` core module for registration.
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(DbModule::new(db))
}
