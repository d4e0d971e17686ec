//! Application assembly shared by the `biblio-app` and `biblio` binaries.

use std::sync::Arc;

use anyhow::Context;
use biblio_db::Database;
use biblio_kernel::{settings::DatabaseBackend, settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;
use crate::modules::catalog::store::{BookStore, MemoryBookStore, SurrealBookStore};

/// A fully wired application: registered modules plus the database handle
/// when one is configured.
pub struct App {
    pub registry: ModuleRegistry,
    pub database: Option<Database>,
}

impl App {
    /// Wire an application around an already constructed store.
    pub fn with_store(store: Arc<dyn BookStore>, database: Option<Database>) -> Self {
        let mut registry = ModuleRegistry::new();
        if let Some(db) = &database {
            registry.register_core(biblio_db::create_module(db.clone()));
        }
        modules::register_all(&mut registry, store);

        Self { registry, database }
    }

    /// Connect the configured backend and register every module.
    pub async fn assemble(settings: &Settings) -> anyhow::Result<Self> {
        match settings.database.backend {
            DatabaseBackend::Surreal => {
                let db = biblio_db::connect(&settings.database).await?;
                let store = Arc::new(SurrealBookStore::new(db.clone()));
                Ok(Self::with_store(store, Some(db)))
            }
            DatabaseBackend::Memory => {
                tracing::warn!("using in-memory book store; records are lost on exit");
                Ok(Self::with_store(Arc::new(MemoryBookStore::new()), None))
            }
        }
    }

    /// Apply pending migrations. A no-op without a database.
    pub async fn migrate(&self) -> anyhow::Result<Vec<String>> {
        match &self.database {
            Some(db) => {
                let migrations = self.registry.collect_migrations();
                biblio_db::migrate::apply(db, &migrations).await
            }
            None => Ok(Vec::new()),
        }
    }

    /// Run the full lifecycle: init, migrate, start, serve, stop.
    pub async fn run(self, settings: &Settings) -> anyhow::Result<()> {
        let ctx = InitCtx { settings };

        self.registry.init_all(&ctx).await?;
        self.migrate().await.context("failed to apply migrations")?;
        self.registry.start_all(&ctx).await?;

        let served = biblio_http::start_server(&self.registry, settings).await;

        self.registry.stop_all().await?;
        served
    }
}

/// Build the application from resolved settings and serve until shutdown.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        backend = ?settings.database.backend,
        "biblio bootstrap starting"
    );

    App::assemble(settings).await?.run(settings).await
}
