use async_trait::async_trait;
use axum::Router;

/// Handed to every module during `init` and `start`.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// A SurrealQL script contributed by a module, applied at most once.
///
/// `id` is unique within its module and orders that module's scripts
/// (`001_init`, `002_...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A unit of the biblio server: the `db` core module, the catalog.
///
/// The registry drives the lifecycle as `init`, migrations, `start`, then
/// `stop` in reverse registration order on shutdown.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also keys the module's rows in `_migrations`.
    fn name(&self) -> &'static str;

    /// Prefix for the module's routes and OpenAPI paths. Defaults to
    /// `/api/<name>`; an empty string mounts at the server root.
    fn base_path(&self) -> String {
        format!("/api/{}", self.name())
    }

    /// Fail here to abort startup before anything is served.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to [`Module::base_path`]. The router must carry its
    /// own state; it is merged or nested as a plain `Router`.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` and `components.schemas`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs after migrations, before the listener binds.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
