use async_trait::async_trait;
use axum::Router;

/// Context handed to modules while the service boots
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Schema migration a module contributes for relational backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub description: &'static str,
    pub up: &'static str,
}

/// A unit of functionality mounted into a shelf service
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; also the path segment the module's routes mount under
    fn name(&self) -> &'static str;

    /// Called once before the HTTP server starts accepting requests
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Axum router for this module, mounted under `{route_prefix}/{name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` relative to the mount point, plus
    /// `components.schemas`) merged into the service document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Release resources; called after the server has drained
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
