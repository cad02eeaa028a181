//! Book catalogue service.
//!
//! The `books` module exposes create/list/get/update/delete over HTTP, with
//! every write gated by the declarative schemas in [`modules::books::schema`].

pub mod modules;

use std::sync::Arc;

use anyhow::Context;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use modules::books::store::{BookStore, TableBookStore};
pub use modules::Resources;

/// Resources backed by the in-process table store
pub fn default_resources() -> Resources {
    Resources {
        book_store: Arc::new(TableBookStore::new()),
    }
}

/// Build a registry with every module registered against `resources`
pub fn build_registry(resources: &Resources, settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, resources, settings)?;
    Ok(registry)
}

/// Boot every module, serve HTTP until a shutdown signal, then stop modules
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let resources = default_resources();
    let registry = build_registry(&resources, settings)?;

    let ctx = InitCtx { settings };
    registry
        .init_all(&ctx)
        .await
        .context("module initialization failed")?;

    tracing::info!("shelf-app bootstrap complete");

    let served = shelf_http::start_server(&registry, settings, shelf_http::shutdown_signal()).await;

    registry.stop_all().await?;
    served
}
