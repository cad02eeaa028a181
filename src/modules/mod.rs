pub mod books;

use std::sync::Arc;

use shelf_kernel::{settings::Settings, ModuleRegistry};

use books::store::BookStore;

/// Collaborators the modules are built around; created once at startup
pub struct Resources {
    pub book_store: Arc<dyn BookStore>,
}

/// Register all service modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    resources: &Resources,
    settings: &Settings,
) -> anyhow::Result<()> {
    registry.register(books::create_module(resources.book_store.clone(), settings))?;
    Ok(())
}
