pub mod catalog;

use std::sync::Arc;

use biblio_kernel::ModuleRegistry;

use catalog::store::BookStore;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn BookStore>) {
    registry.register_custom(catalog::create_module(store));
}
