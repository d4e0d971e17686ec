//! Biblio application library
//!
//! The catalog module and the bootstrap that wires it onto the kernel,
//! database and HTTP crates.

pub mod bootstrap;
pub mod modules;

pub use bootstrap::App;
pub use modules::catalog::{models::Book, service::CatalogService};
