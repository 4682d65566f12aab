//! Component discovery for JinjaX catalog folders.
//!
//! A JinjaX catalog is a set of folders whose `.jinja` files are components
//! addressed by tag names derived from their paths (`common/Form.jinja` is
//! `<common.Form>`, a folder registered under the `ui` prefix exposes
//! `<ui:Alert>`). This crate provides:
//! - Discovery of template files under a folder, in a stable order
//! - A registry mapping tag names back to files and Jx import paths
//! - The naming helpers shared by both sides of that mapping
//!
//! # Example
//!
//! ```no_run
//! use jinjax_catalog::{CatalogFolder, ComponentRegistry};
//!
//! let mut registry = ComponentRegistry::new();
//! let count = registry.add_folder(CatalogFolder::new("templates/components", ""))?;
//! println!("found {count} components");
//!
//! if let Some(info) = registry.resolve("common.Form") {
//!     println!("{} -> {}", info.name, info.import_path);
//! }
//! # Ok::<(), jinjax_catalog::CatalogError>(())
//! ```

mod discovery;
mod error;
pub mod naming;
mod registry;

pub use discovery::{discover_templates, TEMPLATE_EXTENSION};
pub use error::CatalogError;
pub use naming::{kebab_case, to_pascal_case};
pub use registry::{CatalogFolder, ComponentInfo, ComponentRegistry};
