//! JinjaX to Jx template migration.
//!
//! This crate rewrites the text of JinjaX templates into the Jx dialect. It
//! handles:
//! - `{{ content("name") }}` slot definitions and `_slot` conditional fills
//! - `catalog.render_assets()` calls and `{#css #}`/`{#js #}` declarations
//! - Explicit `{#import #}` declarations and alias-based tag names
//! - Planning the copy of co-located assets into a static folder
//!
//! Every function here is pure: it takes text and a registry and returns new
//! text. Reading, writing and copying files is left to the caller.
//!
//! # Example
//!
//! ```
//! use camino::Utf8Path;
//! use jinjax_catalog::{ComponentInfo, ComponentRegistry};
//! use jx_transformer::{transform, TransformOptions};
//!
//! let mut registry = ComponentRegistry::new();
//! registry.insert(ComponentInfo::new(
//!     "common.Form",
//!     "/app/components/common/Form.jinja",
//!     "common/Form.jinja",
//!     "",
//! ));
//!
//! let change = transform(
//!     Utf8Path::new("/app/pages/index.jinja"),
//!     "<common.Form>{{ content() }}</common.Form>\n",
//!     &registry,
//!     &TransformOptions::default(),
//! );
//! assert_eq!(
//!     change.transformed,
//!     "{#import \"common/Form.jinja\" as Form #}\n<Form>{{ content }}</Form>\n"
//! );
//! ```

mod assets;
mod edit;
mod imports;
mod patterns;
mod raw;
mod slots;
mod transform;

pub use assets::{
    add_auto_assets, asset_url, migrate_asset_rendering, plan_asset_copies, update_asset_paths,
    AssetKind,
};
pub use imports::{find_component_tags, generate_imports_and_rename};
pub use raw::{protect_raw_blocks, RawBlocks};
pub use slots::{
    find_slot_blocks, migrate_slot_definitions, migrate_slot_usage, SlotBlock, SlotBranch,
};
pub use transform::{count_imports, transform, FileChange, MigrationResult, TransformOptions};
