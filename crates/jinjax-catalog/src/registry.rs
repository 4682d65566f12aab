//! The component registry.
//!
//! Maps JinjaX tag names (`Card`, `common.Form`, `ui:Alert`) to the template
//! file that defines them and the path Jx uses to import it.

use crate::discovery::discover_templates;
use crate::naming::{normalize, to_pascal_case};
use crate::CatalogError;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use tracing::debug;

/// A root directory whose templates are registered as components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFolder {
    /// The folder on disk.
    pub path: Utf8PathBuf,
    /// Namespace prefix; empty for the default namespace.
    pub prefix: String,
}

impl CatalogFolder {
    /// Creates a catalog folder.
    pub fn new(path: impl Into<Utf8PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
        }
    }
}

/// Identity of one discovered component template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
    /// JinjaX tag identifier, e.g. `Card`, `common.Form` or `ui:Alert`.
    pub name: String,
    /// Absolute path of the `.jinja` file.
    pub file_path: Utf8PathBuf,
    /// Path relative to the catalog root, `/`-separated.
    pub rel_path: String,
    /// Namespace prefix of the owning folder, empty when none.
    pub prefix: String,
    /// Jx import path: `common/Form.jinja` or `@ui/Alert.jinja`.
    pub import_path: String,
    /// Co-located stylesheet, when one exists.
    pub css_path: Option<Utf8PathBuf>,
    /// Co-located script, when one exists.
    pub js_path: Option<Utf8PathBuf>,
}

impl ComponentInfo {
    /// Creates component info without co-located assets.
    ///
    /// The import path is derived from `rel_path` and `prefix` alone.
    pub fn new(
        name: impl Into<String>,
        file_path: impl Into<Utf8PathBuf>,
        rel_path: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        let rel_path = rel_path.into();
        let prefix = prefix.into();
        let import_path = import_path_for(&rel_path, &prefix);
        Self {
            name: name.into(),
            file_path: file_path.into(),
            rel_path,
            prefix,
            import_path,
            css_path: None,
            js_path: None,
        }
    }

    /// Sets the co-located stylesheet.
    pub fn with_css(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.css_path = Some(path.into());
        self
    }

    /// Sets the co-located script.
    pub fn with_js(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.js_path = Some(path.into());
        self
    }

    pub fn has_css(&self) -> bool {
        self.css_path.is_some()
    }

    pub fn has_js(&self) -> bool {
        self.js_path.is_some()
    }

    /// File stem of the template (`Form` for `common/Form.jinja`).
    pub fn stem(&self) -> &str {
        Utf8Path::new(&self.rel_path).file_stem().unwrap_or("")
    }

    /// The relative path with its extension replaced, e.g. `common/Form.css`.
    pub fn rel_path_with_extension(&self, extension: &str) -> String {
        Utf8Path::new(&self.rel_path)
            .with_extension(extension)
            .as_str()
            .to_string()
    }

    /// Short import alias: the last dotted segment of the name, without prefix.
    pub fn alias(&self) -> String {
        let name = match self.name.split_once(':') {
            Some((_, rest)) => rest,
            None => &self.name,
        };
        let last = name.rsplit('.').next().unwrap_or(name);
        to_pascal_case(last)
    }

    /// Fully qualified alias used when short aliases collide (`ui:Alert` -> `UiAlert`).
    pub fn qualified_alias(&self) -> String {
        let flat: String = self.name.chars().filter(|c| *c != ':' && *c != '.').collect();
        to_pascal_case(&flat)
    }
}

fn import_path_for(rel_path: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        rel_path.to_string()
    } else {
        format!("@{prefix}/{rel_path}")
    }
}

/// Derives the JinjaX identifier for a template at `rel` under a folder with `prefix`.
///
/// Directory segments are kept verbatim and the stem is PascalCased. An
/// `index` stem inside a directory names the component after that directory.
fn component_name(rel: &Utf8Path, prefix: &str) -> String {
    let dirs: Vec<&str> = rel
        .parent()
        .map(|p| p.iter().collect())
        .unwrap_or_default();
    let stem = rel.file_stem().unwrap_or("");

    let mut parts: Vec<String> = dirs.iter().map(|s| s.to_string()).collect();
    if stem.eq_ignore_ascii_case("index") && !parts.is_empty() {
        if let Some(last) = parts.last_mut() {
            *last = to_pascal_case(last);
        }
    } else {
        parts.push(to_pascal_case(stem));
    }

    let name = parts.join(".");
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}:{name}")
    }
}

fn sibling(file_path: &Utf8Path, extension: &str) -> Option<Utf8PathBuf> {
    let candidate = file_path.with_extension(extension);
    candidate.is_file().then_some(candidate)
}

/// Registry of every component found in the registered catalog folders.
///
/// Identifiers are unique: the first registration wins and later files
/// producing the same identifier are skipped.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: IndexMap<String, ComponentInfo>,
    folders: Vec<CatalogFolder>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans a folder and registers its components.
    ///
    /// Returns the number of newly registered components.
    pub fn add_folder(&mut self, folder: CatalogFolder) -> Result<usize, CatalogError> {
        if !folder.path.is_dir() {
            return Err(CatalogError::NotADirectory(folder.path));
        }
        let root = folder
            .path
            .canonicalize_utf8()
            .map_err(|source| CatalogError::Resolve {
                path: folder.path.clone(),
                source,
            })?;

        let mut count = 0;
        for file_path in discover_templates(&root)? {
            let Ok(rel) = file_path.strip_prefix(&root) else {
                continue;
            };
            let info = Self::make_component_info(&file_path, rel, &folder.prefix);
            if self.insert(info) {
                count += 1;
            }
        }

        debug!(root = %root, prefix = %folder.prefix, count, "registered catalog folder");
        self.folders.push(folder);
        Ok(count)
    }

    fn make_component_info(file_path: &Utf8Path, rel: &Utf8Path, prefix: &str) -> ComponentInfo {
        let rel_str = rel.iter().collect::<Vec<_>>().join("/");
        let mut info = ComponentInfo::new(component_name(rel, prefix), file_path, rel_str, prefix);
        info.css_path = sibling(file_path, "css");
        info.js_path = sibling(file_path, "js");
        info
    }

    /// Registers a component unless its identifier is already taken.
    ///
    /// Returns whether the component was added.
    pub fn insert(&mut self, info: ComponentInfo) -> bool {
        if self.components.contains_key(&info.name) {
            debug!(name = %info.name, path = %info.file_path, "skipping duplicate component");
            return false;
        }
        self.components.insert(info.name.clone(), info);
        true
    }

    /// Resolves a tag name to a component.
    ///
    /// Tries an exact match, then a case-insensitive match, then a match
    /// ignoring `-`/`_` separators.
    pub fn resolve(&self, tag_name: &str) -> Option<&ComponentInfo> {
        if let Some(info) = self.components.get(tag_name) {
            return Some(info);
        }

        let tag_lower = tag_name.to_lowercase();
        if let Some(info) = self
            .components
            .iter()
            .find(|(name, _)| name.to_lowercase() == tag_lower)
            .map(|(_, info)| info)
        {
            return Some(info);
        }

        let tag_norm = normalize(tag_name);
        self.components
            .iter()
            .find(|(name, _)| normalize(name) == tag_norm)
            .map(|(_, info)| info)
    }

    /// Returns the default import alias for a component.
    pub fn alias(&self, info: &ComponentInfo) -> String {
        info.alias()
    }

    /// Looks up a component by its exact identifier.
    pub fn get(&self, name: &str) -> Option<&ComponentInfo> {
        self.components.get(name)
    }

    /// Finds the component defined by the given template file.
    pub fn find_by_path(&self, file_path: &Utf8Path) -> Option<&ComponentInfo> {
        self.components.values().find(|info| info.file_path.as_path() == file_path)
    }

    /// Iterates components in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentInfo> {
        self.components.values()
    }

    /// Folders passed to [`ComponentRegistry::add_folder`], in order.
    pub fn folders(&self) -> &[CatalogFolder] {
        &self.folders
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_name_plain() {
        assert_eq!(component_name(Utf8Path::new("Card.jinja"), ""), "Card");
        assert_eq!(component_name(Utf8Path::new("my-button.jinja"), ""), "MyButton");
    }

    #[test]
    fn test_component_name_keeps_directory_case() {
        assert_eq!(
            component_name(Utf8Path::new("common/form.jinja"), ""),
            "common.Form"
        );
        assert_eq!(
            component_name(Utf8Path::new("lorem-ipsum/data_table.jinja"), "ui"),
            "ui:lorem-ipsum.DataTable"
        );
    }

    #[test]
    fn test_component_name_index_convention() {
        assert_eq!(component_name(Utf8Path::new("tab/index.jinja"), ""), "Tab");
        assert_eq!(
            component_name(Utf8Path::new("layout/side-bar/index.jinja"), ""),
            "layout.SideBar"
        );
        // A top-level index has no directory to borrow a name from.
        assert_eq!(component_name(Utf8Path::new("index.jinja"), ""), "Index");
    }

    #[test]
    fn test_import_path_is_pure() {
        let plain = ComponentInfo::new("common.Form", "/a/common/Form.jinja", "common/Form.jinja", "");
        assert_eq!(plain.import_path, "common/Form.jinja");

        let prefixed = ComponentInfo::new("ui:Alert", "/b/Alert.jinja", "Alert.jinja", "ui");
        assert_eq!(prefixed.import_path, "@ui/Alert.jinja");
    }

    #[test]
    fn test_aliases() {
        let info = ComponentInfo::new("ui:forms.date-picker", "/x", "forms/date-picker.jinja", "ui");
        assert_eq!(info.alias(), "DatePicker");
        assert_eq!(info.qualified_alias(), "UiformsdatePicker");

        let info = ComponentInfo::new("common.Alert", "/x", "common/Alert.jinja", "");
        assert_eq!(info.alias(), "Alert");
        assert_eq!(info.qualified_alias(), "CommonAlert");
    }

    #[test]
    fn test_rel_path_with_extension() {
        let info = ComponentInfo::new("common.Form", "/x", "common/Form.jinja", "");
        assert_eq!(info.rel_path_with_extension("css"), "common/Form.css");
        assert_eq!(info.stem(), "Form");
    }

    #[test]
    fn test_insert_first_wins() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.insert(ComponentInfo::new("Card", "/a/Card.jinja", "Card.jinja", "")));
        assert!(!registry.insert(ComponentInfo::new("Card", "/b/Card.jinja", "Card.jinja", "")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Card").unwrap().file_path, "/a/Card.jinja");
    }

    #[test]
    fn test_resolution_order() {
        let mut registry = ComponentRegistry::new();
        registry.insert(ComponentInfo::new("forms.DatePicker", "/a", "forms/DatePicker.jinja", ""));
        registry.insert(ComponentInfo::new("Forms.Datepicker", "/b", "Forms/Datepicker.jinja", ""));

        // Exact beats case-insensitive.
        assert_eq!(registry.resolve("Forms.Datepicker").unwrap().file_path, "/b");
        // Case-insensitive picks the first registration.
        assert_eq!(registry.resolve("FORMS.DATEPICKER").unwrap().file_path, "/a");
        // Separator-insensitive fallback.
        assert_eq!(registry.resolve("forms.Date-Picker").unwrap().file_path, "/a");
        assert!(registry.resolve("forms.Calendar").is_none());
    }
}
