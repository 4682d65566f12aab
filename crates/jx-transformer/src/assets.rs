//! Asset migration.
//!
//! JinjaX serves a component's co-located `.css`/`.js` files through
//! `catalog.render_assets()`. Jx expects declared static URLs instead, so the
//! files are copied to a static folder and every declaration points there.

use crate::edit::{insert_after_line, insert_at};
use crate::patterns::{CSS_DECL, DEF_START, IMPORT, JS_DECL, RENDER_ASSETS};
use camino::{Utf8Path, Utf8PathBuf};
use jinjax_catalog::{ComponentInfo, ComponentRegistry};
use regex::{Captures, Regex};
use rustc_hash::FxHashSet;

/// The kinds of co-located asset a component can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Stylesheet,
    Script,
}

impl AssetKind {
    /// File extension, also the declaration keyword (`{#css ...#}`).
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "css",
            AssetKind::Script => "js",
        }
    }

    fn declaration(self) -> &'static Regex {
        match self {
            AssetKind::Stylesheet => &CSS_DECL,
            AssetKind::Script => &JS_DECL,
        }
    }

    fn source_path(self, info: &ComponentInfo) -> Option<&Utf8PathBuf> {
        match self {
            AssetKind::Stylesheet => info.css_path.as_ref(),
            AssetKind::Script => info.js_path.as_ref(),
        }
    }
}

/// Replaces `{{ catalog.render_assets() }}` with `{{ assets.render() }}`,
/// keeping any trim markers.
pub fn migrate_asset_rendering(source: &str) -> String {
    RENDER_ASSETS
        .replace_all(source, "{{${open} assets.render() ${close}}}")
        .into_owned()
}

/// Builds the static URL of an asset: `url_prefix` + `[prefix/]` + `rel_path`.
pub fn asset_url(rel_path: &str, prefix: &str, url_prefix: &str) -> String {
    if prefix.is_empty() {
        format!("{url_prefix}{rel_path}")
    } else {
        format!("{url_prefix}{prefix}/{rel_path}")
    }
}

/// Adds `{#css ...#}`/`{#js ...#}` declarations for co-located assets the
/// template does not mention yet.
///
/// New lines go after the last asset declaration, else before `{#def`, else
/// after the last import, else at the top of the file.
pub fn add_auto_assets(source: &str, info: Option<&ComponentInfo>, url_prefix: &str) -> String {
    let Some(info) = info else {
        return source.to_string();
    };

    let mut lines = Vec::new();
    for kind in [AssetKind::Stylesheet, AssetKind::Script] {
        if kind.source_path(info).is_none() {
            continue;
        }
        let ext = kind.extension();
        let rel = info.rel_path_with_extension(ext);
        let url = asset_url(&rel, &info.prefix, url_prefix);
        let stem_file = format!("{}.{ext}", info.stem());
        if source.contains(&url) || source.contains(&rel) || source.contains(&stem_file) {
            continue;
        }
        lines.push(format!("{{#{ext} {url} #}}"));
    }

    if lines.is_empty() {
        return source.to_string();
    }
    let block = format!("{}\n", lines.join("\n"));

    let last_declaration = CSS_DECL
        .find_iter(source)
        .chain(JS_DECL.find_iter(source))
        .map(|m| m.end())
        .max();

    if let Some(end) = last_declaration {
        insert_after_line(source, end, &block)
    } else if let Some(def) = DEF_START.find(source) {
        insert_at(source, def.start(), &block)
    } else if let Some(import) = IMPORT.find_iter(source).last() {
        insert_after_line(source, import.end(), &block)
    } else {
        insert_at(source, 0, &block)
    }
}

fn is_absolute_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://") || path.starts_with('/')
}

fn rewrite_declarations(source: &str, kind: AssetKind, prefix: &str, url_prefix: &str) -> String {
    kind.declaration()
        .replace_all(source, |caps: &Captures<'_>| {
            let paths: Vec<String> = caps[1]
                .split(',')
                .map(|p| p.trim().trim_matches(['"', '\'']))
                .filter(|p| !p.is_empty())
                .map(|p| {
                    if is_absolute_url(p) {
                        p.to_string()
                    } else {
                        asset_url(p, prefix, url_prefix)
                    }
                })
                .collect();
            format!("{{#{} {} #}}", kind.extension(), paths.join(", "))
        })
        .into_owned()
}

/// Points relative paths in asset declarations at the static folder.
///
/// Absolute paths and `http(s)://` URLs are kept as they are.
pub fn update_asset_paths(source: &str, info: Option<&ComponentInfo>, url_prefix: &str) -> String {
    let prefix = info.map_or("", |i| i.prefix.as_str());
    let source = rewrite_declarations(source, AssetKind::Stylesheet, prefix, url_prefix);
    rewrite_declarations(&source, AssetKind::Script, prefix, url_prefix)
}

/// Plans copying every co-located asset into `static_folder`.
///
/// Returns `(source, destination)` pairs in registration order; each
/// destination appears once.
pub fn plan_asset_copies(
    registry: &ComponentRegistry,
    static_folder: &Utf8Path,
) -> Vec<(Utf8PathBuf, Utf8PathBuf)> {
    let mut copies = Vec::new();
    let mut seen: FxHashSet<Utf8PathBuf> = FxHashSet::default();

    for info in registry.iter() {
        for kind in [AssetKind::Stylesheet, AssetKind::Script] {
            let Some(src) = kind.source_path(info) else {
                continue;
            };
            let rel = info.rel_path_with_extension(kind.extension());
            let dest = if info.prefix.is_empty() {
                static_folder.join(rel)
            } else {
                static_folder.join(&info.prefix).join(rel)
            };
            if seen.insert(dest.clone()) {
                copies.push((src.clone(), dest));
            }
        }
    }

    copies
}
