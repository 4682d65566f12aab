//! Import synthesis and tag renaming.
//!
//! JinjaX finds components implicitly by tag name. Jx needs one
//! `{#import "path" as Alias #}` per component a template uses, and tags
//! must be spelled with that alias. This pass runs last so it sees the final
//! markup of every other rewrite.

use crate::edit::{insert_after_line, insert_at};
use crate::patterns::{CLOSE_TAG, IMPORT, META_HEADER, OPEN_TAG, TAG_REF};
use crate::raw::protect_raw_blocks;
use jinjax_catalog::{ComponentInfo, ComponentRegistry};
use regex::Captures;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Collects every component tag name used in opening or closing tags.
pub fn find_component_tags(source: &str) -> BTreeSet<String> {
    OPEN_TAG
        .captures_iter(source)
        .chain(CLOSE_TAG.captures_iter(source))
        .map(|caps| caps["tag"].to_string())
        .collect()
}

/// Import declarations already present in the template, keyed by path.
fn existing_imports(source: &str) -> FxHashMap<String, String> {
    IMPORT
        .captures_iter(source)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect()
}

/// Components that want a given default alias, and how each was spelled.
#[derive(Default)]
struct AliasClaims<'r> {
    components: Vec<&'r ComponentInfo>,
    spellings: Vec<Vec<String>>,
}

impl<'r> AliasClaims<'r> {
    fn claim(&mut self, info: &'r ComponentInfo, tag: &str) {
        match self.components.iter().position(|c| c.name == info.name) {
            Some(i) => self.spellings[i].push(tag.to_string()),
            None => {
                self.components.push(info);
                self.spellings.push(vec![tag.to_string()]);
            }
        }
    }
}

/// Adds missing import declarations and renames component tags to their
/// import aliases.
///
/// Returns the new source and any alias-collision warnings. Text inside
/// `{% raw %}` blocks is never touched.
pub fn generate_imports_and_rename(
    source: &str,
    registry: &ComponentRegistry,
) -> (String, Vec<String>) {
    let mut warnings = Vec::new();
    let (source, raw_blocks) = protect_raw_blocks(source);
    if !raw_blocks.is_empty() {
        debug!(count = raw_blocks.len(), "raw blocks shielded from renaming");
    }

    let existing = existing_imports(&source);
    let mut imports: BTreeMap<String, String> = BTreeMap::new();
    let mut renames: FxHashMap<String, String> = FxHashMap::default();
    let mut claims: BTreeMap<String, AliasClaims<'_>> = BTreeMap::new();

    for tag in find_component_tags(&source) {
        let Some(info) = registry.resolve(&tag) else {
            continue;
        };

        if let Some(alias) = existing.get(&info.import_path) {
            if tag != *alias {
                renames.insert(tag, alias.clone());
            }
            continue;
        }

        let alias = registry.alias(info);
        claims.entry(alias.clone()).or_default().claim(info, &tag);
        imports.insert(info.import_path.clone(), alias.clone());
        if tag != alias {
            renames.insert(tag, alias);
        }
    }

    for (alias, claim) in &claims {
        if claim.components.len() < 2 {
            continue;
        }
        let names: Vec<&str> = claim.components.iter().map(|c| c.name.as_str()).collect();
        debug!(alias = %alias, components = ?names, "alias collision");
        warnings.push(format!(
            "Alias collision for '{alias}': {}. Using qualified names.",
            names.join(", ")
        ));

        for (info, spellings) in claim.components.iter().zip(&claim.spellings) {
            let qualified = info.qualified_alias();
            imports.insert(info.import_path.clone(), qualified.clone());
            for tag in spellings {
                if *tag == qualified {
                    renames.remove(tag);
                } else {
                    renames.insert(tag.clone(), qualified.clone());
                }
            }
        }
    }

    let source = if renames.is_empty() {
        source
    } else {
        TAG_REF
            .replace_all(&source, |caps: &Captures<'_>| match renames.get(&caps["tag"]) {
                Some(alias) => format!("<{}{}{}", &caps["slash"], alias, &caps["after"]),
                None => caps[0].to_string(),
            })
            .into_owned()
    };

    let import_lines: Vec<String> = imports
        .iter()
        .filter(|(path, _)| !existing.contains_key(*path))
        .map(|(path, alias)| format!("{{#import \"{path}\" as {alias} #}}"))
        .collect();

    let source = if import_lines.is_empty() {
        source
    } else {
        let block = format!("{}\n", import_lines.join("\n"));
        if let Some(last) = IMPORT.find_iter(&source).last() {
            insert_after_line(&source, last.end(), &block)
        } else if let Some(header) = META_HEADER.find(&source) {
            insert_at(&source, header.start(), &block)
        } else {
            insert_at(&source, 0, &block)
        }
    };

    (raw_blocks.restore(&source), warnings)
}
