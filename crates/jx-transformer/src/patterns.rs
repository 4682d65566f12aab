//! Recognizers for the JinjaX and Jx markers the migration rewrites.
//!
//! Every marker accepts optional interior whitespace and trim markers next
//! to its delimiters. The `{{ }}` forms capture their trim markers so the
//! rewrite can keep them.

use regex::Regex;
use std::sync::LazyLock;

/// A component tag name: optional `prefix:`, dotted path, final segment
/// starting with an uppercase letter. Lowercase HTML elements never match.
const TAG_NAME: &str = r"(?:[0-9A-Za-z._-]+:)?(?:[0-9A-Za-z_-]+\.)*[A-Z][0-9A-Za-z_-]*";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("marker pattern is valid")
}

// === Component tags ===

/// `<Card`, `<ui:Button`, `<common.Form` followed by whitespace, `/` or `>`.
pub(crate) static OPEN_TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"<(?P<tag>{TAG_NAME})(?P<after>\s|/|>)")));

/// `</Card>`, `</ui:Button >`.
pub(crate) static CLOSE_TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"</(?P<tag>{TAG_NAME})\s*>")));

/// Either tag form, capturing the optional slash so the name can be swapped.
pub(crate) static TAG_REF: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"<(?P<slash>/?)(?P<tag>{TAG_NAME})(?P<after>\s|/|>)"
    ))
});

// === Literal regions ===

pub(crate) static RAW_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?s)\{%-?\s*raw\s*-?%\}.+?\{%-?\s*endraw\s*-?%\}"));

// === Metadata ===

/// One or more `{# ... #}` comments at the very start of the file.
pub(crate) static META_HEADER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?s)^(?:\s*\{#.*?#\})+"));

/// Start of a `{#def ... #}` parameter definition.
pub(crate) static DEF_START: LazyLock<Regex> = LazyLock::new(|| compile(r"\{#-?\s*def\s+"));

pub(crate) static CSS_DECL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?s)\{#-?\s*css\s+(.*?)\s*-?#\}"));

pub(crate) static JS_DECL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?s)\{#-?\s*js\s+(.*?)\s*-?#\}"));

/// `{#import "path" as Alias #}`; captures the path and the alias.
pub(crate) static IMPORT: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\{#-?\s*import\s+"([^"]+)"\s+as\s+(\w+)\s*-?#\}"#));

// === Slot definitions ===

/// `{{ content("name") }}`; captures `open`, `name` and `close`.
pub(crate) static CONTENT_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"\{\{(?P<open>-?)\s*content\(\s*["'](?P<name>\w+)["']\s*\)\s*(?P<close>-?)\}\}"#)
});

/// `{{ content() }}`; captures `open` and `close`.
pub(crate) static CONTENT_EMPTY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\{\{(?P<open>-?)\s*content\(\s*\)\s*(?P<close>-?)\}\}")
});

// === Slot usage conditionals ===

pub(crate) static SLOT_IF: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\{%-?\s*if\s+_slot\s*==\s*["'](\w+)["']\s*-?%\}"#));

pub(crate) static SLOT_ELIF: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\{%-?\s*elif\s+_slot\s*==\s*["'](\w+)["']\s*-?%\}"#));

pub(crate) static ELIF_ANY: LazyLock<Regex> = LazyLock::new(|| compile(r"\{%-?\s*elif\s+"));

pub(crate) static ELSE: LazyLock<Regex> = LazyLock::new(|| compile(r"\{%-?\s*else\s*-?%\}"));

pub(crate) static ENDIF: LazyLock<Regex> = LazyLock::new(|| compile(r"\{%-?\s*endif\s*-?%\}"));

pub(crate) static IF_OPEN: LazyLock<Regex> = LazyLock::new(|| compile(r"\{%-?\s*if\s+"));

// === Asset rendering ===

/// `{{ catalog.render_assets() }}`; captures `open` and `close`.
pub(crate) static RENDER_ASSETS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\{\{(?P<open>-?)\s*catalog\.render_assets\(\s*\)\s*(?P<close>-?)\}\}")
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_grammar() {
        let tags: Vec<&str> = OPEN_TAG
            .captures_iter("<Card> <ui:Button/> <common.Form\n <div> <span> <lower.case>")
            .map(|c| c.name("tag").unwrap().as_str())
            .collect();
        assert_eq!(tags, vec!["Card", "ui:Button", "common.Form"]);
    }

    #[test]
    fn test_trim_markers_accepted() {
        assert!(SLOT_IF.is_match(r#"{%- if _slot == "a" -%}"#));
        assert!(ENDIF.is_match("{%-endif-%}"));
        assert!(CSS_DECL.is_match("{#- css a.css -#}"));
        assert!(IMPORT.is_match(r#"{#- import "a.jinja" as A -#}"#));
        assert!(CONTENT_NAMED.is_match(r#"{{- content("a") -}}"#));
        assert!(CONTENT_EMPTY_CALL.is_match("{{-content()-}}"));
        assert!(RENDER_ASSETS.is_match("{{- catalog.render_assets() -}}"));
    }

    #[test]
    fn test_if_open_does_not_match_elif() {
        assert!(!IF_OPEN.is_match(r#"{% elif x %}"#));
        assert!(ELIF_ANY.is_match(r#"{% elif _slot == "a" %}"#));
    }
}
