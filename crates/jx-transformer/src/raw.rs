//! Shielding of `{% raw %}` regions.
//!
//! Raw regions are swapped for unique placeholder tokens before tag
//! rewriting and put back verbatim afterwards.

use crate::patterns::RAW_BLOCK;
use uuid::Uuid;

/// Placeholders standing in for raw regions of one source text.
#[derive(Debug, Default)]
pub struct RawBlocks {
    placeholders: Vec<(String, String)>,
}

impl RawBlocks {
    /// Number of shielded regions.
    pub fn len(&self) -> usize {
        self.placeholders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Puts every shielded region back in place of its token.
    pub fn restore(&self, source: &str) -> String {
        let mut restored = source.to_string();
        for (token, original) in &self.placeholders {
            restored = restored.replace(token.as_str(), original);
        }
        restored
    }
}

/// Replaces each `{% raw %}...{% endraw %}` region with a placeholder token.
pub fn protect_raw_blocks(source: &str) -> (String, RawBlocks) {
    let mut blocks = RawBlocks::default();
    let protected = RAW_BLOCK.replace_all(source, |caps: &regex::Captures<'_>| {
        let token = format!("__RAW_{}__", Uuid::new_v4().simple());
        blocks.placeholders.push((token.clone(), caps[0].to_string()));
        token
    });
    (protected.into_owned(), blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_protect_and_restore() {
        let source = "before {% raw %}<Card />{% endraw %} after";
        let (protected, blocks) = protect_raw_blocks(source);
        assert!(!protected.contains("<Card />"));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks.restore(&protected), source);
    }

    #[test]
    fn test_multiple_raw_blocks() {
        let source = "{% raw %}A{% endraw %} middle {% raw %}B{% endraw %}";
        let (protected, blocks) = protect_raw_blocks(source);
        assert_eq!(blocks.len(), 2);
        assert!(protected.contains(" middle "));
        assert_eq!(blocks.restore(&protected), source);
    }

    #[test]
    fn test_no_raw_blocks() {
        let (protected, blocks) = protect_raw_blocks("<Card />");
        assert_eq!(protected, "<Card />");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_whitespace_variants() {
        let source = "{%- raw -%}<Card />{%- endraw -%}";
        let (protected, blocks) = protect_raw_blocks(source);
        assert!(!protected.contains("<Card />"));
        assert_eq!(blocks.restore(&protected), source);
    }

    #[test]
    fn test_round_trip_adjacent_and_nested_looking() {
        for source in [
            "",
            "plain text",
            "{% raw %}a{% endraw %}{% raw %}b{% endraw %}",
            "{% raw %}{% raw %}inner{% endraw %}tail{% endraw %}",
            "{% raw %}\n<X>\n{% endraw %}\n{% raw %}unterminated",
        ] {
            let (protected, blocks) = protect_raw_blocks(source);
            assert_eq!(blocks.restore(&protected), source);
        }
    }
}
