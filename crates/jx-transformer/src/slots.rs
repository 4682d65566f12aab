//! Slot migration.
//!
//! JinjaX components declare named content holes with `{{ content("name") }}`
//! and callers fill them by branching on the `_slot` variable. Jx spells the
//! same thing as `{% slot %}` definitions and `{% fill %}` blocks.

use crate::patterns::{
    CONTENT_EMPTY_CALL, CONTENT_NAMED, ELIF_ANY, ELSE, ENDIF, IF_OPEN, SLOT_ELIF, SLOT_IF,
};
use regex::{Captures, Regex};
use tracing::debug;

/// Rewrites slot definitions.
///
/// `{{ content("name") }}` becomes `{% slot name %}{% endslot %}` and
/// `{{ content() }}` becomes `{{ content }}`. Trim markers on the call carry
/// over to the opening tag.
pub fn migrate_slot_definitions(source: &str) -> String {
    let named = CONTENT_NAMED.replace_all(
        source,
        "{%${open} slot ${name} ${close}%}{% endslot %}",
    );
    CONTENT_EMPTY_CALL
        .replace_all(&named, "{{${open} content ${close}}}")
        .into_owned()
}

/// One `_slot == "name"` arm of a conditional chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBranch {
    /// The slot being filled.
    pub name: String,
    /// The arm's body, verbatim.
    pub body: String,
}

/// A fully parsed `_slot` conditional chain that can be rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotBlock {
    /// Offset of the opening `{% if _slot == ... %}`.
    pub start: usize,
    /// Offset just past the closing `{% endif %}`.
    pub end: usize,
    /// Named arms in source order.
    pub branches: Vec<SlotBranch>,
    /// Body of the `{% else %}` arm, empty when absent.
    pub default_body: String,
}

/// Conditional tags the chain walk reacts to, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    IfOpen,
    SlotElif,
    OtherElif,
    Else,
    Endif,
}

fn markers() -> [(Marker, &'static Regex); 5] {
    [
        (Marker::IfOpen, &*IF_OPEN),
        (Marker::SlotElif, &*SLOT_ELIF),
        (Marker::OtherElif, &*ELIF_ANY),
        (Marker::Else, &*ELSE),
        (Marker::Endif, &*ENDIF),
    ]
}

/// Finds the earliest marker at or after `pos`.
fn next_marker(source: &str, pos: usize) -> Option<(Marker, Captures<'_>)> {
    let mut best: Option<(Marker, Captures<'_>)> = None;
    for (marker, rx) in markers() {
        let Some(caps) = rx.captures_at(source, pos) else {
            continue;
        };
        let start = caps.get(0).map_or(usize::MAX, |m| m.start());
        let earlier = match &best {
            Some((_, current)) => start < current.get(0).map_or(usize::MAX, |m| m.start()),
            None => true,
        };
        if earlier {
            best = Some((marker, caps));
        }
    }
    best
}

/// Result of walking one chain.
#[derive(Debug)]
enum ChainOutcome {
    Accepted(SlotBlock),
    /// An `elif` on something other than `_slot` at the chain's own depth.
    Mixed { start: usize, end: Option<usize> },
    /// No matching `{% endif %}`.
    Unclosed { start: usize },
}

/// State of the walk through one conditional chain.
struct ChainWalk {
    depth: usize,
    current_name: Option<String>,
    current_start: usize,
    branches: Vec<SlotBranch>,
    default_body: String,
    pure: bool,
    end: Option<usize>,
}

impl ChainWalk {
    fn new(first_name: &str, body_start: usize) -> Self {
        Self {
            depth: 1,
            current_name: Some(first_name.to_string()),
            current_start: body_start,
            branches: Vec::new(),
            default_body: String::new(),
            pure: true,
            end: None,
        }
    }

    /// Closes the open arm at a sibling `elif`/`else`.
    fn close_arm(&mut self, source: &str, at: usize) {
        if let Some(name) = self.current_name.take() {
            self.branches.push(SlotBranch {
                name,
                body: source[self.current_start..at].to_string(),
            });
        }
    }

    /// Closes the last arm at the chain's `endif`.
    fn finish(&mut self, source: &str, at: usize, end: usize) {
        let body = source[self.current_start..at].to_string();
        match self.current_name.take() {
            Some(name) => self.branches.push(SlotBranch { name, body }),
            None => self.default_body = body,
        }
        self.end = Some(end);
    }
}

fn walk_chain(source: &str, open: &Captures<'_>) -> Option<ChainOutcome> {
    let tag = open.get(0)?;
    let name = open.get(1)?.as_str();
    let start = tag.start();
    let mut walk = ChainWalk::new(name, tag.end());
    let mut pos = tag.end();

    while walk.depth > 0 && pos < source.len() {
        let Some((marker, caps)) = next_marker(source, pos) else {
            break;
        };
        let Some(found) = caps.get(0) else {
            break;
        };

        match marker {
            Marker::IfOpen => walk.depth += 1,
            Marker::Endif => {
                walk.depth -= 1;
                if walk.depth == 0 {
                    walk.finish(source, found.start(), found.end());
                }
            }
            Marker::SlotElif if walk.depth == 1 => {
                walk.close_arm(source, found.start());
                walk.current_name = caps.get(1).map(|m| m.as_str().to_string());
                walk.current_start = found.end();
            }
            Marker::OtherElif if walk.depth == 1 => {
                // Keep walking so the whole span is known and stays untouched.
                walk.pure = false;
                walk.close_arm(source, found.start());
                walk.current_start = found.end();
            }
            Marker::Else if walk.depth == 1 => {
                walk.close_arm(source, found.start());
                walk.current_start = found.end();
            }
            _ => {}
        }
        pos = found.end();
    }

    if !walk.pure {
        return Some(ChainOutcome::Mixed {
            start,
            end: walk.end,
        });
    }
    match walk.end {
        Some(end) if end > start && !walk.branches.is_empty() => {
            Some(ChainOutcome::Accepted(SlotBlock {
                start,
                end,
                branches: walk.branches,
                default_body: walk.default_body,
            }))
        }
        _ => Some(ChainOutcome::Unclosed { start }),
    }
}

/// Walks every `_slot` chain in source order.
///
/// A chain that begins inside an already walked chain belongs to that
/// chain's span and is not considered on its own. An unclosed chain spans to
/// the end of the source.
fn scan_chains(source: &str) -> Vec<ChainOutcome> {
    let mut outcomes = Vec::new();
    let mut covered_end = 0;
    for open in SLOT_IF.captures_iter(source) {
        let Some(tag) = open.get(0) else {
            continue;
        };
        if tag.start() < covered_end {
            continue;
        }
        if let Some(outcome) = walk_chain(source, &open) {
            match &outcome {
                ChainOutcome::Accepted(block) => covered_end = block.end,
                ChainOutcome::Mixed { end: Some(end), .. } => covered_end = *end,
                ChainOutcome::Mixed { end: None, .. } | ChainOutcome::Unclosed { .. } => {
                    covered_end = source.len();
                }
            }
            outcomes.push(outcome);
        }
    }
    outcomes
}

/// Finds every `{% if _slot == "..." %}` chain that can be rewritten.
pub fn find_slot_blocks(source: &str) -> Vec<SlotBlock> {
    scan_chains(source)
        .into_iter()
        .filter_map(|outcome| match outcome {
            ChainOutcome::Accepted(block) => Some(block),
            _ => None,
        })
        .collect()
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

/// Indentation of the line holding `offset`, when only whitespace precedes it.
fn indent_before(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let indent = &source[line_start..offset];
    if indent.chars().all(char::is_whitespace) {
        indent
    } else {
        ""
    }
}

/// Replaces `_slot` conditionals with `{% fill %}` blocks.
///
/// Chains mixing `_slot` tests with other conditions, and chains without a
/// closing `{% endif %}`, are left untouched and reported as warnings.
pub fn migrate_slot_usage(source: &str) -> (String, Vec<String>) {
    let mut warnings = Vec::new();
    let mut blocks = Vec::new();

    for outcome in scan_chains(source) {
        match outcome {
            ChainOutcome::Accepted(block) => blocks.push(block),
            ChainOutcome::Mixed { start, .. } => {
                let line = line_of(source, start);
                debug!(line, "mixed _slot conditional left unchanged");
                warnings.push(format!(
                    "Line {line}: _slot conditional mixed with other conditions was not migrated"
                ));
            }
            ChainOutcome::Unclosed { start } => {
                let line = line_of(source, start);
                debug!(line, "unclosed _slot conditional left unchanged");
                warnings.push(format!(
                    "Line {line}: _slot conditional without a matching endif was not migrated"
                ));
            }
        }
    }

    let mut output = source.to_string();
    // Last to first so earlier offsets stay valid.
    for block in blocks.iter().rev() {
        let separator = format!("\n{}", indent_before(&output, block.start));

        let mut parts: Vec<String> = block
            .branches
            .iter()
            .map(|branch| format!("{{% fill {} %}}{}{{% endfill %}}", branch.name, branch.body))
            .collect();
        if !block.default_body.trim().is_empty() {
            parts.push(block.default_body.clone());
        }

        output.replace_range(block.start..block.end, &parts.join(&separator));
    }

    (output, warnings)
}
