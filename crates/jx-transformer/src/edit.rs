//! Small splicing helpers shared by the rewriters that insert whole lines.

/// Inserts `block` at byte offset `pos`.
pub(crate) fn insert_at(source: &str, pos: usize, block: &str) -> String {
    let mut out = String::with_capacity(source.len() + block.len());
    out.push_str(&source[..pos]);
    out.push_str(block);
    out.push_str(&source[pos..]);
    out
}

/// Inserts `block` at the start of the line following the one containing
/// byte offset `end`. On the last line a newline is written first.
pub(crate) fn insert_after_line(source: &str, end: usize, block: &str) -> String {
    match source[end..].find('\n') {
        Some(i) => insert_at(source, end + i + 1, block),
        None => {
            let mut out = String::with_capacity(source.len() + block.len() + 1);
            out.push_str(source);
            out.push('\n');
            out.push_str(block);
            out
        }
    }
}
