//! Name conversions between file stems, tag names and aliases.

/// Converts a kebab-case or snake_case name to PascalCase.
///
/// Each `-`/`_` separated word gets an uppercase first character; the rest
/// of the word is kept as written, so names that are already PascalCase
/// pass through unchanged.
pub fn to_pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for part in name.split(['-', '_']).filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Converts a PascalCase name to kebab-case.
pub fn kebab_case(name: &str) -> String {
    let mut dashed = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            dashed.push('-');
        }
        dashed.push(ch.to_ascii_lowercase());
    }

    let mut out = String::with_capacity(dashed.len());
    for ch in dashed.trim_matches('-').chars() {
        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.push(ch);
    }
    out
}

/// Normalizes a component name for fuzzy matching.
///
/// Strips hyphens and underscores and lowercases, so `Foo.LoremIpsum.Bar`
/// and `foo.lorem-ipsum.Bar` both become `foo.loremipsum.bar`.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
