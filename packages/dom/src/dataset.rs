//! `data-*` attribute name mapping.

const DATA_PREFIX: &str = "data-";

/// Map a `data-*` attribute name to its camel-cased dataset key.
///
/// Returns `None` for attributes outside the `data-` namespace. A `-`
/// followed by a lowercase ASCII letter is dropped and the letter is
/// upper-cased; any other `-` is kept.
pub fn dataset_key(attribute_name: &str) -> Option<String> {
    let rest = attribute_name.strip_prefix(DATA_PREFIX)?;
    let mut key = String::with_capacity(rest.len());
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                key.push(next.to_ascii_uppercase());
                chars.next();
                continue;
            }
        }
        key.push(c);
    }
    Some(key)
}

/// Map a camel-cased dataset key back to its `data-*` attribute name.
pub fn data_attribute_name(key: &str) -> String {
    let mut name = String::from(DATA_PREFIX);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}
