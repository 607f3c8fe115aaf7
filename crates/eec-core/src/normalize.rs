//! Key normalization
//!
//! Every source key (etcd path, environment variable name, CLI flag name)
//! is reduced to the same lowerCamelCase identifier so that the layers can
//! override each other:
//!
//! ```text
//! cfg/vast-service/db_host   (prefix "cfg/vast-service/")  -> dbHost
//! VAST_DB_HOST               (prefix "VAST_")              -> dbHost
//! --db-host                  (no prefix)                   -> dbHost
//! ```

use std::borrow::Cow;

/// Convert `raw_key` to lowerCamelCase, optionally removing `prefix` first.
///
/// The prefix is removed at its first occurrence *anywhere* in the key, not
/// only at the start: `normalize("a/cfg/b", Some("cfg/"))` yields `"aB"`.
/// Callers that need an anchored match check it before calling.
///
/// Steps after stripping:
///
/// 1. a lowercase letter or digit followed by an uppercase letter starts a
///    new word, so existing camelCase keys survive unchanged
/// 2. lowercase everything
/// 3. every character outside `[0-9a-z]` becomes a space
/// 4. uppercase the first letter of each space-delimited word
/// 5. lowercase the very first character
/// 6. drop the spaces
///
/// Never fails; the empty string maps to the empty string.
pub fn normalize(raw_key: &str, prefix: Option<&str>) -> String {
    let stripped = strip_anywhere(raw_key, prefix);
    let lowered = split_camel_words(&stripped).to_lowercase();

    let mut titled = String::with_capacity(lowered.len());
    let mut word_start = true;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            titled.push(if word_start { c.to_ascii_uppercase() } else { c });
            word_start = false;
        } else {
            titled.push(' ');
            word_start = true;
        }
    }

    let mut out = String::with_capacity(titled.len());
    let mut chars = titled.chars();
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_lowercase());
    }
    out.extend(chars);
    out.retain(|c| c != ' ');
    out
}

/// Remove the first occurrence of `prefix` from `key`, wherever it appears.
pub(crate) fn strip_anywhere<'a>(key: &'a str, prefix: Option<&str>) -> Cow<'a, str> {
    match prefix {
        Some(p) if !p.is_empty() && key.contains(p) => Cow::Owned(key.replacen(p, "", 1)),
        _ => Cow::Borrowed(key),
    }
}

fn split_camel_words(key: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    let mut changed = false;
    for c in key.chars() {
        if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
        {
            out.push(' ');
            changed = true;
        }
        out.push(c);
        prev = Some(c);
    }
    if changed { Cow::Owned(out) } else { Cow::Borrowed(key) }
}
