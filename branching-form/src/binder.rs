//! Placeholder substitution.
//!
//! Two independent, non-nesting placeholder syntaxes are supported:
//! `{name}` binds data fields and `[term]` binds terminology. Both are
//! scanned left to right; each opening mark pairs with the nearest closing
//! mark after it, and a key never spans a line break.
//!
//! Every occurrence of a bound key is replaced. Substituted values are not
//! scanned again within the same pass, which is what makes the field pass
//! followed by the terminology pass meaningful: a field value may carry
//! `[term]` markers that only the second pass expands.

use std::collections::HashMap;
use std::ops::Range;

use tracing::warn;

use crate::Terminology;

/// Opening mark of data-field placeholders.
pub const FIELD_OPEN: &str = "{";
/// Closing mark of data-field placeholders.
pub const FIELD_CLOSE: &str = "}";
/// Opening mark of terminology placeholders.
pub const TERM_OPEN: &str = "[";
/// Closing mark of terminology placeholders.
pub const TERM_CLOSE: &str = "]";

/// Key to substituted value.
pub type Bindings = HashMap<String, String>;

/// Build bindings from key/value pairs.
pub fn bindings<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Bindings
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// One delimited placeholder found in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// The text between the marks.
    pub key: &'a str,
    /// Byte range of the placeholder including both marks.
    pub span: Range<usize>,
}

/// The outcome of a fill pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filled {
    /// The markup with every bound placeholder substituted.
    pub markup: String,
    /// Distinct keys that had no binding, in order of first appearance.
    pub missing: Vec<String>,
}

/// Find all placeholders delimited by `open` … `close`.
pub fn placeholders<'a>(markup: &'a str, open: &str, close: &str) -> Vec<Placeholder<'a>> {
    let mut found = Vec::new();
    if open.is_empty() || close.is_empty() {
        return found;
    }

    let mut from = 0;
    while let Some(rel) = markup[from..].find(open) {
        let start = from + rel;
        let key_start = start + open.len();
        let Some(key_len) = markup[key_start..].find(close) else {
            break;
        };
        let key = &markup[key_start..key_start + key_len];
        if key.contains('\n') {
            from = key_start;
            continue;
        }
        let end = key_start + key_len + close.len();
        found.push(Placeholder {
            key,
            span: start..end,
        });
        from = end;
    }
    found
}

/// Substitute placeholders without logging; unbound keys are reported.
pub fn fill_report(markup: &str, data: &Bindings, open: &str, close: &str) -> Filled {
    let mut out = String::with_capacity(markup.len());
    let mut missing: Vec<String> = Vec::new();
    let mut last = 0;

    for placeholder in placeholders(markup, open, close) {
        match data.get(placeholder.key) {
            Some(value) => {
                out.push_str(&markup[last..placeholder.span.start]);
                out.push_str(value);
                last = placeholder.span.end;
            }
            None => {
                if !missing.iter().any(|k| k == placeholder.key) {
                    missing.push(placeholder.key.to_string());
                }
            }
        }
    }
    out.push_str(&markup[last..]);

    Filled {
        markup: out,
        missing,
    }
}

/// Substitute placeholders, leaving unbound ones in place.
///
/// Emits one warning per distinct unbound key.
pub fn fill(markup: &str, data: &Bindings, open: &str, close: &str) -> String {
    let filled = fill_report(markup, data, open, close);
    for key in &filled.missing {
        warn!(
            placeholder = %key,
            "No data defined to fill template placeholder, skipping"
        );
    }
    filled.markup
}

/// Render one definition fragment per term.
///
/// The fragment template may use `{text}`, `{definition}` and `{link}`;
/// terms without a link use `default_link`.
pub fn definition_bindings(
    terminology: &Terminology,
    fragment: &str,
    default_link: &str,
) -> Bindings {
    terminology
        .iter()
        .map(|(term, entry)| {
            let data = bindings([
                ("text", term.as_str()),
                ("definition", entry.definition.as_str()),
                ("link", entry.link_or(default_link)),
            ]);
            (term.clone(), fill(fragment, &data, FIELD_OPEN, FIELD_CLOSE))
        })
        .collect()
}

/// Replace `[term]` markers with pre-rendered definition fragments.
///
/// Terms without a definition stay as literal bracketed text.
pub fn fill_terms(markup: &str, definitions: &Bindings) -> String {
    let filled = fill_report(markup, definitions, TERM_OPEN, TERM_CLOSE);
    for term in &filled.missing {
        warn!(term = %term, "Term was not found in known terminology, skipping");
    }
    filled.markup
}

/// Expand `[term]` markers in `markup` using `terminology`.
pub fn expand_terminology(
    markup: &str,
    terminology: &Terminology,
    fragment: &str,
    default_link: &str,
) -> String {
    let definitions = definition_bindings(terminology, fragment, default_link);
    fill_terms(markup, &definitions)
}
