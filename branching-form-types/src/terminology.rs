use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Link used for terminology entries that do not provide one.
pub const DEFAULT_LINK: &str = "#";

/// The definition of one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminologyEntry {
    /// Definition text, shown on hover.
    pub definition: String,

    /// Where the term links to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TerminologyEntry {
    /// Create an entry without a link.
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            definition: definition.into(),
            link: None,
        }
    }

    /// Set the link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Get the link, or `fallback` when the entry has none.
    pub fn link_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.link.as_deref().unwrap_or(fallback)
    }
}

/// Term text to definition, as loaded from the terminology document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Terminology {
    terms: BTreeMap<String, TerminologyEntry>,
}

impl Terminology {
    /// Create an empty terminology.
    pub fn new() -> Self {
        Self {
            terms: BTreeMap::new(),
        }
    }

    /// Parse the terminology document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Add a term.
    pub fn with_term(mut self, term: impl Into<String>, entry: TerminologyEntry) -> Self {
        self.terms.insert(term.into(), entry);
        self
    }

    /// Look up a term.
    pub fn get(&self, term: &str) -> Option<&TerminologyEntry> {
        self.terms.get(term)
    }

    /// Iterate over all terms.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TerminologyEntry)> {
        self.terms.iter()
    }

    /// Get the number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
