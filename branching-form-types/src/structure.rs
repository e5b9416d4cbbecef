use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{QuestionId, SpecError};

/// Mapping from an answer key to the question shown next.
pub type NextMap = BTreeMap<String, QuestionId>;

/// The format type tags this crate knows how to build.
pub const KNOWN_FORMATS: &[&str] = &["select", "text"];

/// The top-level declarative document: a start identifier and the questions.
///
/// Question entries are kept as raw JSON until the graph is built, so that a
/// single malformed entry can be dropped without rejecting the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Structure {
    /// Identifier of the first question to display.
    pub start: QuestionId,

    /// All question entries, keyed by identifier.
    #[serde(default)]
    pub questions: BTreeMap<QuestionId, serde_json::Value>,
}

impl Structure {
    /// Create a structure with no questions.
    pub fn new(start: impl Into<QuestionId>) -> Self {
        Self {
            start: start.into(),
            questions: BTreeMap::new(),
        }
    }

    /// Parse the structure document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Add a question entry, serializing the spec into its raw form.
    pub fn with_question(
        mut self,
        id: impl Into<QuestionId>,
        spec: &QuestionSpec,
    ) -> Result<Self, serde_json::Error> {
        let value = serde_json::to_value(spec)?;
        self.questions.insert(id.into(), value);
        Ok(self)
    }

    /// Add a raw question entry as authored.
    pub fn with_raw_question(mut self, id: impl Into<QuestionId>, value: serde_json::Value) -> Self {
        self.questions.insert(id.into(), value);
        self
    }

    /// Get the number of question entries (including malformed ones).
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Check if the structure has no question entries.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// One question as authored in the structure document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSpec {
    /// The heading of the question.
    pub title: String,

    /// Optional body text; may contain `[term]` markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// How the answer is captured.
    pub format: FormatSpec,

    /// Answer key to next question identifier. Required, but may be empty.
    pub next: NextMap,
}

impl QuestionSpec {
    /// Create a spec with no description and no transitions.
    pub fn new(title: impl Into<String>, format: FormatSpec) -> Self {
        Self {
            title: title.into(),
            description: None,
            format,
            next: NextMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a transition from an answer key to a question.
    pub fn with_next(mut self, answer: impl Into<String>, id: impl Into<QuestionId>) -> Self {
        self.next.insert(answer.into(), id.into());
        self
    }

    /// Parse a raw question entry.
    ///
    /// The format tag is checked first so that an unknown answer format is
    /// reported as such rather than as a generic deserialization failure.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SpecError> {
        let tag = value
            .get("format")
            .and_then(|format| format.get("type"))
            .ok_or(SpecError::MissingFormatType)?;
        let Some(tag) = tag.as_str() else {
            return Err(SpecError::UnknownFormat(tag.to_string()));
        };
        if !KNOWN_FORMATS.contains(&tag) {
            return Err(SpecError::UnknownFormat(tag.to_string()));
        }

        Ok(Self::deserialize(value)?)
    }
}

/// The answer-capture configuration of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FormatSpec {
    /// Pick from a list of options.
    Select {
        /// Whether several options may be selected before confirming.
        #[serde(default)]
        multiple: bool,

        /// The options, in display order.
        #[serde(default)]
        options: Vec<String>,
    },

    /// Free text input.
    Text,
}

impl FormatSpec {
    /// Create a single-choice select format.
    pub fn single<S: Into<String>>(options: impl IntoIterator<Item = S>) -> Self {
        Self::Select {
            multiple: false,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a multiple-choice select format.
    pub fn multiple<S: Into<String>>(options: impl IntoIterator<Item = S>) -> Self {
        Self::Select {
            multiple: true,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// The type tag as it appears in the document.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
            Self::Text => "text",
        }
    }
}
