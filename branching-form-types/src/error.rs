use crate::QuestionId;

/// Error raised when one question entry cannot be turned into a question.
///
/// These are recoverable: the entry is dropped from the graph.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The `format.type` tag is not one of the known answer formats.
    #[error("Unknown answer format: {0}")]
    UnknownFormat(String),

    /// The entry has no `format.type` tag at all.
    #[error("Question has no answer format type")]
    MissingFormatType,

    /// A required field is missing or has the wrong shape.
    #[error("Malformed question: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Error type for form startup and navigation.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A template or config resource could not be fetched.
    #[error("Failed to load resource '{resource}': {source}")]
    Load {
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    /// A config document was fetched but is not valid.
    #[error("Failed to parse resource '{resource}': {source}")]
    Parse {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// The start identifier does not name a question in the graph.
    #[error("Start question '{0}' is not in the question graph")]
    StartNotFound(QuestionId),

    /// The form was used before its resources were loaded.
    #[error("Form has not been initialized")]
    NotInitialized,
}

impl FormError {
    /// Create a load error from any error type.
    pub fn load(resource: impl Into<String>, err: impl Into<anyhow::Error>) -> Self {
        Self::Load {
            resource: resource.into(),
            source: err.into(),
        }
    }

    /// Check if this error leaves the form without any resources.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Parse { .. })
    }
}
