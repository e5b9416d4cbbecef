use std::sync::Arc;

use crate::binder::{self, Bindings, FIELD_CLOSE, FIELD_OPEN};
use crate::dom::Document;

/// Name of the question template.
pub const QUESTION: &str = "question";
/// Name of the per-option template of select formats.
pub const OPTION: &str = "option";
/// Name of the confirm control of multiple-choice select formats.
pub const CONFIRM: &str = "confirm";
/// Name of the text input template.
pub const TEXT_INPUT: &str = "text_input";
/// Name of the terminology definition fragment.
pub const DEFINITION: &str = "definition";

/// A markup template, loaded once and shared read-only.
///
/// Rendering never touches the stored source: every call to `document` or
/// `instantiate` produces a fresh, independently owned tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    name: Arc<str>,
    source: Arc<str>,
}

impl Template {
    /// Create a template from its markup.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            source: Arc::from(source.into()),
        }
    }

    /// The template name, e.g. `"option"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The markup as loaded.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parse a fresh copy of the template.
    pub fn document(&self) -> Document {
        Document::parse(&self.source)
    }

    /// Fill `{field}` placeholders and parse the result.
    pub fn instantiate(&self, fields: &Bindings) -> Document {
        Document::parse(&binder::fill(&self.source, fields, FIELD_OPEN, FIELD_CLOSE))
    }
}

/// The set of templates a form renders with.
#[derive(Debug, Clone)]
pub struct Templates {
    /// Frame of every question; must contain the options slot.
    pub question: Template,
    /// One instance per select option; binds `{name}`.
    pub option: Template,
    /// Confirm control of multiple-choice selects. Without it such
    /// questions can be answered but never confirmed.
    pub confirm: Option<Template>,
    /// Free text input.
    pub text_input: Template,
    /// Terminology fragment; binds `{text}`, `{definition}` and `{link}`.
    pub definition: Template,
}

impl Templates {
    /// Create a template set without a confirm control.
    pub fn new(
        question: impl Into<String>,
        option: impl Into<String>,
        text_input: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            question: Template::new(QUESTION, question),
            option: Template::new(OPTION, option),
            confirm: None,
            text_input: Template::new(TEXT_INPUT, text_input),
            definition: Template::new(DEFINITION, definition),
        }
    }

    /// Add the confirm control template.
    pub fn with_confirm(mut self, confirm: impl Into<String>) -> Self {
        self.confirm = Some(Template::new(CONFIRM, confirm));
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::binder::bindings;

    use super::*;

    #[test]
    fn instantiate_leaves_source_untouched() {
        let template = Template::new(OPTION, r#"<button class="clickable">{name}</button>"#);

        let first = template.instantiate(&bindings([("name", "A")]));
        let second = template.instantiate(&bindings([("name", "B")]));

        assert_eq!(first.inner_html(), r#"<button class="clickable">A</button>"#);
        assert_eq!(second.inner_html(), r#"<button class="clickable">B</button>"#);
        assert_eq!(template.source(), r#"<button class="clickable">{name}</button>"#);
    }
}
