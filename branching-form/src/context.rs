use crate::binder::{self, Bindings};
use crate::template::Templates;
use crate::{FormConfig, Terminology};

/// Read-only state shared by every question of a form.
///
/// Built once after loading; the terminology fragments are rendered here so
/// each question render only runs the substitution passes.
#[derive(Debug)]
pub struct RenderContext {
    templates: Templates,
    definitions: Bindings,
    config: FormConfig,
}

impl RenderContext {
    /// Create a context, pre-rendering one definition fragment per term.
    pub fn new(templates: Templates, terminology: Terminology, config: FormConfig) -> Self {
        let definitions = binder::definition_bindings(
            &terminology,
            templates.definition.source(),
            &config.default_link,
        );
        Self {
            templates,
            definitions,
            config,
        }
    }

    /// The templates.
    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// The configuration.
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Replace `[term]` markers with their definition fragments.
    pub fn expand_terminology(&self, markup: &str) -> String {
        binder::fill_terms(markup, &self.definitions)
    }
}
