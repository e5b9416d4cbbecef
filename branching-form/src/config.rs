use serde::Deserialize;

use crate::DEFAULT_LINK;

/// Options controlling where a form finds its resources and how it renders.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Id of the element questions are attached into.
    pub display_region: String,
    /// Id of the loading indicator cleared once the form has started.
    pub loading_indicator: String,
    /// Id of the slot in the question template that receives the answer widget.
    pub options_slot: String,
    /// Directory holding the markup templates, relative to the loader base.
    pub templates_dir: String,
    /// Directory holding `structure.json` and `terminology.json`.
    pub config_dir: String,
    /// Separator used to join several selected answers into a `next` key.
    pub answer_separator: String,
    /// Link used for terms that do not define one.
    pub default_link: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FormConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            display_region: "questions".to_string(),
            loading_indicator: "loading".to_string(),
            options_slot: "options".to_string(),
            templates_dir: "templates".to_string(),
            config_dir: "config".to_string(),
            answer_separator: ",".to_string(),
            default_link: DEFAULT_LINK.to_string(),
        }
    }

    /// Parse a configuration from JSON; absent fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Set the id of the display region.
    pub fn with_display_region(mut self, id: impl Into<String>) -> Self {
        self.display_region = id.into();
        self
    }

    /// Set the id of the loading indicator.
    pub fn with_loading_indicator(mut self, id: impl Into<String>) -> Self {
        self.loading_indicator = id.into();
        self
    }

    /// Set the id of the options slot.
    pub fn with_options_slot(mut self, id: impl Into<String>) -> Self {
        self.options_slot = id.into();
        self
    }

    /// Set the templates directory.
    pub fn with_templates_dir(mut self, dir: impl Into<String>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Set the config directory.
    pub fn with_config_dir(mut self, dir: impl Into<String>) -> Self {
        self.config_dir = dir.into();
        self
    }

    /// Set the separator for multi-answer lookup keys.
    pub fn with_answer_separator(mut self, separator: impl Into<String>) -> Self {
        self.answer_separator = separator.into();
        self
    }

    /// Set the fallback link for terms.
    pub fn with_default_link(mut self, link: impl Into<String>) -> Self {
        self.default_link = link.into();
        self
    }

    /// Loader path of a template, e.g. `templates/question.html`.
    pub fn template_path(&self, name: &str) -> String {
        join(&self.templates_dir, &format!("{name}.html"))
    }

    /// Loader path of a config document, e.g. `config/structure.json`.
    pub fn config_path(&self, file: &str) -> String {
        join(&self.config_dir, file)
    }
}

fn join(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}
