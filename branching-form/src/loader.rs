//! Resource loading.
//!
//! A form needs five templates and two config documents before it can build
//! its question graph. They are fetched once, strictly one after another,
//! and any failure aborts startup.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use crate::template::{self, Template, Templates};
use crate::{FormConfig, FormError, Structure, Terminology};

/// Name of the structure document inside the config directory.
pub const STRUCTURE_FILE: &str = "structure.json";
/// Name of the terminology document inside the config directory.
pub const TERMINOLOGY_FILE: &str = "terminology.json";

/// Fetches resource text by path, e.g. `templates/question.html`.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// Load the resource at `path`.
    async fn load_text(&self, path: &str) -> anyhow::Result<String>;
}

/// Loads resources from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirLoader {
    base: PathBuf,
}

impl DirLoader {
    /// Create a loader rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

#[async_trait]
impl ResourceLoader for DirLoader {
    async fn load_text(&self, path: &str) -> anyhow::Result<String> {
        let full = self.base.join(path);
        tokio::fs::read_to_string(&full)
            .await
            .with_context(|| format!("reading {}", full.display()))
    }
}

/// Serves resources from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    resources: HashMap<String, String>,
}

impl MemoryLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource.
    pub fn with_resource(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.resources.insert(path.into(), text.into());
        self
    }

    /// Add a resource in place.
    pub fn insert(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.resources.insert(path.into(), text.into());
    }

    /// Remove a resource.
    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.resources.remove(path)
    }
}

#[async_trait]
impl ResourceLoader for MemoryLoader {
    async fn load_text(&self, path: &str) -> anyhow::Result<String> {
        self.resources
            .get(path)
            .cloned()
            .with_context(|| format!("resource not found: {path}"))
    }
}

/// Everything a form needs to build its question graph.
#[derive(Debug, Clone)]
pub struct Resources {
    /// The markup templates.
    pub templates: Templates,
    /// The question graph as authored.
    pub structure: Structure,
    /// The terms and their definitions.
    pub terminology: Terminology,
}

impl Resources {
    /// Load all templates, then the structure, then the terminology.
    pub async fn load<L>(loader: &L, config: &FormConfig) -> Result<Self, FormError>
    where
        L: ResourceLoader + ?Sized,
    {
        let question = load_template(loader, config, template::QUESTION).await?;
        let option = load_template(loader, config, template::OPTION).await?;
        let confirm = load_template(loader, config, template::CONFIRM).await?;
        let text_input = load_template(loader, config, template::TEXT_INPUT).await?;
        let definition = load_template(loader, config, template::DEFINITION).await?;
        let templates = Templates {
            question,
            option,
            confirm: Some(confirm),
            text_input,
            definition,
        };

        let path = config.config_path(STRUCTURE_FILE);
        let structure = Structure::from_json(&fetch(loader, &path).await?)
            .map_err(|source| FormError::Parse {
                resource: path,
                source,
            })?;

        let path = config.config_path(TERMINOLOGY_FILE);
        let terminology = Terminology::from_json(&fetch(loader, &path).await?)
            .map_err(|source| FormError::Parse {
                resource: path,
                source,
            })?;

        debug!(
            questions = structure.len(),
            terms = terminology.len(),
            "Loaded all templates and config"
        );
        Ok(Self {
            templates,
            structure,
            terminology,
        })
    }
}

async fn load_template<L>(loader: &L, config: &FormConfig, name: &str) -> Result<Template, FormError>
where
    L: ResourceLoader + ?Sized,
{
    let path = config.template_path(name);
    let source = fetch(loader, &path).await?;
    Ok(Template::new(name, source))
}

async fn fetch<L>(loader: &L, path: &str) -> Result<String, FormError>
where
    L: ResourceLoader + ?Sized,
{
    debug!(path, "Fetching resource");
    loader
        .load_text(path)
        .await
        .map_err(|err| FormError::load(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> MemoryLoader {
        MemoryLoader::new()
            .with_resource("templates/question.html", "<h2>{title}</h2><div id=\"options\"></div>")
            .with_resource("templates/option.html", "<button class=\"clickable\">{name}</button>")
            .with_resource("templates/confirm.html", "<button class=\"clickable\">OK</button>")
            .with_resource("templates/text_input.html", "<input>")
            .with_resource("templates/definition.html", "<abbr title=\"{definition}\">{text}</abbr>")
            .with_resource("config/structure.json", r#"{ "start": "0", "questions": {} }"#)
            .with_resource("config/terminology.json", r#"{ "weed": { "definition": "Unwanted" } }"#)
    }

    #[tokio::test]
    async fn loads_all_resources() {
        let resources = Resources::load(&complete(), &FormConfig::new()).await.unwrap();

        assert_eq!(resources.templates.option.name(), "option");
        assert!(resources.templates.confirm.is_some());
        assert_eq!(resources.structure.start.as_str(), "0");
        assert_eq!(resources.terminology.len(), 1);
    }

    #[tokio::test]
    async fn missing_template_is_a_load_error() {
        let mut loader = complete();
        loader.remove("templates/confirm.html");

        let err = Resources::load(&loader, &FormConfig::new()).await.unwrap_err();

        assert!(err.is_fatal());
        assert!(matches!(err, FormError::Load { ref resource, .. } if resource == "templates/confirm.html"));
    }

    #[tokio::test]
    async fn invalid_structure_is_a_parse_error() {
        let loader = complete().with_resource("config/structure.json", "{ not json");

        let err = Resources::load(&loader, &FormConfig::new()).await.unwrap_err();

        assert!(matches!(err, FormError::Parse { ref resource, .. } if resource == "config/structure.json"));
    }

    #[tokio::test]
    async fn dir_loader_reports_missing_files() {
        let loader = DirLoader::new("/nonexistent/branching-form");
        let err = loader.load_text("templates/question.html").await.unwrap_err();
        assert!(err.to_string().contains("question.html"));
    }
}
