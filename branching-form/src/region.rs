use std::ops::Range;

use tracing::warn;

use crate::dom::{Document, Node};
use crate::{FormConfig, FormError};

/// Where a form displays its current question.
pub trait DisplayRegion {
    /// Show freshly rendered question nodes.
    fn attach(&mut self, nodes: Vec<Node>);

    /// Remove the nodes shown by the last `attach`.
    fn detach(&mut self);

    /// Called once the form has started; hides the loading indicator.
    fn loading_finished(&mut self) {}

    /// Called when resources failed to load; the form stays non-interactive.
    fn loading_failed(&mut self, _error: &FormError) {}
}

/// A display region inside a host page document.
///
/// Questions are attached into the element whose id is the configured
/// `display_region`; any other content of that element is left alone.
#[derive(Debug, Clone)]
pub struct PageRegion {
    page: Document,
    region_id: String,
    loading_id: String,
    attached: Option<Range<usize>>,
}

impl PageRegion {
    /// Wrap an existing page.
    pub fn new(page: Document, config: &FormConfig) -> Self {
        Self {
            page,
            region_id: config.display_region.clone(),
            loading_id: config.loading_indicator.clone(),
            attached: None,
        }
    }

    /// Parse a page from markup.
    pub fn from_markup(markup: &str, config: &FormConfig) -> Self {
        Self::new(Document::parse(markup), config)
    }

    /// A minimal page with a loading indicator and an empty display region.
    pub fn blank(config: &FormConfig) -> Self {
        let markup = format!(
            r#"<div id="{}">Loading...</div><div id="{}"></div>"#,
            config.loading_indicator, config.display_region
        );
        Self::from_markup(&markup, config)
    }

    /// The page.
    pub fn page(&self) -> &Document {
        &self.page
    }

    /// Serialize the page.
    pub fn html(&self) -> String {
        self.page.inner_html()
    }

    /// The nodes currently attached by the form.
    pub fn attached(&self) -> &[Node] {
        let Some(range) = &self.attached else {
            return &[];
        };
        self.page
            .element_by_id(&self.region_id)
            .and_then(|region| region.children().get(range.clone()))
            .unwrap_or(&[])
    }
}

impl DisplayRegion for PageRegion {
    fn attach(&mut self, nodes: Vec<Node>) {
        let Some(region) = self.page.element_by_id_mut(&self.region_id) else {
            warn!(region = %self.region_id, "Page has no display region, question not shown");
            return;
        };
        let len = region.children().len();
        let start = self.attached.as_ref().map_or(len, |range| range.start.min(len));
        region.append(nodes);
        self.attached = Some(start..region.children().len());
    }

    fn detach(&mut self) {
        let Some(range) = self.attached.take() else {
            return;
        };
        if let Some(region) = self.page.element_by_id_mut(&self.region_id) {
            let children = region.children_mut();
            let end = range.end.min(children.len());
            children.drain(range.start.min(end)..end);
        }
    }

    fn loading_finished(&mut self) {
        if let Some(loading) = self.page.element_by_id_mut(&self.loading_id) {
            loading.children_mut().clear();
        }
    }

    fn loading_failed(&mut self, error: &FormError) {
        if let Some(loading) = self.page.element_by_id_mut(&self.loading_id) {
            loading.set_attr("data-state", "failed");
            loading.set_attr("title", &error.to_string());
        }
    }
}
