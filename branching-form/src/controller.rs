use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, error, info, warn};

use crate::context::RenderContext;
use crate::format::Interaction;
use crate::graph::{BuildError, QuestionGraph};
use crate::loader::{ResourceLoader, Resources};
use crate::question::{Question, Transition};
use crate::region::DisplayRegion;
use crate::{FormConfig, FormError, QuestionId};

#[derive(Debug)]
enum Phase {
    Loading,
    Failed,
    Ready {
        graph: QuestionGraph,
        current: Option<QuestionId>,
    },
}

/// Drives a form: builds the question graph, shows the start question and
/// moves between questions as answers are confirmed.
///
/// All state lives on one thread. Questions report confirmed answers over a
/// channel that is drained after every dispatched interaction.
#[derive(Debug)]
pub struct FormController<R> {
    config: FormConfig,
    region: R,
    phase: Phase,
    sender: Sender<Transition>,
    receiver: Receiver<Transition>,
    build_errors: Vec<BuildError>,
}

impl<R: DisplayRegion> FormController<R> {
    /// Create a controller displaying into `region`.
    pub fn new(config: FormConfig, region: R) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            config,
            region,
            phase: Phase::Loading,
            sender,
            receiver,
            build_errors: Vec::new(),
        }
    }

    /// Load every resource through `loader`, then build the question graph.
    ///
    /// A load failure is fatal: the region is told, and the form stays
    /// non-interactive.
    pub async fn load<L>(&mut self, loader: &L) -> Result<&[BuildError], FormError>
    where
        L: ResourceLoader + ?Sized,
    {
        match Resources::load(loader, &self.config).await {
            Ok(resources) => Ok(self.initialize(resources)),
            Err(err) => {
                error!(error = %err, "Failed to load form resources");
                self.region.loading_failed(&err);
                self.phase = Phase::Failed;
                Err(err)
            }
        }
    }

    /// Build the question graph from loaded resources.
    ///
    /// Entries that cannot be built are dropped and returned; the rest of
    /// the form is unaffected.
    pub fn initialize(&mut self, resources: Resources) -> &[BuildError] {
        let Resources {
            templates,
            structure,
            terminology,
        } = resources;

        if let Phase::Ready {
            current: Some(_), ..
        } = &self.phase
        {
            self.region.detach();
        }

        let context = Rc::new(RenderContext::new(
            templates,
            terminology,
            self.config.clone(),
        ));
        let (graph, errors) = QuestionGraph::build(&structure, &context, &self.sender);
        if !errors.is_empty() {
            warn!(dropped = errors.len(), "Some questions could not be built");
        }

        // Transitions from a previous graph are stale.
        self.receiver.try_iter().for_each(drop);

        self.phase = Phase::Ready {
            graph,
            current: None,
        };
        self.build_errors = errors;
        &self.build_errors
    }

    /// Show the start question.
    ///
    /// The loading indicator is cleared even if the start question is
    /// missing; in that case nothing is displayed.
    pub fn start(&mut self) -> Result<QuestionId, FormError> {
        let Phase::Ready { graph, current } = &mut self.phase else {
            return Err(FormError::NotInitialized);
        };

        let Some(question) = graph.start_question() else {
            let start = graph.start().clone();
            error!(start = %start, "Start question is not in the question graph");
            self.region.loading_finished();
            return Err(FormError::StartNotFound(start));
        };

        if current.take().is_some() {
            self.region.detach();
        }
        self.region.attach(question.render());
        let id = question.id().clone();
        *current = Some(id.clone());
        self.region.loading_finished();
        info!(question = %id, "Form started");
        Ok(id)
    }

    /// Move to the question `next`.
    ///
    /// Returns `false`, leaving the current question displayed, if `next`
    /// is not in the graph.
    pub fn advance(&mut self, next: &QuestionId) -> bool {
        let Phase::Ready { graph, current } = &mut self.phase else {
            warn!(next = %next, "Cannot advance before the form is initialized");
            return false;
        };

        let Some(question) = graph.get(next) else {
            warn!(next = %next, "Next question is not in the question graph, staying");
            return false;
        };

        if current.is_some() {
            self.region.detach();
        }
        self.region.attach(question.render());
        debug!(from = ?current.as_ref().map(QuestionId::as_str), to = %next, "Advanced");
        *current = Some(next.clone());
        true
    }

    /// Render the displayed question again, e.g. to show toggled options.
    pub fn refresh(&mut self) -> bool {
        let Phase::Ready {
            graph,
            current: Some(id),
        } = &self.phase
        else {
            return false;
        };
        let Some(question) = graph.get(id) else {
            return false;
        };
        let nodes = question.render();
        self.region.detach();
        self.region.attach(nodes);
        true
    }

    /// Deliver an interaction to the displayed question and follow any
    /// transition it confirms.
    ///
    /// Returns the transitions reported while handling the interaction, in
    /// order, including unmapped answers (`to == None`).
    pub fn dispatch(&mut self, interaction: Interaction) -> Result<Vec<Transition>, FormError> {
        let Phase::Ready { graph, current } = &mut self.phase else {
            return Err(FormError::NotInitialized);
        };
        let Some(id) = current.as_ref() else {
            debug!(?interaction, "No question displayed, ignoring interaction");
            return Ok(Vec::new());
        };
        let Some(question) = graph.get_mut(id) else {
            return Ok(Vec::new());
        };

        question.interact(&interaction);

        let transitions: Vec<Transition> = self.receiver.try_iter().collect();
        for transition in &transitions {
            if self.current_id() != Some(&transition.from) {
                debug!(from = %transition.from, "Ignoring transition from a hidden question");
                continue;
            }
            match &transition.to {
                Some(to) => {
                    self.advance(to);
                }
                None => debug!(
                    question = %transition.from,
                    answer = ?transition.answer,
                    "Answer has no transition"
                ),
            }
        }
        Ok(transitions)
    }

    /// The displayed question.
    pub fn current(&self) -> Option<&Question> {
        match &self.phase {
            Phase::Ready {
                graph,
                current: Some(id),
            } => graph.get(id),
            _ => None,
        }
    }

    /// Identifier of the displayed question.
    pub fn current_id(&self) -> Option<&QuestionId> {
        match &self.phase {
            Phase::Ready { current, .. } => current.as_ref(),
            _ => None,
        }
    }

    /// The question graph, once initialized.
    pub fn graph(&self) -> Option<&QuestionGraph> {
        match &self.phase {
            Phase::Ready { graph, .. } => Some(graph),
            _ => None,
        }
    }

    /// Questions dropped by the last `initialize`.
    pub fn build_errors(&self) -> &[BuildError] {
        &self.build_errors
    }

    /// Check if the graph has been built.
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. })
    }

    /// Check if loading failed.
    pub fn has_failed(&self) -> bool {
        matches!(self.phase, Phase::Failed)
    }

    /// The configuration.
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// The display region.
    pub fn region(&self) -> &R {
        &self.region
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::dom::Node;
    use crate::template::Templates;
    use crate::{FormatSpec, QuestionSpec, Structure, Terminology};

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        shown: Vec<String>,
        detached: usize,
        finished: usize,
    }

    impl DisplayRegion for Recorder {
        fn attach(&mut self, nodes: Vec<Node>) {
            self.shown.push(crate::dom::to_html(&nodes));
        }

        fn detach(&mut self) {
            self.detached += 1;
        }

        fn loading_finished(&mut self) {
            self.finished += 1;
        }
    }

    fn resources(structure: Structure) -> Resources {
        Resources {
            templates: Templates::new(
                r#"<h2 id="{id}">{title}</h2><div id="options"></div>"#,
                r#"<button class="clickable">{name}</button>"#,
                "<input>",
                "{text}",
            )
            .with_confirm(r#"<button class="clickable">OK</button>"#),
            structure,
            terminology: Terminology::new(),
        }
    }

    fn two_questions() -> Structure {
        Structure::new("0")
            .with_question(
                "0",
                &QuestionSpec::new("First", FormatSpec::single(["A", "B"])).with_next("A", "1"),
            )
            .and_then(|s| s.with_question("1", &QuestionSpec::new("Second", FormatSpec::Text)))
            .unwrap()
    }

    #[test]
    fn start_before_initialize_fails() {
        let mut form = FormController::new(FormConfig::new(), Recorder::default());
        assert!(matches!(form.start(), Err(FormError::NotInitialized)));
        assert!(matches!(
            form.dispatch(Interaction::Confirm),
            Err(FormError::NotInitialized)
        ));
    }

    #[test]
    fn start_shows_start_question() {
        let mut form = FormController::new(FormConfig::new(), Recorder::default());
        form.initialize(resources(two_questions()));

        assert_eq!(form.start().unwrap(), QuestionId::new("0"));
        assert_eq!(form.current().map(|q| q.title()), Some("First"));
        assert_eq!(form.region().shown.len(), 1);
        assert!(form.region().shown[0].contains("First"));
        assert_eq!(form.region().finished, 1);
    }

    #[test]
    fn missing_start_displays_nothing() {
        let mut form = FormController::new(FormConfig::new(), Recorder::default());
        form.initialize(resources(Structure::new("nowhere")));

        let err = form.start().unwrap_err();

        assert!(matches!(err, FormError::StartNotFound(ref id) if id.as_str() == "nowhere"));
        assert!(!err.is_fatal());
        assert!(form.region().shown.is_empty());
        assert_eq!(form.current_id(), None);
    }

    #[test]
    fn click_advances_once() {
        let mut form = FormController::new(FormConfig::new(), Recorder::default());
        form.initialize(resources(two_questions()));
        form.start().unwrap();

        let transitions = form.dispatch(Interaction::Click("A".into())).unwrap();

        assert_eq!(transitions.len(), 1);
        assert_eq!(form.current_id(), Some(&QuestionId::new("1")));
        assert_eq!(form.region().shown.len(), 2);
        assert_eq!(form.region().detached, 1);
    }

    #[test]
    fn unmapped_answer_stays() {
        let mut form = FormController::new(FormConfig::new(), Recorder::default());
        form.initialize(resources(two_questions()));
        form.start().unwrap();

        let transitions = form.dispatch(Interaction::Click("B".into())).unwrap();

        assert_eq!(transitions[0].to, None);
        assert_eq!(form.current_id(), Some(&QuestionId::new("0")));
        assert_eq!(form.region().shown.len(), 1);
    }

    #[test]
    fn advance_to_unknown_question_stays() {
        let mut form = FormController::new(FormConfig::new(), Recorder::default());
        form.initialize(resources(two_questions()));
        form.start().unwrap();

        assert!(!form.advance(&QuestionId::new("9")));
        assert_eq!(form.current_id(), Some(&QuestionId::new("0")));
        assert_eq!(form.region().detached, 0);
    }

    #[test]
    fn build_errors_are_kept() {
        let structure = two_questions()
            .with_raw_question("2", json!({ "title": "X", "format": { "type": "slider" } }));
        let mut form = FormController::new(FormConfig::new(), Recorder::default());

        let dropped: Vec<_> = form
            .initialize(resources(structure))
            .iter()
            .map(|e| e.id.clone())
            .collect();

        assert_eq!(dropped, [QuestionId::new("2")]);
        assert_eq!(form.build_errors().len(), 1);
        assert_eq!(form.graph().map(QuestionGraph::len), Some(2));
    }
}
