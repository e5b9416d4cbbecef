use std::rc::Rc;
use std::sync::mpsc::Sender;

use tracing::{debug, warn};

use crate::binder::{self, FIELD_CLOSE, FIELD_OPEN, bindings};
use crate::context::RenderContext;
use crate::dom::{Document, Node};
use crate::format::{AnswerFormat, Interaction};
use crate::{AnswerState, NextMap, QuestionId, QuestionSpec, SpecError};

/// The outcome of a confirmed answer, reported by a question to its controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The question that was answered.
    pub from: QuestionId,
    /// The confirmed answer.
    pub answer: AnswerState,
    /// The question to show next, or `None` if the answer is unmapped.
    pub to: Option<QuestionId>,
}

/// A question of the form: title, description, answer widget and transitions.
#[derive(Debug)]
pub struct Question {
    id: QuestionId,
    title: String,
    description: Option<String>,
    format: AnswerFormat,
    next: Rc<NextMap>,
    context: Rc<RenderContext>,
}

impl Question {
    /// Parse a raw question entry and build the question.
    ///
    /// Fails for unknown answer formats and for entries missing a required
    /// field; such questions are dropped from the graph.
    pub fn from_spec(
        id: QuestionId,
        value: &serde_json::Value,
        context: &Rc<RenderContext>,
        reporter: Sender<Transition>,
    ) -> Result<Self, SpecError> {
        let spec = QuestionSpec::from_value(value)?;
        Ok(Self::new(id, spec, context, reporter))
    }

    /// Build a question from an already parsed spec.
    ///
    /// The question listens to its own answer format: each confirmation is
    /// resolved against `next` and sent to `reporter`.
    pub fn new(
        id: QuestionId,
        spec: QuestionSpec,
        context: &Rc<RenderContext>,
        reporter: Sender<Transition>,
    ) -> Self {
        let QuestionSpec {
            title,
            description,
            format,
            next,
        } = spec;

        let mut format = AnswerFormat::from_spec(&format, context.templates());
        let next = Rc::new(next);

        let from = id.clone();
        let targets = Rc::clone(&next);
        let separator = context.config().answer_separator.clone();
        format.add_listener(move |state| {
            let to = resolve_next(&targets, state, &separator).cloned();
            let transition = Transition {
                from: from.clone(),
                answer: state.clone(),
                to,
            };
            if reporter.send(transition).is_err() {
                debug!(question = %from, "Controller is gone, dropping transition");
            }
        });

        Self {
            id,
            title,
            description,
            format,
            next,
            context: Rc::clone(context),
        }
    }

    /// The identifier.
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// The title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The answer format.
    pub fn format(&self) -> &AnswerFormat {
        &self.format
    }

    /// The transitions.
    pub fn next(&self) -> &NextMap {
        &self.next
    }

    /// The current answer.
    pub fn state(&self) -> &AnswerState {
        self.format.state()
    }

    /// Register an additional confirmation listener on the answer format.
    pub fn add_listener(&mut self, listener: impl FnMut(&AnswerState) + 'static) {
        self.format.add_listener(listener);
    }

    /// Deliver an interaction to the answer format.
    pub fn interact(&mut self, interaction: &Interaction) -> Option<AnswerState> {
        self.format.interact(interaction)
    }

    /// Resolve the question an answer leads to.
    pub fn next_for(&self, state: &AnswerState) -> Option<&QuestionId> {
        resolve_next(&self.next, state, &self.context.config().answer_separator)
    }

    /// Render the question into fresh nodes.
    ///
    /// Fields are bound first, then terminology, then the answer format is
    /// appended into the options slot.
    pub fn render(&self) -> Vec<Node> {
        let description = self.description.as_deref().unwrap_or("");
        let fields = bindings([
            ("id", self.id.as_str()),
            ("title", self.title.as_str()),
            ("content", description),
            ("description", description),
        ]);

        let templates = self.context.templates();
        let markup = binder::fill(templates.question.source(), &fields, FIELD_OPEN, FIELD_CLOSE);
        let markup = self.context.expand_terminology(&markup);

        let mut document = Document::parse(&markup);
        let slot = self.context.config().options_slot.as_str();
        match document.element_by_id_mut(slot) {
            Some(options) => options.append(self.format.render()),
            None => warn!(
                question = %self.id,
                slot,
                "Question template has no options slot, answer format not rendered"
            ),
        }
        document.into_nodes()
    }
}

/// Look up the question an answer leads to.
///
/// A single value is the key itself; several values are joined with
/// `separator`. An empty answer never leads anywhere.
fn resolve_next<'a>(
    next: &'a NextMap,
    state: &AnswerState,
    separator: &str,
) -> Option<&'a QuestionId> {
    match state.values() {
        [] => None,
        [value] => next.get(value),
        _ => next.get(&state.join(separator)),
    }
}
