use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::mpsc::Sender;

use tracing::{debug, warn};

use crate::context::RenderContext;
use crate::question::{Question, Transition};
use crate::{QuestionId, SpecError, Structure};

/// A question entry that was dropped while building the graph.
#[derive(Debug, thiserror::Error)]
#[error("Dropped question '{id}': {error}")]
pub struct BuildError {
    /// Identifier of the dropped entry.
    pub id: QuestionId,
    /// Why it could not be built.
    #[source]
    pub error: SpecError,
}

/// The constructed questions of a form, keyed by identifier, plus the start.
#[derive(Debug)]
pub struct QuestionGraph {
    start: QuestionId,
    questions: BTreeMap<QuestionId, Question>,
}

impl QuestionGraph {
    /// Build every question of `structure`.
    ///
    /// Entries that fail to build are left out of the graph and returned
    /// alongside it; building never aborts.
    pub fn build(
        structure: &Structure,
        context: &Rc<RenderContext>,
        reporter: &Sender<Transition>,
    ) -> (Self, Vec<BuildError>) {
        let (questions, errors) = structure.questions.iter().fold(
            (BTreeMap::new(), Vec::new()),
            |(mut questions, mut errors), (id, value)| {
                match Question::from_spec(id.clone(), value, context, reporter.clone()) {
                    Ok(question) => {
                        questions.insert(id.clone(), question);
                    }
                    Err(error) => {
                        warn!(question = %id, %error, "Dropping question from the form");
                        errors.push(BuildError {
                            id: id.clone(),
                            error,
                        });
                    }
                }
                (questions, errors)
            },
        );

        let graph = Self {
            start: structure.start.clone(),
            questions,
        };
        for (from, answer, to) in graph.dangling() {
            warn!(question = %from, answer = %answer, target = %to, "Transition leads to an unknown question");
        }
        debug!(
            questions = graph.len(),
            dropped = errors.len(),
            "Built question graph"
        );
        (graph, errors)
    }

    /// The start identifier, whether or not it resolves.
    pub fn start(&self) -> &QuestionId {
        &self.start
    }

    /// The start question, if it was built.
    pub fn start_question(&self) -> Option<&Question> {
        self.questions.get(&self.start)
    }

    /// Look up a question.
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.get(id)
    }

    /// Look up a question mutably.
    pub fn get_mut(&mut self, id: &QuestionId) -> Option<&mut Question> {
        self.questions.get_mut(id)
    }

    /// Check if a question is in the graph.
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.questions.contains_key(id)
    }

    /// Get the number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Check if the graph has no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Transitions whose target is not in the graph, as `(from, answer, to)`.
    pub fn dangling(&self) -> Vec<(&QuestionId, &str, &QuestionId)> {
        let questions = &self.questions;
        questions
            .values()
            .flat_map(move |question| {
                question
                    .next()
                    .iter()
                    .filter(move |(_, to)| !questions.contains_key(*to))
                    .map(move |(answer, to)| (question.id(), answer.as_str(), to))
            })
            .collect()
    }
}
