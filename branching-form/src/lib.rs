//! Branching questionnaires rendered from markup templates.
//!
//! A form is described declaratively: a `Structure` of questions keyed by
//! identifier, each with an answer format and a `next` table mapping answers
//! to the following question. This crate turns that description into a
//! running form:
//! - `binder` - `{field}` and `[term]` placeholder substitution
//! - `dom` - A small markup tree used for rendering and display
//! - `AnswerFormat` - Select and text widgets that capture an answer
//! - `Question` and `QuestionGraph` - The constructed questions
//! - `FormController` - Loads resources, starts the form and navigates
//! - `ResourceLoader` - Where templates and config come from
//! - `DisplayRegion` - Where the current question is shown

// Re-export all types from branching-form-types
pub use branching_form_types::*;

pub mod binder;
pub mod dom;
pub mod template;

mod config;
pub use config::FormConfig;

mod listeners;
pub use listeners::Listeners;

mod format;
pub use format::{
    ACTION_ATTR, ANSWER_ATTR, AnswerFormat, CLICKABLE_CLASS, Interaction, SELECTED_ATTR,
    SelectFormat, TextFormat,
};

mod context;
pub use context::RenderContext;

mod question;
pub use question::{Question, Transition};

mod graph;
pub use graph::{BuildError, QuestionGraph};

mod loader;
pub use loader::{
    DirLoader, MemoryLoader, ResourceLoader, Resources, STRUCTURE_FILE, TERMINOLOGY_FILE,
};

mod region;
pub use region::{DisplayRegion, PageRegion};

mod controller;
pub use controller::FormController;

pub use template::{Template, Templates};
