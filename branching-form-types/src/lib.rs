//! Core types for the branching-form crate.
//!
//! This crate provides the declarative side of a branching questionnaire:
//! - `Structure` and `QuestionSpec` - The question graph as authored in JSON
//! - `FormatSpec` - How a question captures its answer (select or text)
//! - `Terminology` and `TerminologyEntry` - Terms hyperlinked to definitions
//! - `AnswerState` - The ordered answer values of one question
//! - `SpecError` and `FormError` - The error taxonomy

mod question_id;
pub use question_id::QuestionId;

mod answer_state;
pub use answer_state::AnswerState;

mod structure;
pub use structure::{FormatSpec, KNOWN_FORMATS, NextMap, QuestionSpec, Structure};

mod terminology;
pub use terminology::{DEFAULT_LINK, Terminology, TerminologyEntry};

mod error;
pub use error::{FormError, SpecError};
