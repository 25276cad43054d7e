//! quiztutor-core: Question lifecycle, parsing, and scoring.
//!
//! This crate defines the question data model, the `LlmProvider` trait, the
//! response grammar, and the session state machine that the quiztutor
//! presentation layers drive.

pub mod dedup;
pub mod error;
pub mod feedback;
pub mod generator;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod session;
pub mod traits;
pub mod tutor;

#[cfg(test)]
pub(crate) mod testing;

pub use dedup::{DedupOutcome, Deduplicator};
pub use error::{ProviderError, QuizError};
pub use feedback::ScoreBand;
pub use generator::{GenerationConfig, QuestionGenerator};
pub use model::{Difficulty, Letter, QuestionRecord, SeenSet};
pub use session::{AnswerOutcome, QuizSession, SessionSummary};
pub use traits::LlmProvider;
pub use tutor::Tutor;
