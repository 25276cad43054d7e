//! Per-run quiz state.
//!
//! A [`QuizSession`] is created for one topic and difficulty, hands out up to
//! [`MAX_QUESTIONS`] questions, and scores answers. All mutation goes through
//! [`QuizSession::advance`] and [`QuizSession::submit_answer`]; presentation
//! layers only read the accessors.
//!
//! The session does not enforce attempt limits. Callers decide when a hint
//! unlocks and when a question locks, using [`QuizSession::wrong_attempts`].

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dedup::{DedupOutcome, Deduplicator};
use crate::error::QuizError;
use crate::feedback::{self, answers_match, ScoreBand};
use crate::generator::{GenerationConfig, QuestionGenerator};
use crate::model::{Difficulty, QuestionRecord, SeenSet};
use crate::traits::LlmProvider;
use crate::tutor::Tutor;

/// Questions per quiz.
pub const MAX_QUESTIONS: u32 = 5;

/// Result of one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    pub feedback: String,
}

/// Snapshot of a session's score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub topic: String,
    pub difficulty: Difficulty,
    pub started_at: DateTime<Utc>,
    pub questions_answered: u32,
    pub correct: u32,
    pub percentage: f64,
    pub band: ScoreBand,
    pub message: String,
}

impl SessionSummary {
    /// Save the summary as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary: {}", path.display()))?;
        Ok(())
    }
}

/// State of one quiz run.
pub struct QuizSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    topic: String,
    difficulty: Difficulty,
    max_questions: u32,
    current_question_number: u32,
    total_questions: u32,
    correct_count: u32,
    score: u32,
    wrong_attempts: u32,
    seen: SeenSet,
    current: Option<QuestionRecord>,
    last_outcome: Option<DedupOutcome>,
    dedup: Deduplicator,
    tutor: Tutor,
}

impl QuizSession {
    /// Start a session. Fails on an empty topic before any provider call.
    pub fn new(
        topic: impl Into<String>,
        difficulty: Difficulty,
        provider: Arc<dyn LlmProvider>,
        config: GenerationConfig,
    ) -> Result<Self, QuizError> {
        let topic = topic.into().trim().to_string();
        if topic.is_empty() {
            return Err(QuizError::EmptyTopic);
        }

        let tutor = Tutor::new(Arc::clone(&provider), config.clone());
        let dedup = Deduplicator::new(QuestionGenerator::new(provider, config));

        Ok(Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            topic,
            difficulty,
            max_questions: MAX_QUESTIONS,
            current_question_number: 1,
            total_questions: 0,
            correct_count: 0,
            score: 0,
            wrong_attempts: 0,
            seen: SeenSet::new(),
            current: None,
            last_outcome: None,
            dedup,
            tutor,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn max_questions(&self) -> u32 {
        self.max_questions
    }

    /// 1-based number of the question about to be (or being) asked.
    pub fn current_question_number(&self) -> u32 {
        self.current_question_number
    }

    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    /// The in-flight question, if one has been delivered.
    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.current.as_ref()
    }

    /// How the last question was obtained.
    pub fn last_outcome(&self) -> Option<&DedupOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.current_question_number > self.max_questions
    }

    /// Fetch and install the next question.
    #[instrument(skip(self), fields(session = %self.id, number = self.current_question_number))]
    pub async fn advance(&mut self) -> Result<QuestionRecord, QuizError> {
        if self.is_finished() {
            return Err(QuizError::SessionFinished(self.max_questions));
        }

        let outcome = self
            .dedup
            .next_unique(&self.topic, &self.seen, self.difficulty)
            .await?;
        let record = outcome.record().clone();
        if !outcome.is_unique() {
            info!("delivering non-unique question: {}", record.question_text);
        }

        self.current = Some(record.clone());
        self.last_outcome = Some(outcome);
        self.wrong_attempts = 0;
        self.current_question_number += 1;
        self.total_questions += 1;
        Ok(record)
    }

    /// Score a letter against the in-flight question.
    ///
    /// Every call counts: an incorrect letter always bumps `wrong_attempts`
    /// and a correct one always bumps the score, so callers must stop
    /// submitting once a question is answered correctly.
    pub fn submit_answer(&mut self, user_letter: &str) -> Result<AnswerOutcome, QuizError> {
        let current = self.current.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        let correct_letter = current.correct_letter.map(|l| l.as_str()).unwrap_or("");

        let is_correct = answers_match(user_letter, correct_letter);
        let feedback = feedback::feedback(user_letter, correct_letter, &current.explanation);
        self.seen.insert(current.question_text.clone());

        if is_correct {
            self.score += 1;
            self.correct_count += 1;
        } else {
            self.wrong_attempts += 1;
        }

        Ok(AnswerOutcome {
            is_correct,
            feedback,
        })
    }

    /// Percentage of delivered questions answered correctly; 0 before any.
    pub fn score_percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) * 100.0 / f64::from(self.total_questions)
    }

    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::from_percentage(self.score_percentage())
    }

    pub fn get_score_message(&self) -> &'static str {
        self.score_band().message()
    }

    /// Hint for the in-flight question, derived from its explanation.
    pub async fn get_hint(&self) -> Result<String, QuizError> {
        let current = self.current.as_ref().ok_or(QuizError::NoActiveQuestion)?;
        Ok(self.tutor.hint(&current.explanation).await)
    }

    /// Answer a free-form student question about the in-flight question.
    pub async fn follow_up(&self, student_question: &str) -> String {
        let context = self.current.as_ref().map(|q| q.question_text.as_str());
        self.tutor
            .follow_up(student_question, context, self.wrong_attempts)
            .await
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            topic: self.topic.clone(),
            difficulty: self.difficulty,
            started_at: self.started_at,
            questions_answered: self.total_questions,
            correct: self.correct_count,
            percentage: self.score_percentage(),
            band: self.score_band(),
            message: self.get_score_message().to_string(),
        }
    }
}
