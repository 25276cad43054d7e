//! Bounded retry loop that avoids repeating questions.

use tracing::debug;

use crate::error::QuizError;
use crate::generator::QuestionGenerator;
use crate::model::{Difficulty, QuestionRecord, SeenSet};

const NO_EXPLANATION: &str = "No explanation available.";

/// What the retry loop ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupOutcome {
    /// A question not in the seen set.
    Unique(QuestionRecord),
    /// Every attempt repeated a seen question; this is the last one.
    ExhaustedDuplicate(QuestionRecord),
    /// The generator failed, or the budget allowed no attempt.
    Failed(QuestionRecord),
}

impl DedupOutcome {
    pub fn record(&self) -> &QuestionRecord {
        match self {
            DedupOutcome::Unique(r) | DedupOutcome::ExhaustedDuplicate(r) | DedupOutcome::Failed(r) => r,
        }
    }

    pub fn into_record(self) -> QuestionRecord {
        match self {
            DedupOutcome::Unique(r) | DedupOutcome::ExhaustedDuplicate(r) | DedupOutcome::Failed(r) => r,
        }
    }

    pub fn is_unique(&self) -> bool {
        matches!(self, DedupOutcome::Unique(_))
    }
}

/// Calls the generator until it produces a question outside the seen set.
pub struct Deduplicator {
    generator: QuestionGenerator,
    max_attempts: u32,
}

impl Deduplicator {
    pub fn new(generator: QuestionGenerator) -> Self {
        let max_attempts = generator.config().dedup_attempts;
        Self {
            generator,
            max_attempts,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Produce the next question for `topic`.
    ///
    /// A generator sentinel ends the loop at once; the provider is not asked
    /// again for the same question. When the budget runs out on duplicates
    /// the last one is returned rather than failing.
    pub async fn next_unique(
        &self,
        topic: &str,
        seen: &SeenSet,
        difficulty: Difficulty,
    ) -> Result<DedupOutcome, QuizError> {
        let recent = seen.recent(crate::prompt::RECENT_QUESTION_WINDOW).to_vec();
        let mut last_duplicate: Option<QuestionRecord> = None;

        for attempt in 1..=self.max_attempts {
            let record = self.generator.generate(topic, difficulty, &recent).await?;

            if record.is_error() {
                debug!(attempt, "generator failed: {}", record.explanation);
                return Ok(DedupOutcome::Failed(record));
            }
            if !seen.contains(&record.question_text) {
                debug!(attempt, "unique question found");
                return Ok(DedupOutcome::Unique(record));
            }

            debug!(attempt, "duplicate question: {}", record.question_text);
            last_duplicate = Some(record);
        }

        Ok(match last_duplicate {
            Some(record) => DedupOutcome::ExhaustedDuplicate(record),
            None => DedupOutcome::Failed(QuestionRecord::unique_failure(NO_EXPLANATION, difficulty)),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::generator::GenerationConfig;
    use crate::model::{ERROR_QUESTION_TEXT, UNIQUE_FAILURE_TEXT};
    use crate::testing::{question_reply, ScriptedProvider};

    fn dedup(provider: Arc<ScriptedProvider>) -> Deduplicator {
        Deduplicator::new(QuestionGenerator::new(provider, GenerationConfig::default()))
    }

    fn seen_with(texts: &[&str]) -> SeenSet {
        let mut seen = SeenSet::new();
        for t in texts {
            seen.insert(*t);
        }
        seen
    }

    #[tokio::test]
    async fn accepts_first_unseen_question() {
        let reply = question_reply(1);
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(reply.as_str())]));
        let outcome = dedup(provider.clone())
            .next_unique("Math", &SeenSet::new(), Difficulty::Easy)
            .await
            .unwrap();
        assert!(outcome.is_unique());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn retries_past_duplicates() {
        let dup = question_reply(1);
        let fresh = question_reply(2);
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(dup.as_str()),
            Ok(dup.as_str()),
            Ok(fresh.as_str()),
        ]));
        let seen = seen_with(&["Question number 1?"]);

        let outcome = dedup(provider.clone())
            .next_unique("Math", &seen, Difficulty::Easy)
            .await
            .unwrap();
        assert_eq!(outcome.record().question_text, "Question number 2?");
        assert!(outcome.is_unique());
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn five_identical_duplicates_return_the_duplicate() {
        let dup = question_reply(1);
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(dup.as_str())]));
        let seen = seen_with(&["Question number 1?"]);

        let outcome = dedup(provider.clone())
            .next_unique("Math", &seen, Difficulty::Easy)
            .await
            .unwrap();
        assert!(matches!(outcome, DedupOutcome::ExhaustedDuplicate(_)));
        assert_eq!(outcome.record().question_text, "Question number 1?");
        assert_eq!(provider.calls(), 5);
    }

    #[tokio::test]
    async fn generator_failure_is_returned_after_one_call() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err("401 bad key")]));
        let outcome = dedup(provider.clone())
            .next_unique("Math", &SeenSet::new(), Difficulty::Medium)
            .await
            .unwrap();

        let DedupOutcome::Failed(record) = outcome else {
            panic!("expected Failed, got {outcome:?}");
        };
        assert_eq!(record.question_text, ERROR_QUESTION_TEXT);
        assert!(record.explanation.contains("401 bad key"));
        assert_eq!(record.difficulty, Difficulty::Medium);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn failure_after_duplicates_still_fails() {
        let dup = question_reply(1);
        let fresh = question_reply(2);
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(dup.as_str()),
            Err("timeout"),
            Ok(fresh.as_str()),
        ]));
        let seen = seen_with(&["Question number 1?"]);

        let outcome = dedup(provider.clone())
            .next_unique("Math", &seen, Difficulty::Easy)
            .await
            .unwrap();
        assert!(matches!(outcome, DedupOutcome::Failed(_)));
        assert!(outcome.record().is_error());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn zero_budget_fails_without_calls() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let outcome = dedup(provider.clone())
            .with_max_attempts(0)
            .next_unique("Math", &SeenSet::new(), Difficulty::Easy)
            .await
            .unwrap();
        assert_eq!(outcome.record().question_text, UNIQUE_FAILURE_TEXT);
        assert_eq!(outcome.record().explanation, NO_EXPLANATION);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn empty_topic_propagates() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let err = dedup(provider)
            .next_unique("", &SeenSet::new(), Difficulty::Easy)
            .await
            .unwrap_err();
        assert_eq!(err, QuizError::EmptyTopic);
    }
}
