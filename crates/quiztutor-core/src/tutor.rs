//! Hints and follow-up explanations.
//!
//! Both calls return plain strings. Provider failures are folded into the
//! returned text so the presentation layer can show them like any reply.

use std::sync::Arc;

use tracing::warn;

use crate::generator::{complete, GenerationConfig};
use crate::prompt::{follow_up_prompt, hint_prompt};
use crate::traits::LlmProvider;

/// Wrong attempts after which follow-up nudges switch tone.
pub const PERSISTENCE_THRESHOLD: u32 = 3;

/// Phrases that ask for the answer outright. Matched case-insensitively.
const ANSWER_SEEKING_PHRASES: &[&str] = &[
    "what's the answer",
    "what is the answer",
    "give me the answer",
    "which one is correct",
    "is it",
    "correct answer",
    "choose the right one",
    "is the answer",
    "tell me the answer",
];

const EARLY_NUDGE: &str = "Not just yet! Let's go over the options to help you out.\n\n\
Read each choice again and ask yourself what it actually describes. \
Rule out the ones that clearly belong to a different idea, then compare what is left against the question.";

const PERSISTENT_NUDGE: &str = "You've made several attempts, keep going!\n\n\
Look back at the explanation you were given for each wrong choice. \
The correct option is the one none of those explanations rule out.";

/// Hint and follow-up helper over the text-generation capability.
pub struct Tutor {
    provider: Arc<dyn LlmProvider>,
    config: GenerationConfig,
}

impl Tutor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Ask for a hint seeded with the answer rationale.
    pub async fn hint(&self, explanation: &str) -> String {
        match complete(self.provider.as_ref(), &self.config, hint_prompt(explanation)).await {
            Ok(hint) => hint,
            Err(e) => {
                warn!(provider = self.provider.name(), "hint failed: {e}");
                format!("Error fetching hint: {e}")
            }
        }
    }

    /// Answer a free-form student question without giving the answer away.
    ///
    /// Direct requests for the answer get a canned nudge and never reach the
    /// provider.
    pub async fn follow_up(
        &self,
        student_question: &str,
        question_context: Option<&str>,
        wrong_attempts: u32,
    ) -> String {
        if asks_for_answer(student_question) {
            return nudge(wrong_attempts).to_string();
        }

        let prompt = follow_up_prompt(student_question, question_context);
        match complete(self.provider.as_ref(), &self.config, prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(provider = self.provider.name(), "follow-up failed: {e}");
                format!("Error fetching follow-up: {e}")
            }
        }
    }
}

/// Whether the text asks for the answer directly.
pub fn asks_for_answer(text: &str) -> bool {
    let lower = text.to_lowercase();
    ANSWER_SEEKING_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

fn nudge(wrong_attempts: u32) -> &'static str {
    if wrong_attempts < PERSISTENCE_THRESHOLD {
        EARLY_NUDGE
    } else {
        PERSISTENT_NUDGE
    }
}
