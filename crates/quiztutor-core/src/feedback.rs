//! User-facing feedback text. Pure functions, no provider calls.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Whether a submitted letter matches the correct one, ignoring case and
/// surrounding whitespace. An empty correct letter never matches.
pub fn answers_match(user_letter: &str, correct_letter: &str) -> bool {
    let correct = correct_letter.trim();
    !correct.is_empty() && user_letter.trim().eq_ignore_ascii_case(correct)
}

/// Feedback for one submitted answer.
pub fn feedback(user_letter: &str, correct_letter: &str, explanation: &str) -> String {
    if answers_match(user_letter, correct_letter) {
        format!("Correct! Here's why: {explanation}")
    } else {
        format!("Not quite. Here's why that's not correct: {explanation} Please try again!")
    }
}

/// Score tiers for the end-of-quiz message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Mastery,
    GreatJob,
    NotBad,
    KeepStudying,
}

impl ScoreBand {
    /// Inclusive lower bounds, checked from the top.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 100.0 {
            ScoreBand::Mastery
        } else if percentage >= 80.0 {
            ScoreBand::GreatJob
        } else if percentage >= 60.0 {
            ScoreBand::NotBad
        } else {
            ScoreBand::KeepStudying
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ScoreBand::Mastery => "Perfect score! You're a quiz master!",
            ScoreBand::GreatJob => "Great job! You've mastered most of the material.",
            ScoreBand::NotBad => "Not bad! Review a few areas to strengthen your understanding.",
            ScoreBand::KeepStudying => {
                "Keep studying! Let's go over the topics again for better retention."
            }
        }
    }
}

/// End-of-quiz message for `score` correct out of `total`.
///
/// Zero questions is an error; callers that want a zero-guarded message use
/// `QuizSession::get_score_message`.
pub fn final_message(score: u32, total: u32) -> Result<&'static str, QuizError> {
    if total == 0 {
        return Err(QuizError::NoQuestionsScored);
    }
    let percentage = f64::from(score) * 100.0 / f64::from(total);
    Ok(ScoreBand::from_percentage(percentage).message())
}
