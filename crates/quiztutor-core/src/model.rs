//! Core data model types for quiztutor.
//!
//! A quiz is a sequence of [`QuestionRecord`]s produced from untrusted model
//! output. Records are always displayable: failures are represented by
//! sentinel records rather than errors.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Question text of the record returned when generation fails.
pub const ERROR_QUESTION_TEXT: &str = "Error generating question.";

/// Question text of the record returned when no usable question was produced.
pub const UNIQUE_FAILURE_TEXT: &str = "Failed to generate a unique question.";

/// Answer text used when the correct letter does not resolve to a choice.
pub const UNKNOWN_ANSWER_TEXT: &str = "Unknown";

/// Number of choices every question carries.
pub const CHOICE_COUNT: usize = 4;

/// Question difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parse a difficulty, falling back to [`Difficulty::Easy`] on anything
    /// unrecognized.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// The phrase appended to the question instruction.
    pub fn phrase(&self) -> &'static str {
        match self {
            Difficulty::Easy => "on a general knowledge topic for beginners.",
            Difficulty::Medium => "that requires some critical thinking or background knowledge.",
            Difficulty::Hard => "that is challenging and requires higher-level reasoning.",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "moderate" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// One of the four answer letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    /// Zero-based position in the choice list.
    pub fn index(self) -> usize {
        match self {
            Letter::A => 0,
            Letter::B => 1,
            Letter::C => 2,
            Letter::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Letter::A => "A",
            Letter::B => "B",
            Letter::C => "C",
            Letter::D => "D",
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Letter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::from_char(c).ok_or_else(|| format!("not an answer letter: {s}")),
            _ => Err(format!("not an answer letter: {s}")),
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// The question stem.
    pub question_text: String,
    /// Exactly four choices, in A..D order.
    pub choices: Vec<String>,
    /// The correct letter, if the model supplied a usable one.
    pub correct_letter: Option<Letter>,
    /// Text of the correct choice, or `"Unknown"`.
    pub correct_text: String,
    /// Why the correct answer is correct.
    pub explanation: String,
    /// Difficulty the question was requested at.
    pub difficulty: Difficulty,
}

impl QuestionRecord {
    /// The record that stands in for a failed generation.
    pub fn generation_error(explanation: impl Into<String>, difficulty: Difficulty) -> Self {
        Self::sentinel(ERROR_QUESTION_TEXT, explanation.into(), difficulty)
    }

    /// The record returned when deduplication produced nothing usable.
    pub fn unique_failure(explanation: impl Into<String>, difficulty: Difficulty) -> Self {
        Self::sentinel(UNIQUE_FAILURE_TEXT, explanation.into(), difficulty)
    }

    fn sentinel(text: &str, explanation: String, difficulty: Difficulty) -> Self {
        Self {
            question_text: text.to_string(),
            choices: Letter::ALL.iter().map(|l| l.to_string()).collect(),
            correct_letter: Some(Letter::A),
            correct_text: Letter::A.to_string(),
            explanation,
            difficulty,
        }
    }

    /// Whether this record is one of the failure sentinels.
    pub fn is_error(&self) -> bool {
        self.question_text == ERROR_QUESTION_TEXT || self.question_text == UNIQUE_FAILURE_TEXT
    }

    /// Choices paired with their letters, for display.
    pub fn lettered_choices(&self) -> impl Iterator<Item = (Letter, &str)> {
        Letter::ALL
            .iter()
            .copied()
            .zip(self.choices.iter().map(String::as_str))
    }
}

/// Question texts already shown in a session.
///
/// Keeps insertion order so the most recent texts can be fed back to the
/// model as an exclusion hint. Never shrinks.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text. Returns `false` if it was already present.
    pub fn insert(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.index.contains(&text) {
            return false;
        }
        self.index.insert(text.clone());
        self.order.push(text);
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.index.contains(text)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The last `n` inserted texts, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.order.len().saturating_sub(n);
        &self.order[start..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
