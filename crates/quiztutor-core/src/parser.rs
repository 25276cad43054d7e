//! Response grammar for model output.
//!
//! Model replies are semi-structured text. Each line is classified on its
//! own ([`classify_line`]) and the classified lines are folded into a
//! [`ParsedResponse`], which is then normalized into a [`QuestionRecord`].
//! Noise is ignored rather than rejected: only a reply with no question line
//! or no choices at all is considered unparseable.

use thiserror::Error;

use crate::model::{Difficulty, Letter, QuestionRecord, CHOICE_COUNT, UNKNOWN_ANSWER_TEXT};

const ANSWER_PREFIX: &str = "Answer:";
const EXPLANATION_PREFIX: &str = "Explanation:";

/// Placeholder used when the model supplied fewer than four choices.
pub const MISSING_CHOICE_TEXT: &str = "(no option provided)";

/// Classification of a single response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty after trimming.
    Blank,
    /// `A.` .. `D.` followed by the option text.
    Choice(Letter, &'a str),
    /// `Answer:` followed by the raw answer value.
    Answer(&'a str),
    /// `Explanation:` followed by the rationale.
    Explanation(&'a str),
    /// Anything else.
    Text(&'a str),
}

/// Classify one line of model output.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    let mut chars = line.chars();
    if let (Some(c @ 'A'..='D'), Some('.')) = (chars.next(), chars.next()) {
        if let Some(letter) = Letter::from_char(c) {
            // Both prefix characters are ASCII, so byte offset 2 is a boundary.
            return LineKind::Choice(letter, line[2..].trim_start());
        }
    }

    if let Some(rest) = line.strip_prefix(ANSWER_PREFIX) {
        return LineKind::Answer(rest.trim());
    }
    if let Some(rest) = line.strip_prefix(EXPLANATION_PREFIX) {
        return LineKind::Explanation(rest.trim());
    }

    LineKind::Text(line)
}

/// Fields collected from a response before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    /// First plain-text line.
    pub question: Option<String>,
    /// Option texts in encounter order.
    pub choices: Vec<String>,
    /// Trimmed, upper-cased value of the last `Answer:` line.
    pub answer: Option<String>,
    /// Value of the last `Explanation:` line.
    pub explanation: String,
}

/// A response that cannot be turned into a question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("model response contained no question line")]
    MissingQuestion,
    #[error("model response contained no answer choices")]
    MissingChoices,
}

/// Fold the lines of `content` into a [`ParsedResponse`].
pub fn parse_response(content: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();

    for line in content.lines() {
        match classify_line(line) {
            LineKind::Blank => {}
            LineKind::Choice(_, text) => parsed.choices.push(text.to_string()),
            LineKind::Answer(value) => parsed.answer = Some(value.to_uppercase()),
            LineKind::Explanation(text) => parsed.explanation = text.to_string(),
            LineKind::Text(text) => {
                if parsed.question.is_none() {
                    parsed.question = Some(text.to_string());
                }
            }
        }
    }

    parsed
}

/// Resolve the raw `Answer:` value to a letter.
///
/// Accepts a bare letter (`"B"`) or a letter followed by punctuation
/// (`"B. Paris"`, `"B) Paris"`, `"[B]"`). Anything else is rejected.
pub fn parse_answer_letter(raw: &str) -> Option<Letter> {
    let value = raw
        .trim()
        .trim_start_matches(|c: char| matches!(c, '*' | '[' | '('));
    let mut chars = value.chars();
    let letter = Letter::from_char(chars.next()?)?;
    match chars.next() {
        None => Some(letter),
        Some(next) if !next.is_alphanumeric() => Some(letter),
        Some(_) => None,
    }
}

impl ParsedResponse {
    /// Normalize into a record with exactly four choices.
    ///
    /// The correct text is resolved against the choices the model actually
    /// supplied; padding never counts as an answer.
    pub fn into_record(self, difficulty: Difficulty) -> Result<QuestionRecord, ParseError> {
        let question_text = self.question.ok_or(ParseError::MissingQuestion)?;
        if self.choices.is_empty() {
            return Err(ParseError::MissingChoices);
        }

        let correct_letter = self.answer.as_deref().and_then(parse_answer_letter);
        let correct_text = correct_letter
            .and_then(|l| self.choices.get(l.index()))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_ANSWER_TEXT.to_string());

        let mut choices = self.choices;
        choices.truncate(CHOICE_COUNT);
        choices.resize(CHOICE_COUNT, MISSING_CHOICE_TEXT.to_string());

        Ok(QuestionRecord {
            question_text,
            choices,
            correct_letter,
            correct_text,
            explanation: self.explanation,
            difficulty,
        })
    }
}
