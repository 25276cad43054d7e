//! Instruction text sent to the model.

use crate::model::Difficulty;

/// How many recently seen questions are echoed back as an exclusion hint.
pub const RECENT_QUESTION_WINDOW: usize = 3;

/// Build the instruction for one multiple-choice question.
///
/// `recent` is the seen set in insertion order; only the last
/// [`RECENT_QUESTION_WINDOW`] entries are included.
pub fn question_prompt(topic: &str, difficulty: Difficulty, recent: &[String]) -> String {
    let start = recent.len().saturating_sub(RECENT_QUESTION_WINDOW);
    let recent = &recent[start..];

    let exclusion = if recent.is_empty() {
        String::new()
    } else {
        let quoted: Vec<String> = recent.iter().map(|q| format!("\"{q}\"")).collect();
        format!(
            "- Do not repeat any of these recent questions: {}\n",
            quoted.join(", ")
        )
    };

    format!(
        r#"You are an expert tutor. Generate one unique multiple-choice quiz question on the topic: "{topic}"

Requirements:
- Ask a clear, academically accurate question.
- Provide four answer options labeled A, B, C, and D.
- Only one answer should be correct.
- Clearly label the correct answer with: Answer: [Correct Letter]
- Also include a brief explanation after the answer, clearly labeled: Explanation: [your explanation here]
{exclusion}
Example:
What does CPU stand for?
A. Central Processing Unit
B. Computer Program Utility
C. Central Power Unit
D. Computer Performance Unit
Answer: A
Explanation: The CPU, or Central Processing Unit, is the primary component of a computer that performs most of the processing inside a computer.

The difficulty level should be {phrase}
"#,
        phrase = difficulty.phrase(),
    )
}

/// Build the instruction for a hint derived from the answer rationale.
pub fn hint_prompt(explanation: &str) -> String {
    format!(
        "Provide a helpful hint for this quiz question without revealing the answer: {explanation}"
    )
}

/// Build the instruction for a free-form student follow-up.
pub fn follow_up_prompt(student_question: &str, question_context: Option<&str>) -> String {
    let mut prompt = String::new();
    if let Some(context) = question_context {
        prompt.push_str(&format!("The student is working on this quiz question: {context}\n"));
    }
    prompt.push_str(&format!(
        "A student asked: '{student_question}'.\n\
         Please provide a helpful explanation or clarification, without revealing the quiz answer directly. \
         Keep the tone friendly and educational."
    ));
    prompt
}
