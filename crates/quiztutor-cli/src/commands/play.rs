//! The `quiztutor play` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use quiztutor_core::model::{Letter, QuestionRecord};
use quiztutor_core::session::{QuizSession, SessionSummary};
use quiztutor_core::traits::LlmProvider;
use quiztutor_core::Difficulty;
use quiztutor_providers::config::load_config_from;
use quiztutor_providers::create_provider;

/// Wrong answers before a hint can be requested.
const HINT_UNLOCK_ATTEMPTS: u32 = 1;

/// Wrong answers before a question locks.
const MAX_ATTEMPTS: u32 = 3;

const USAGE: &str = "Enter A-D to answer, `hint`, `ask <question>`, or `quit`.";

pub struct PlayArgs {
    pub topic: String,
    pub difficulty: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub config: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
    pub echo_prompts: bool,
}

/// One line of player input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Answer(Letter),
    Hint,
    Ask(String),
    Quit,
    Unknown,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if let Ok(letter) = line.parse::<Letter>() {
        return Command::Answer(letter);
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match word.to_lowercase().as_str() {
        "hint" => Command::Hint,
        "quit" | "exit" => Command::Quit,
        "ask" if !rest.trim().is_empty() => Command::Ask(rest.trim().to_string()),
        _ => Command::Unknown,
    }
}

/// Lenient difficulty parsing; unknown values fall back to easy.
fn resolve_difficulty(raw: &str) -> Difficulty {
    let difficulty = Difficulty::parse_lenient(raw);
    if raw.parse::<Difficulty>().is_err() {
        warn!("unknown difficulty '{raw}', using {difficulty}");
    }
    difficulty
}

/// How the player left a question.
enum Turn {
    Next,
    Quit,
}

pub async fn execute(args: PlayArgs) -> Result<()> {
    let config = load_config_from(args.config.as_deref())?;

    let provider_name = args
        .provider
        .clone()
        .unwrap_or_else(|| config.default_provider.clone());
    let provider_config = config.providers.get(&provider_name).with_context(|| {
        format!(
            "provider '{}' not found in config. Available: {:?}",
            provider_name,
            config.providers.keys().collect::<Vec<_>>()
        )
    })?;
    let provider: Arc<dyn LlmProvider> = Arc::from(create_provider(provider_config)?);

    let mut generation = config.generation_config(&provider_name, args.model.as_deref());
    generation.echo_prompts |= args.echo_prompts;

    let difficulty = resolve_difficulty(&args.difficulty);
    let mut session = QuizSession::new(args.topic, difficulty, provider, generation)?;

    println!(
        "quiztutor v{}: {} questions on {} ({})",
        env!("CARGO_PKG_VERSION"),
        session.max_questions(),
        session.topic(),
        session.difficulty()
    );
    println!("{USAGE}");

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    while !session.is_finished() {
        let number = session.current_question_number();
        let question = session.advance().await?;
        print_question(number, session.max_questions(), &question);

        let turn = if question.is_error() {
            println!("{}\n", question.explanation);
            after_error(&session, &mut input).await?
        } else {
            play_question(&mut session, &mut input).await?
        };
        if let Turn::Quit = turn {
            break;
        }
    }

    let summary = session.summary();
    print_summary(&summary);

    if let Some(path) = &args.summary_json {
        summary.save_json(path)?;
        eprintln!("Summary saved to: {}", path.display());
    }

    Ok(())
}

async fn play_question(
    session: &mut QuizSession,
    input: &mut Lines<BufReader<Stdin>>,
) -> Result<Turn> {
    loop {
        let Some(line) = input.next_line().await.context("failed to read input")? else {
            return Ok(Turn::Quit);
        };

        match parse_command(&line) {
            Command::Answer(letter) => {
                let outcome = session.submit_answer(letter.as_str())?;
                println!("{}\n", outcome.feedback);
                if outcome.is_correct {
                    return Ok(Turn::Next);
                }
                if session.wrong_attempts() >= MAX_ATTEMPTS {
                    if let Some(question) = session.current_question() {
                        let letter = question.correct_letter.map_or("?", |l| l.as_str());
                        println!(
                            "Out of attempts. The answer was {letter}) {}\n",
                            question.correct_text
                        );
                    }
                    return Ok(Turn::Next);
                }
            }
            Command::Hint => {
                if session.wrong_attempts() < HINT_UNLOCK_ATTEMPTS {
                    println!("Hints unlock after one wrong answer.\n");
                } else {
                    println!("Hint: {}\n", session.get_hint().await?);
                }
            }
            Command::Ask(text) => {
                println!("{}\n", session.follow_up(&text).await);
            }
            Command::Quit => return Ok(Turn::Quit),
            Command::Unknown => println!("{USAGE}"),
        }
    }
}

/// Wait for the player after an error question: Enter moves on, `quit` stops.
async fn after_error(session: &QuizSession, input: &mut Lines<BufReader<Stdin>>) -> Result<Turn> {
    if session.is_finished() {
        return Ok(Turn::Next);
    }
    println!("Press Enter to try the next question, or type `quit`.");
    let Some(line) = input.next_line().await.context("failed to read input")? else {
        return Ok(Turn::Quit);
    };
    match parse_command(&line) {
        Command::Quit => Ok(Turn::Quit),
        _ => Ok(Turn::Next),
    }
}

fn print_question(number: u32, total: u32, question: &QuestionRecord) {
    println!("\nQuestion {number}/{total}: {}", question.question_text);
    if question.is_error() {
        return;
    }
    for (letter, choice) in question.lettered_choices() {
        println!("  {letter}) {choice}");
    }
}

fn print_summary(summary: &SessionSummary) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Difficulty", "Answered", "Correct", "Score"]);
    table.add_row(vec![
        Cell::new(&summary.topic),
        Cell::new(summary.difficulty),
        Cell::new(summary.questions_answered),
        Cell::new(summary.correct),
        Cell::new(format!("{:.1}%", summary.percentage)),
    ]);

    println!("\n{table}");
    if summary.questions_answered == 0 {
        println!("No questions answered.");
    } else {
        println!("{}", summary.message);
    }
}
