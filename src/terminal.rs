//! Terminal front ends: line mode, single-keystroke mode, position quiz and
//! the chat client.
//!
//! Every loop is generic over its reader and writer so the same code runs
//! against stdin/stdout and in-memory buffers.

use crate::chat::{Conversation, chat_turn};
use crate::cli::PlayMode;
use crate::llm_client::ChatBackend;
use crate::protocol::ordinal;
use crate::service::PiService;
use can_you_pi_core::{DigitCheck, DigitSource, EXIT_TOKENS, Game, GameError, PositionQuiz};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use rand::Rng;
use std::io::{self, BufRead, Write};
use tracing::{debug, info, instrument};

const GOODBYE: &str = "Thanks for playing! Goodbye.";
const INVALID_DIGIT: &str = "Please enter a valid single digit.";

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_exit(input: &str) -> bool {
    EXIT_TOKENS
        .iter()
        .any(|token| input.trim().eq_ignore_ascii_case(token))
}

/// Prints the welcome banner.
pub fn print_welcome<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output, "Welcome to the 'Can You Pi?' game!")?;
    writeln!(output, "Try to recall as many digits of Pi as you can.")?;
    writeln!(output, "Type 'q' or 'exit' to quit the game at any time.")
}

/// Asks for a game mode until the answer is 1, 2 or 3.
/// Returns `None` on end of input or an exit keyword.
pub fn choose_mode<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<PlayMode>> {
    writeln!(output, "Choose a game mode:")?;
    writeln!(output, "1. Standard Mode (start from the beginning)")?;
    writeln!(output, "2. Custom Mode (start from a specific position)")?;
    writeln!(output, "3. Decimal Guess Mode (guess a specific decimal of Pi)")?;

    loop {
        write!(output, "Enter 1, 2, or 3: ")?;
        output.flush()?;
        let Some(answer) = read_line(input)? else {
            return Ok(None);
        };
        match answer.as_str() {
            "1" => return Ok(Some(PlayMode::Standard)),
            "2" => return Ok(Some(PlayMode::Custom)),
            "3" => return Ok(Some(PlayMode::Quiz)),
            other if is_exit(other) => {
                writeln!(output, "{}", GOODBYE)?;
                return Ok(None);
            }
            _ => writeln!(output, "Invalid input. Please enter 1, 2, or 3.")?,
        }
    }
}

/// Asks for a 1-indexed start position until one is in range.
/// Returns `None` on end of input or an exit keyword.
pub fn prompt_start_position<R: BufRead, W: Write>(
    digits: &DigitSource,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<usize>> {
    loop {
        write!(
            output,
            "Enter the starting position for the decimal (1-{}): ",
            digits.len()
        )?;
        output.flush()?;
        let Some(answer) = read_line(input)? else {
            return Ok(None);
        };
        if is_exit(&answer) {
            writeln!(output, "{}", GOODBYE)?;
            return Ok(None);
        }
        match answer.parse::<usize>() {
            Ok(position) if (1..=digits.len()).contains(&position) => return Ok(Some(position)),
            Ok(_) => writeln!(output, "Starting position out of range. Please try again.")?,
            Err(_) => writeln!(output, "Please enter a whole number.")?,
        }
    }
}

fn report_wrong<W: Write>(output: &mut W, expected: char, score: usize) -> io::Result<()> {
    writeln!(output, "Game Over! The correct digit was: {}", expected)?;
    writeln!(output, "You've recalled {} decimals of Pi correctly.", score)
}

fn report_complete<W: Write>(output: &mut W, game: &Game) -> io::Result<()> {
    writeln!(
        output,
        "Incredible! You've recalled all {} decimals of Pi!",
        game.total_digits()
    )
}

/// Line mode: one digit per line until a mistake, an exit keyword, end of
/// input or the last digit. Returns the score.
#[instrument(skip_all, fields(cursor = game.cursor()))]
pub fn play_lines<R: BufRead, W: Write>(
    game: &mut Game,
    input: &mut R,
    output: &mut W,
) -> io::Result<usize> {
    while !game.is_terminal() {
        let Some(line) = read_line(input)? else {
            break;
        };
        if game.is_exit_token(&line) {
            writeln!(output, "{}", GOODBYE)?;
            break;
        }

        match game.check_input(&line) {
            Ok(DigitCheck::Correct) => {}
            Ok(DigitCheck::Wrong { expected }) => report_wrong(output, expected, game.score())?,
            Err(GameError::InvalidDigit { .. }) => writeln!(output, "{}", INVALID_DIGIT)?,
            Err(e) => {
                debug!(error = %e, "Guess rejected");
                break;
            }
        }
    }

    if game.is_complete() {
        report_complete(output, game)?;
    }
    info!(score = game.score(), "Line game finished");
    Ok(game.score())
}

/// A key press as seen by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// Escape or Ctrl+C.
    Quit,
}

/// Keystroke mode over any key stream. Correct digits are echoed inline;
/// lines end with `\r\n` so the output reads right in raw mode.
/// Returns the score.
pub fn play_keys<I, W>(game: &mut Game, keys: I, output: &mut W) -> io::Result<usize>
where
    I: IntoIterator<Item = io::Result<Key>>,
    W: Write,
{
    for key in keys {
        if game.is_terminal() {
            break;
        }
        let c = match key? {
            Key::Quit => {
                game.exit();
                write!(output, "\r\n{}\r\n", GOODBYE)?;
                break;
            }
            Key::Char(c) => c,
        };

        if !c.is_ascii_digit() {
            if game.is_exit_token(&c.to_string()) {
                write!(output, "\r\n{}\r\n", GOODBYE)?;
                break;
            }
            write!(output, "\r\n{}\r\n", INVALID_DIGIT)?;
            output.flush()?;
            continue;
        }

        match game.check_digit(c) {
            Ok(DigitCheck::Correct) => write!(output, "{}", c)?,
            Ok(DigitCheck::Wrong { expected }) => {
                write!(
                    output,
                    "\r\nGame Over! The correct digit was: {}\r\nYou've recalled {} decimals of Pi correctly.\r\n",
                    expected,
                    game.score()
                )?;
            }
            Err(_) => break,
        }
        output.flush()?;
    }

    if game.is_complete() {
        write!(
            output,
            "\r\nIncredible! You've recalled all {} decimals of Pi!\r\n",
            game.total_digits()
        )?;
    }
    Ok(game.score())
}

/// Leaves raw mode when dropped.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::error!(error = %e, "Failed to restore terminal mode");
        }
    }
}

/// Blocking iterator over key presses from the real terminal.
fn terminal_keys() -> impl Iterator<Item = io::Result<Key>> {
    std::iter::from_fn(|| {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    return match key.code {
                        KeyCode::Esc => Some(Ok(Key::Quit)),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            Some(Ok(Key::Quit))
                        }
                        KeyCode::Char(c) => Some(Ok(Key::Char(c))),
                        _ => continue,
                    };
                }
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    })
}

/// Position quiz: random questions until a wrong answer, an exit keyword or
/// end of input. Returns the number of correct answers.
#[instrument(skip_all)]
pub fn play_quiz<R, W, G>(
    digits: &DigitSource,
    max_position: usize,
    rng: &mut G,
    input: &mut R,
    output: &mut W,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
    G: Rng,
{
    writeln!(output, "So you're gonna guess the specific digit of Pi!")?;
    writeln!(output, "eg. What's the 10th decimal of Pi? Answer: 5")?;

    let mut streak = 0;
    loop {
        let mut quiz = match PositionQuiz::start(digits, None, max_position, rng) {
            Ok(quiz) => quiz,
            Err(e) => {
                writeln!(output, "{}", e)?;
                return Ok(streak);
            }
        };
        writeln!(output, "What is the {} decimal of Pi?", ordinal(quiz.position()))?;

        loop {
            let Some(answer) = read_line(input)? else {
                return Ok(streak);
            };
            if is_exit(&answer) {
                writeln!(output, "{}", GOODBYE)?;
                return Ok(streak);
            }
            match quiz.check(&answer) {
                Ok(outcome) if outcome.correct => {
                    streak += 1;
                    writeln!(output, "Correct!")?;
                    break;
                }
                Ok(_) => {
                    writeln!(
                        output,
                        "Wrong! The correct digit was: {}",
                        quiz.expected_digit()
                    )?;
                    writeln!(output, "You answered {} correctly.", streak)?;
                    return Ok(streak);
                }
                Err(_) => writeln!(output, "{}", INVALID_DIGIT)?,
            }
        }
    }
}

/// Runs one terminal game on a given game mode.
///
/// `mode` of `None` shows the menu. Keystroke mode uses the real terminal;
/// everything else reads lines from `input`.
#[instrument(skip(digits, input, output))]
pub fn run_play<R: BufRead, W: Write>(
    digits: &DigitSource,
    quiz_max_position: usize,
    mode: Option<PlayMode>,
    start: Option<usize>,
    keys: bool,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    print_welcome(output)?;
    let mode = match mode {
        Some(mode) => mode,
        None => match choose_mode(input, output)? {
            Some(mode) => mode,
            None => return Ok(()),
        },
    };

    let mut game = match mode {
        PlayMode::Quiz => {
            play_quiz(digits, quiz_max_position, &mut rand::rng(), input, output)?;
            return Ok(());
        }
        PlayMode::Standard => Game::new(digits.clone()),
        PlayMode::Custom => {
            let position = match start.filter(|p| (1..=digits.len()).contains(p)) {
                Some(position) => position,
                None => match prompt_start_position(digits, input, output)? {
                    Some(position) => position,
                    None => return Ok(()),
                },
            };
            Game::with_cursor(digits.clone(), position - 1)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?
        }
    };

    if game.cursor() == 0 {
        writeln!(output, "Starting: 3.")?;
    } else {
        writeln!(
            output,
            "Starting from position {}: 3.{}",
            game.cursor() + 1,
            digits.prefix(game.cursor())
        )?;
    }
    output.flush()?;

    if keys {
        let _raw = RawModeGuard::enable()?;
        play_keys(&mut game, terminal_keys(), output)?;
    } else {
        play_lines(&mut game, input, output)?;
    }
    Ok(())
}

/// Chat client loop. Errors from the model are printed and the loop goes on.
#[instrument(skip_all)]
pub async fn run_chat<R: BufRead, W: Write>(
    backend: &dyn ChatBackend,
    service: &PiService,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    writeln!(output, "Pi Memorization Game")?;
    writeln!(output, "Examples:")?;
    writeln!(output, "  You: 'Start'")?;
    writeln!(output, "  You: '3.14159265'")?;
    writeln!(output, "  You: '35897932384626' (continue)")?;
    writeln!(output, "  You: 'Give me a hint for next 5 digits'")?;
    writeln!(output, "Type 'quit' to exit")?;
    writeln!(output)?;
    writeln!(output, "AI: Hey! Ready to test your Pi memory? Say 'start' to begin!")?;

    let mut conversation = Conversation::new(uuid::Uuid::new_v4().to_string());
    loop {
        write!(output, "You: ")?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || is_exit(&line) {
            writeln!(output, "Goodbye!")?;
            break;
        }

        match chat_turn(backend, service, &mut conversation, &line).await {
            Ok(reply) => {
                for tool in &reply.tools_used {
                    writeln!(output, "  [{}] {}", tool.name, tool.arguments)?;
                }
                writeln!(output, "AI: {}", reply.reply)?;
            }
            Err(e) => writeln!(output, "Error: {}", e.message)?,
        }
    }
    Ok(())
}
