//! Tests for the terminal front ends over in-memory I/O.

use can_you_pi::{
    DigitSource, EndReason, Game, Key, PlayMode, choose_mode, play_keys, play_lines, play_quiz,
    prompt_start_position, run_play,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Cursor;

fn pi() -> DigitSource {
    DigitSource::embedded().unwrap()
}

fn output_of(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).unwrap()
}

#[test]
fn test_line_mode_until_mistake() {
    let mut game = Game::new(pi());
    let mut input = Cursor::new("1\n4\nx\n1\n5\n0\n2\n");
    let mut output = Vec::new();

    let score = play_lines(&mut game, &mut input, &mut output).unwrap();
    let text = output_of(output);

    assert_eq!(score, 4);
    assert!(text.contains("Please enter a valid single digit."));
    assert!(text.contains("Game Over! The correct digit was: 9"));
    assert!(text.contains("You've recalled 4 decimals of Pi correctly."));
    assert_eq!(game.end_reason(), Some(EndReason::Mismatch));
}

#[test]
fn test_line_mode_exit() {
    let mut game = Game::new(pi());
    let mut input = Cursor::new("1\nq\n4\n");
    let mut output = Vec::new();

    let score = play_lines(&mut game, &mut input, &mut output).unwrap();
    assert_eq!(score, 1);
    assert!(output_of(output).contains("Thanks for playing! Goodbye."));
    assert_eq!(game.end_reason(), Some(EndReason::Exited));
}

#[test]
fn test_line_mode_completion() {
    let mut game = Game::new(DigitSource::parse("14").unwrap());
    let mut input = Cursor::new("1\n4\n");
    let mut output = Vec::new();

    play_lines(&mut game, &mut input, &mut output).unwrap();
    assert!(output_of(output).contains("Incredible! You've recalled all 2 decimals of Pi!"));
}

#[test]
fn test_line_mode_end_of_input_keeps_game_active() {
    let mut game = Game::new(pi());
    let mut input = Cursor::new("1\n4\n");
    let mut output = Vec::new();

    assert_eq!(play_lines(&mut game, &mut input, &mut output).unwrap(), 2);
    assert!(!game.is_terminal());
}

#[test]
fn test_mode_menu_reprompts() {
    let mut input = Cursor::new("7\n\n2\n");
    let mut output = Vec::new();

    let mode = choose_mode(&mut input, &mut output).unwrap();
    assert_eq!(mode, Some(PlayMode::Custom));
    assert_eq!(
        output_of(output)
            .matches("Invalid input. Please enter 1, 2, or 3.")
            .count(),
        2
    );
}

#[test]
fn test_mode_menu_exit() {
    let mut input = Cursor::new("exit\n");
    let mut output = Vec::new();
    assert_eq!(choose_mode(&mut input, &mut output).unwrap(), None);
}

#[test]
fn test_start_position_prompt() {
    let digits = DigitSource::parse("14159").unwrap();
    let mut input = Cursor::new("0\nsix\n6\n3\n");
    let mut output = Vec::new();

    let position = prompt_start_position(&digits, &mut input, &mut output).unwrap();
    let text = output_of(output);

    assert_eq!(position, Some(3));
    assert_eq!(
        text.matches("Starting position out of range. Please try again.")
            .count(),
        2
    );
    assert!(text.contains("Please enter a whole number."));
}

#[test]
fn test_quiz_runs_until_wrong_answer() {
    let digits = DigitSource::parse("1111111111").unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let mut input = Cursor::new("1\nnine\n1\n2\n1\n");
    let mut output = Vec::new();

    let streak = play_quiz(&digits, 10, &mut rng, &mut input, &mut output).unwrap();
    let text = output_of(output);

    assert_eq!(streak, 2);
    assert_eq!(text.matches("Correct!").count(), 2);
    assert!(text.contains("Please enter a valid single digit."));
    assert!(text.contains("Wrong! The correct digit was: 1"));
    assert_eq!(text.matches("decimal of Pi?").count(), 4);
}

#[test]
fn test_keystroke_mode_echoes_digits() {
    let mut game = Game::new(pi());
    let keys = "14a15".chars().map(|c| Ok(Key::Char(c)));
    let mut output = Vec::new();

    let score = play_keys(&mut game, keys, &mut output).unwrap();
    let text = output_of(output);

    assert_eq!(score, 4);
    assert!(text.starts_with("14\r\nPlease enter a valid single digit.\r\n15"));
}

#[test]
fn test_keystroke_mode_mismatch_and_quit() {
    let mut game = Game::new(pi());
    let keys = "13".chars().map(|c| Ok(Key::Char(c)));
    let mut output = Vec::new();
    play_keys(&mut game, keys, &mut output).unwrap();
    assert!(output_of(output).contains("The correct digit was: 4\r\n"));

    let mut game = Game::new(pi());
    let keys = vec![Ok(Key::Char('1')), Ok(Key::Quit), Ok(Key::Char('4'))];
    let mut output = Vec::new();
    assert_eq!(play_keys(&mut game, keys, &mut output).unwrap(), 1);
    assert_eq!(game.end_reason(), Some(EndReason::Exited));
}

#[test]
fn test_run_play_from_menu_to_custom_game() {
    let mut input = Cursor::new("2\n11\n8\n9\n0\n");
    let mut output = Vec::new();

    run_play(&pi(), 100, None, None, false, &mut input, &mut output).unwrap();
    let text = output_of(output);

    assert!(text.contains("Welcome to the 'Can You Pi?' game!"));
    assert!(text.contains("Starting from position 11: 3.1415926535"));
    assert!(text.contains("Game Over! The correct digit was: 7"));
    assert!(text.contains("You've recalled 12 decimals of Pi correctly."));
}

#[test]
fn test_run_play_with_preselected_mode() {
    let mut input = Cursor::new("1\n4\nexit\n");
    let mut output = Vec::new();

    run_play(
        &pi(),
        100,
        Some(PlayMode::Standard),
        None,
        false,
        &mut input,
        &mut output,
    )
    .unwrap();
    let text = output_of(output);

    assert!(!text.contains("Choose a game mode"));
    assert!(text.contains("Starting: 3."));
    assert!(text.contains("Thanks for playing! Goodbye."));
}

struct CannedBackend;

#[async_trait::async_trait]
impl can_you_pi::ChatBackend for CannedBackend {
    async fn complete(
        &self,
        _messages: &[can_you_pi::ChatMessage],
        _tools: Option<&[can_you_pi::ToolDefinition]>,
    ) -> Result<can_you_pi::ChatMessage, can_you_pi::PiError> {
        Ok(can_you_pi::ChatMessage::assistant("Let's go!"))
    }
}

#[tokio::test]
async fn test_chat_client_loop() {
    let service = can_you_pi::PiService::new(pi());
    let mut input = Cursor::new("\nstart\nquit\nignored\n");
    let mut output = Vec::new();

    can_you_pi::run_chat(&CannedBackend, &service, &mut input, &mut output)
        .await
        .unwrap();
    let text = output_of(output);

    assert_eq!(text.matches("AI: Let's go!").count(), 1);
    assert!(text.ends_with("Goodbye!\n"));
}
