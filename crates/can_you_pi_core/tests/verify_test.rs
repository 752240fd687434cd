//! Tests for batch verification.

use can_you_pi_core::{DigitSource, EndReason, Game, GameError, normalize_sequence, verify_batch};

fn pi_game() -> Game {
    Game::new(DigitSource::embedded().unwrap())
}

#[test]
fn test_leading_three_and_dot_are_stripped() {
    let mut game = pi_game();
    let result = verify_batch(&mut game, "3.14159").unwrap();

    assert!(result.all_correct);
    assert_eq!(result.correct_count, 5);
    assert_eq!(result.digits_checked, 5);
    assert_eq!(result.final_score, 5);
    assert!(!result.game_over);
    assert_eq!(game.cursor(), 5);
}

#[test]
fn test_first_mismatch_stops_the_batch() {
    let mut game = pi_game();
    let result = verify_batch(&mut game, "99999").unwrap();

    assert!(!result.all_correct);
    assert!(result.game_over);
    assert_eq!(result.digits_checked, 1);
    assert_eq!(result.correct_count, 0);
    assert_eq!(result.wrong_at_position, Some(1));
    assert_eq!(result.expected_digit, Some('1'));
    assert_eq!(result.got_digit, Some('9'));
    assert_eq!(game.end_reason(), Some(EndReason::Mismatch));
}

#[test]
fn test_mismatch_mid_run() {
    let mut game = pi_game();
    let result = verify_batch(&mut game, "14150").unwrap();

    assert_eq!(result.correct_count, 4);
    assert_eq!(result.digits_checked, 5);
    assert_eq!(result.wrong_at_position, Some(5));
    assert_eq!(result.expected_digit, Some('9'));
    assert_eq!(result.final_score, 4);
}

#[test]
fn test_batches_continue_from_cursor() {
    let mut game = pi_game();
    verify_batch(&mut game, "1415").unwrap();
    let result = verify_batch(&mut game, "9265").unwrap();

    assert!(result.all_correct);
    assert_eq!(game.cursor(), 8);
}

#[test]
fn test_split_batches_match_one_batch() {
    let mut split = pi_game();
    verify_batch(&mut split, "3.1415").unwrap();
    verify_batch(&mut split, "92653589").unwrap();

    let mut whole = pi_game();
    verify_batch(&mut whole, "3.141592653589").unwrap();

    assert_eq!(split.cursor(), whole.cursor());
    assert_eq!(split.cursor(), 12);
}

#[test]
fn test_whitespace_is_ignored() {
    let mut game = pi_game();
    let result = verify_batch(&mut game, " 3.14 15\t92 ").unwrap();
    assert_eq!(result.correct_count, 6);
}

#[test]
fn test_non_digits_are_skipped() {
    let mut game = pi_game();
    let result = verify_batch(&mut game, "14-15").unwrap();
    assert!(result.all_correct);
    assert_eq!(result.correct_count, 4);
    assert_eq!(game.cursor(), 4);
}

#[test]
fn test_empty_runs_are_rejected() {
    let mut game = pi_game();
    for raw in ["", "   ", "3.", "3"] {
        assert_eq!(
            verify_batch(&mut game, raw).unwrap_err(),
            GameError::EmptySequence,
            "{raw:?}"
        );
    }
    assert_eq!(game.cursor(), 0);
    assert!(!game.is_terminal());
}

#[test]
fn test_terminal_game_is_rejected() {
    let mut game = pi_game();
    verify_batch(&mut game, "0").unwrap();
    let err = verify_batch(&mut game, "1415").unwrap_err();
    assert_eq!(err, GameError::GameOver { score: 0 });
}

#[test]
fn test_running_out_of_digits_completes() {
    let mut game = Game::new(DigitSource::parse("1415").unwrap());
    let result = verify_batch(&mut game, "14159999").unwrap();

    assert!(result.all_correct);
    assert!(result.completed);
    assert!(result.game_over);
    assert_eq!(result.correct_count, 4);
    assert_eq!(game.end_reason(), Some(EndReason::Completed));
}

#[test]
fn test_normalize_strips_one_leading_three() {
    assert_eq!(normalize_sequence("3.14159"), "14159");
    assert_eq!(normalize_sequence("33"), "3");
    assert_eq!(normalize_sequence("1 4 1"), "141");
    assert_eq!(normalize_sequence("..."), "");
}

#[test]
fn test_spacing_and_dot_do_not_change_the_result() {
    let inputs = ["3.1 4 1 5", "3141 5", "31415"];

    let fresh: Vec<_> = inputs
        .iter()
        .map(|input| verify_batch(&mut pi_game(), input).unwrap())
        .collect();
    assert_eq!(fresh[0], fresh[1]);
    assert_eq!(fresh[1], fresh[2]);
    assert!(fresh[0].all_correct);
    assert_eq!(fresh[0].digits_checked, 4);
    assert_eq!(fresh[0].final_score, 4);

    let digits = DigitSource::parse("14151415").unwrap();
    let offset: Vec<_> = inputs
        .iter()
        .map(|input| {
            let mut game = Game::with_cursor(digits.clone(), 4).unwrap();
            verify_batch(&mut game, input).unwrap()
        })
        .collect();
    assert_eq!(offset[0], offset[1]);
    assert_eq!(offset[1], offset[2]);
    assert!(offset[0].completed);
    assert_eq!(offset[0].final_score, 8);

    // From a cursor where the run is wrong, every spelling fails the same way.
    let mismatched: Vec<_> = inputs
        .iter()
        .map(|input| {
            let mut game = Game::with_cursor(DigitSource::embedded().unwrap(), 10).unwrap();
            verify_batch(&mut game, input).unwrap()
        })
        .collect();
    assert_eq!(mismatched[0], mismatched[1]);
    assert_eq!(mismatched[1], mismatched[2]);
    assert_eq!(mismatched[0].wrong_at_position, Some(11));
}
