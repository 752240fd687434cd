//! Tests for TOML configuration loading.

use can_you_pi::{AppConfig, LlmClient, LlmConfig, LlmProvider, PiError, PiErrorKind};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.port(), 8000);
    assert_eq!(*config.quiz_max_position(), 100);
    assert_eq!(config.idle_timeout(), Some(Duration::from_secs(3600)));
    assert_eq!(*config.llm().provider(), LlmProvider::Groq);
    assert_eq!(config.llm().model(), "llama-3.3-70b-versatile");
    assert_eq!(*config.llm().max_tokens(), 1500);
    assert_eq!(*config.llm().timeout_secs(), 30);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
port = 9000
session_idle_timeout_secs = 0

[llm]
provider = "openai"
model = "gpt-4o-mini"
"#,
    );

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.port(), 9000);
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(config.idle_timeout(), None);
    assert_eq!(*config.llm().provider(), LlmProvider::OpenAI);
    assert_eq!(config.llm().model(), "gpt-4o-mini");
    assert_eq!(*config.llm().max_tokens(), 1500);
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let config = AppConfig::load_or_default("/no/such/can_you_pi.toml").unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn test_malformed_file_is_an_error() {
    let file = write_config("port = \"not a number\"");
    let err = AppConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.starts_with("Failed to parse config"));

    let err: PiError = err.into();
    assert_eq!(err.kind, PiErrorKind::Configuration);
}

#[test]
fn test_cli_bind_overrides() {
    let config = AppConfig::default().with_bind(Some("0.0.0.0".to_string()), None);
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(*config.port(), 8000);

    let config = config.with_bind(None, Some(3000));
    assert_eq!(*config.port(), 3000);
}

#[test]
fn test_custom_digit_file() {
    let digits = write_config("14159\n");
    let file = write_config(&format!(
        "digits_path = {:?}\n",
        digits.path().display().to_string()
    ));

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(
        config.digits_path().as_ref(),
        Some(&PathBuf::from(digits.path()))
    );
    assert_eq!(config.digit_source().unwrap().as_str(), "14159");
}

#[test]
fn test_bad_digit_file_is_reported() {
    let digits = write_config("3.14159");
    let file = write_config(&format!(
        "digits_path = {:?}\n",
        digits.path().display().to_string()
    ));

    let config = AppConfig::from_file(file.path()).unwrap();
    let err = config.digit_source().unwrap_err();
    assert!(err.message.starts_with("Failed to load digits"));
}

#[test]
fn test_embedded_digits_by_default() {
    let digits = AppConfig::default().digit_source().unwrap();
    assert_eq!(digits.len(), 10_000);
}

#[test]
fn test_zero_llm_timeout_means_no_timeout() {
    let file = write_config("[llm]\ntimeout_secs = 0\n");
    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.llm().timeout_secs(), 0);

    let llm = LlmConfig::new(
        LlmProvider::Groq,
        "test-key".to_string(),
        config.llm().model().clone(),
        *config.llm().max_tokens(),
        *config.llm().temperature(),
        Duration::from_secs(*config.llm().timeout_secs()),
    );
    assert_eq!(llm.request_timeout(), None);
    assert!(LlmClient::new(llm).is_ok());

    let llm = LlmConfig::new(
        LlmProvider::Groq,
        "test-key".to_string(),
        "llama-3.3-70b-versatile".to_string(),
        100,
        0.7,
        Duration::from_secs(30),
    );
    assert_eq!(llm.request_timeout(), Some(Duration::from_secs(30)));
}
