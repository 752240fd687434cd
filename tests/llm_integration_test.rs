//! Integration test for LLM client connectivity.

use can_you_pi::{
    ChatBackend, ChatMessage, ChatRole, Conversation, DigitSource, LlmClient, LlmConfig,
    LlmProvider, PiService, PiTool, chat_turn,
};
use std::time::Duration;
use tracing::instrument;

fn groq_client() -> LlmClient {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("GROQ_API_KEY").expect("GROQ_API_KEY not set");

    let config = LlmConfig::new(
        LlmProvider::Groq,
        api_key,
        "llama-3.3-70b-versatile".to_string(),
        200,
        0.0,
        Duration::from_secs(30),
    );

    LlmClient::new(config).expect("Failed to build client")
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_groq_connectivity() {
    let client = groq_client();

    let response = client
        .complete(
            &[
                ChatMessage::system("You are a helpful assistant."),
                ChatMessage::user("Say 'Hello, world!' and nothing else."),
            ],
            None,
        )
        .await
        .expect("Failed to generate");

    assert_eq!(response.role, ChatRole::Assistant);
    assert!(!response.content.unwrap_or_default().is_empty());
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_groq_requests_start_tool() {
    let client = groq_client();
    let tools = PiTool::definitions();

    let response = client
        .complete(
            &[
                ChatMessage::system("Use the tools to run a Pi memorization game."),
                ChatMessage::user("Start a standard game please."),
            ],
            Some(tools.as_slice()),
        )
        .await
        .expect("Failed to generate");

    let names: Vec<&str> = response
        .requested_tools()
        .iter()
        .map(|call| call.function.name.as_str())
        .collect();
    eprintln!("Requested tools: {:?}", names);
    assert!(names.contains(&"start_pi_game"));
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_groq_full_chat_turn() {
    let client = groq_client();
    let service = PiService::new(DigitSource::embedded().expect("digits"));
    let mut conversation = Conversation::new("live");

    let reply = chat_turn(&client, &service, &mut conversation, "start")
        .await
        .expect("Chat turn failed");

    eprintln!("Reply: {}", reply.reply);
    assert!(!reply.reply.is_empty());
}
