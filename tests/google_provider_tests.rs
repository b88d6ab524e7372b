#![cfg(feature = "google")]

mod common;

use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{brandon_state, service_with_session, APP, USER};
use statecraft::agent::Agent;
use statecraft::config::StatecraftConfig;
use statecraft::error::StatecraftError;
use statecraft::models::GoogleModel;
use statecraft::provider::google::GoogleProvider;
use statecraft::provider::{ModelProvider, ProviderRequest};
use statecraft::runner::{RunConfig, Runner, StreamingMode};
use statecraft::session::SessionService;
use statecraft::types::{Content, FinishReason, StreamDelta, Usage};

const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";
const STREAM_PATH: &str = "/models/gemini-2.0-flash:streamGenerateContent";

fn provider(server: &MockServer) -> GoogleProvider {
    GoogleProvider::new(GoogleModel::Gemini20Flash, "test-key".to_string())
        .with_base_url(server.uri())
}

fn request(text: &str) -> ProviderRequest {
    ProviderRequest {
        system_instruction: Some("Name: Brandon Hancock".to_string()),
        contents: vec![Content::user(text)],
        ..Default::default()
    }
}

#[tokio::test]
async fn generate_text_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_string_contains("systemInstruction"))
        .and(body_string_contains("Name: Brandon Hancock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Mexican food." }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 3,
                "totalTokenCount": 15
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .generate_text(&request("Favorite food?"))
        .await
        .expect("generation should succeed");

    assert_eq!(response.text, "Mexican food.");
    assert!(response.function_calls.is_empty());
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.usage.prompt_tokens, 12);
    assert_eq!(response.usage.total_tokens, 15);
}

#[tokio::test]
async fn generate_text_parses_function_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "functionCall": { "name": "get_current_time", "args": {} } }]
                },
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;

    let response = provider(&server)
        .generate_text(&request("What time is it?"))
        .await
        .unwrap();

    assert_eq!(response.function_calls.len(), 1);
    assert_eq!(response.function_calls[0].name, "get_current_time");
    assert_eq!(response.function_calls[0].args, json!({}));
    assert_eq!(response.finish_reason, Some(FinishReason::ToolCalls));
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_text(&request("hi"))
        .await
        .unwrap_err();

    match err {
        StatecraftError::Authentication(message) => assert!(message.contains("API key not valid")),
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_candidates_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_text(&request("hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, StatecraftError::Api { .. }));
}

#[tokio::test]
async fn stream_text_yields_deltas_then_done() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Brandon likes \"}]}}]}\n\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Mexican food.\"}]},\"finishReason\":\"STOP\"}],",
        "\"usageMetadata\":{\"promptTokenCount\":5,\"candidatesTokenCount\":4,\"totalTokenCount\":9}}\n\n",
    );

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .and(query_param("alt", "sse"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let deltas: Vec<_> = provider(&server)
        .stream_text(&request("Favorite food?"))
        .await
        .unwrap()
        .map(|d| d.expect("delta should parse"))
        .collect()
        .await;

    let text: String = deltas.iter().filter_map(StreamDelta::as_text).collect();
    assert_eq!(text, "Brandon likes Mexican food.");

    assert_eq!(
        deltas.last(),
        Some(&StreamDelta::Done {
            finish_reason: Some(FinishReason::Stop),
            usage: Some(Usage {
                prompt_tokens: 5,
                response_tokens: 4,
                total_tokens: 9,
            }),
        })
    );
}

#[tokio::test]
async fn runner_drives_a_turn_against_gemini() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("Brandon Hancock"))
        .and(body_string_contains("What is Brandon's favorite food?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Mexican food." }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = StatecraftConfig::new();
    config.set_api_key("google", "test-key".to_string());
    config.set_base_url("google", server.uri());

    let service = service_with_session("s-1", brandon_state()).await;
    let agent = Agent::new("question_answering_agent", "gemini-2.0-flash")
        .with_instruction("Name: {user_name}\nPreferences: {user_preferences}");
    let runner = Runner::from_config(agent, APP, service.clone(), &config).unwrap();

    let last = runner
        .run_to_completion(USER, "s-1", Content::user("What is Brandon's favorite food?"))
        .await
        .unwrap();

    assert!(last.is_final_response());
    assert_eq!(last.text().as_deref(), Some("Mexican food."));
    let session = service.get_session(APP, USER, "s-1").await.unwrap();
    assert_eq!(session.state, brandon_state());
    assert_eq!(session.events.len(), 2);
}

#[tokio::test]
async fn runner_streams_against_gemini() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Pickle\"}]}}]}\n\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"ball\"}]},\"finishReason\":\"STOP\"}]}\n\n",
    );

    Mock::given(method("POST"))
        .and(path(STREAM_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let config = StatecraftConfig::new();
    config.set_api_key("google", "test-key".to_string());
    config.set_base_url("google", server.uri());

    let service = service_with_session("s-1", brandon_state()).await;
    let agent = Agent::new("question_answering_agent", "gemini-2.0-flash")
        .with_instruction("Name: {user_name}");
    let runner = Runner::from_config(agent, APP, service, &config).unwrap();

    let events: Vec<_> = runner
        .run_with_config(
            USER,
            "s-1",
            Content::user("Favorite sport?"),
            RunConfig::streaming(StreamingMode::Sse),
        )
        .map(|e| e.unwrap())
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    assert!(events[0].partial);
    assert!(events[1].partial);
    assert_eq!(events[2].text().as_deref(), Some("Pickleball"));
    assert!(events[2].is_final_response());
}

#[tokio::test]
async fn transport_errors_never_reveal_the_api_key() {
    let provider = GoogleProvider::new(GoogleModel::Gemini20Flash, "SECRET-KEY-123".to_string())
        .with_base_url("http://127.0.0.1:1");

    let err = provider.generate_text(&request("hi")).await.unwrap_err();

    assert!(matches!(err, StatecraftError::Network(_)));
    assert!(!err.to_string().contains("SECRET-KEY-123"));
    assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
}

/// Serve one SSE response, writing `body` in two parts split at `split`.
async fn serve_split_body(body: &'static [u8], split: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\nconnection: close\r\n\r\n")
            .await
            .unwrap();
        socket.write_all(&body[..split]).await.unwrap();
        socket.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        socket.write_all(&body[split..]).await.unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn stream_text_keeps_multibyte_text_split_across_chunks() {
    let body: &'static [u8] = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Günaydın\"}]},\"finishReason\":\"STOP\"}]}\n\n".as_bytes();
    let split = body.iter().position(|&b| b == 0xC3).unwrap() + 1;
    let base_url = serve_split_body(body, split).await;

    let provider = GoogleProvider::new(GoogleModel::Gemini20Flash, "test-key".to_string())
        .with_base_url(base_url);
    let deltas: Vec<_> = provider
        .stream_text(&request("Selam"))
        .await
        .unwrap()
        .map(|d| d.expect("delta should decode"))
        .collect()
        .await;

    let text: String = deltas.iter().filter_map(StreamDelta::as_text).collect();
    assert_eq!(text, "Günaydın");
}
