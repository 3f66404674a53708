//! OpenAI-compatible client against a mock HTTP server.

use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use chick::agent::Agent;
use chick::config::ChickConfig;
use chick::error::ChickError;
use chick::models::{LanguageModel, ProviderKey};
use chick::provider::openai::OpenAiCompatibleClient;
use chick::provider::{ChatRequest, ModelClient};
use chick::tools::builtin::calculator_toolkit;
use chick::types::{ChatTurn, FinishReason, GenerationSettings};

fn client(server: &MockServer) -> OpenAiCompatibleClient {
    OpenAiCompatibleClient::new(
        LanguageModel::new(ProviderKey::DeepSeek, "deepseek-chat"),
        Some("test-key".to_string()),
        server.uri(),
    )
}

fn request() -> ChatRequest {
    ChatRequest {
        messages: vec![ChatTurn::system("sys"), ChatTurn::user("hi")],
        settings: GenerationSettings::builder().temperature(0.7).build(),
    }
}

fn completion(text: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    })
}

#[tokio::test]
async fn complete_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "stream": false,
            "temperature": 0.7,
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hi"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hello!")))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).complete(&request()).await.expect("completion");

    assert_eq!(response.text, "Hello!");
    assert_eq!(response.usage.total_tokens, 15);
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = client(&server)
        .complete(&request())
        .await
        .expect_err("401 should fail");

    assert!(matches!(err, ChickError::Authentication(ref m) if m == "bad key"));
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = client(&server).complete(&request()).await.unwrap_err();

    assert!(matches!(err, ChickError::Api { status: 503, .. }));
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client(&server).complete(&request()).await.unwrap_err();

    assert!(err.to_string().contains("No choices"));
}

#[tokio::test]
async fn stream_parses_sse_chunks() {
    let server = MockServer::start().await;
    let body = concat!(
        ": keep-alive\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n\n",
        "data:{\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":null}]}\n\n",
        "data: not json\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let stream = client(&server).stream(&request()).await.expect("stream");
    let deltas: Vec<_> = stream.collect().await;

    let text: String = deltas
        .iter()
        .map(|d| d.as_ref().expect("delta").text.as_str())
        .collect();
    assert_eq!(text, "Hello");
    let last = deltas.last().unwrap().as_ref().unwrap();
    assert_eq!(last.finish_reason, Some(FinishReason::Stop));
}

/// Serve one chunked SSE response, writing each part as its own HTTP chunk.
async fn serve_chunked(parts: Vec<Vec<u8>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= head_end + 4 + content_length {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\n\
                  transfer-encoding: chunked\r\nconnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        for part in parts {
            socket
                .write_all(format!("{:x}\r\n", part.len()).as_bytes())
                .await
                .unwrap();
            socket.write_all(&part).await.unwrap();
            socket.write_all(b"\r\n").await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        socket.write_all(b"0\r\n\r\n").await.unwrap();
        socket.flush().await.unwrap();
    });

    format!("http://{addr}")
}

async fn streamed_text(client: &OpenAiCompatibleClient) -> String {
    let stream = client.stream(&request()).await.expect("stream");
    stream
        .map(|delta| delta.expect("delta").text)
        .collect::<Vec<_>>()
        .await
        .concat()
}

#[tokio::test]
async fn stream_keeps_multibyte_characters_split_across_chunks() {
    let event = "data: {\"choices\":[{\"delta\":{\"content\":\"是的\"},\"finish_reason\":null}]}\n\n\
                 data: [DONE]\n\n"
        .as_bytes()
        .to_vec();
    let split = event.iter().position(|&b| b >= 0x80).unwrap() + 1;
    let uri = serve_chunked(vec![event[..split].to_vec(), event[split..].to_vec()]).await;

    let client = OpenAiCompatibleClient::new(
        LanguageModel::new(ProviderKey::DeepSeek, "deepseek-chat"),
        Some("test-key".to_string()),
        uri,
    );

    assert_eq!(streamed_text(&client).await, "是的");
}

#[tokio::test]
async fn stream_keeps_final_event_without_trailing_newline() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hi \"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"there\"},\"finish_reason\":\"stop\"}]}",
    );
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    assert_eq!(streamed_text(&client(&server)).await, "Hi there");
}

#[tokio::test]
async fn agent_runs_tool_loop_over_http() {
    let server = MockServer::start().await;

    // The follow-up request carries the tool results.
    Mock::given(method("POST"))
        .and(|req: &Request| String::from_utf8_lossy(&req.body).contains("Tool results:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("12 x 8 = 96")))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("[TOOL_CALL:calculator_multiply:a=12,b=8]")),
        )
        .with_priority(2)
        .mount(&server)
        .await;

    let config = ChickConfig::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .build();
    let mut agent = Agent::from_config("Chick", &config).expect("agent");
    agent.add_tool(calculator_toolkit(), true);

    let run = agent.run_detailed("What is 12 times 8?").await.expect("run");

    assert_eq!(run.answer, "12 x 8 = 96");
    assert_eq!(run.model_calls, 2);
    assert_eq!(run.executions[0].outcome.as_deref(), Ok("96"));
}
