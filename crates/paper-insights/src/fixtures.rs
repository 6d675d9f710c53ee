//! Test fixtures
//!
//! - [`sample_pdf`] builds small single-font documents with lopdf, one text
//!   line per page.
//! - [`MockProvider`] serves an in-process chat-completions endpoint and
//!   records every call made to it.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::{json, Value};

/// Build a PDF with one page per entry in `pages`.
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![40.into(), 780.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let encoded = content.encode().unwrap_or_default();
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap_or_default();
    buf
}

/// Answer the mock gives to the KPI comparison prompt
pub const MOCK_KPI_ANSWER: &str = "\n1. Domain Similarity: Yes - both papers study neural networks.
2. Research Aspect Overlap: Yes - both evaluate on image benchmarks.
3. Innovation Uniqueness Score: 7 - the second paper introduces a new loss.
4. Content Similarity Index: 65%
5. Theme Summary:
Paper 1 focuses on attention. Paper 2 focuses on convolution.
6. Gap Analysis: Paper 1 lacks ablations that Paper 2 covers.
7. Best Use Case for Each Paper: Paper 1 for NLP, Paper 2 for vision.\n\n";

/// Answer the mock gives to a highlights prompt
pub const MOCK_HIGHLIGHTS_ANSWER: &str =
    "  - Introduces the method\n- Reports strong results\n- Releases code  ";

/// One request received by [`MockProvider`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub authorization: Option<String>,
    pub body: Value,
}

impl RecordedCall {
    pub fn prompt(&self) -> &str {
        self.body["messages"][0]["content"].as_str().unwrap_or_default()
    }

    pub fn max_tokens(&self) -> u64 {
        self.body["max_tokens"].as_u64().unwrap_or_default()
    }
}

#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<RecordedCall>>,
    failure: Option<(StatusCode, String)>,
}

/// In-process chat-completions endpoint bound to a random local port
pub struct MockProvider {
    /// Base URL to hand to the client (no `/chat/completions` suffix)
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockProvider {
    /// Provider that answers every call
    pub async fn start() -> Self {
        Self::spawn(MockState::default()).await
    }

    /// Provider that rejects every call with an OpenAI-style error body
    pub async fn failing(status: u16, message: &str) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::spawn(MockState {
            calls: Mutex::default(),
            failure: Some((status, message.to_string())),
        })
        .await
    }

    async fn spawn(state: MockState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completion))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind mock provider: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("mock provider has no address: {e}"));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            state,
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

async fn handle_chat_completion(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let prompt = body["messages"][0]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    state
        .calls
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedCall {
            authorization,
            body,
        });

    if let Some((status, message)) = &state.failure {
        return (
            *status,
            Json(json!({
                "error": {
                    "message": message,
                    "type": "mock_error",
                }
            })),
        );
    }

    let content = if prompt.contains("KPI format") {
        MOCK_KPI_ANSWER
    } else {
        MOCK_HIGHLIGHTS_ANSWER
    };

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop",
            }],
        })),
    )
}
