#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chara_quiz::{
    Engine, EngineConfig, ParticipantId,
    config::{RecencyPolicy, RecencyThreshold},
    error::{ProviderError, TransportError},
    provider::{ContentProvider, RawPage},
    round::ImageRef,
    selector::Selector,
    transport::{MessageHandle, Transport},
};

pub const OPERATOR: ParticipantId = ParticipantId::new(1);
pub const ALICE: ParticipantId = ParticipantId::new(10);
pub const BOB: ParticipantId = ParticipantId::new(11);
pub const STRANGER: ParticipantId = ParticipantId::new(99);

pub const HINT: Duration = Duration::from_secs(120);
pub const END: Duration = Duration::from_secs(300);

const ASUNA_PAGE: &str = r#"{
    "data": {
        "Page": {
            "characters": [
                {
                    "id": 36828,
                    "name": { "full": "Asuna Yuuki" },
                    "image": { "large": "https://img.example/asuna.png" },
                    "media": { "nodes": [{
                        "title": { "romaji": "Sword Art Online", "english": "Sword Art Online" },
                        "startDate": { "year": 2022 }
                    }] }
                },
                {
                    "name": { "full": "Rem" },
                    "image": { "large": "https://img.example/rem.png" },
                    "media": { "nodes": [{ "title": { "romaji": "Re:Zero" }, "startDate": { "year": 1990 } }] }
                },
                {
                    "name": { "full": "Levi" },
                    "image": { "large": "https://img.example/levi.png" },
                    "media": { "nodes": [{ "title": { "romaji": "Shingeki no Kyojin" }, "startDate": { "year": 1990 } }] }
                },
                {
                    "name": { "full": "Mikasa" },
                    "image": { "large": "https://img.example/mikasa.png" },
                    "media": { "nodes": [{ "title": { "romaji": "Shingeki no Kyojin" }, "startDate": { "year": 1990 } }] }
                },
                {
                    "name": { "full": "Naruto" },
                    "image": { "large": "https://img.example/naruto.png" },
                    "media": { "nodes": [{ "title": { "romaji": "Naruto" } }] }
                }
            ]
        }
    }
}"#;

const OUTDATED_PAGE: &str = r#"{
    "data": {
        "Page": {
            "characters": [
                {
                    "name": { "full": "Goku" },
                    "image": { "large": "https://img.example/goku.png" },
                    "media": { "nodes": [{ "title": { "romaji": "Dragon Ball" }, "startDate": { "year": 1986 } }] }
                },
                {
                    "name": { "full": "Faceless" },
                    "media": { "nodes": [{ "title": { "romaji": "Recent Show" }, "startDate": { "year": 2023 } }] }
                },
                {
                    "name": { "full": "Untitled" },
                    "image": { "large": "https://img.example/untitled.png" },
                    "media": { "nodes": [] }
                }
            ]
        }
    }
}"#;

/// Provider that serves the same page on every request, or fails
pub struct MockProvider {
    page: Option<RawPage>,
    calls: AtomicU32,
}

impl MockProvider {
    pub fn asuna() -> Self {
        Self {
            page: Some(RawPage::from_graphql_response(ASUNA_PAGE).unwrap()),
            calls: AtomicU32::new(0),
        }
    }

    /// Serves a page whose only recent record has no picture
    pub fn outdated() -> Self {
        Self {
            page: Some(RawPage::from_graphql_response(OUTDATED_PAGE).unwrap()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            page: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    async fn fetch_candidate_page(&self, _page: u32, _per_page: u32) -> Result<RawPage, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.page
            .clone()
            .ok_or_else(|| ProviderError::Unavailable("connection refused".to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Posted {
    Question {
        image: String,
        caption: String,
        options: Vec<String>,
    },
    Text(String),
}

/// Transport that records everything it is asked to post
#[derive(Default)]
pub struct MockTransport {
    posted: Mutex<Vec<Posted>>,
    names: HashMap<ParticipantId, String>,
    reject_questions: AtomicBool,
}

impl MockTransport {
    pub fn with_names() -> Self {
        Self {
            names: HashMap::from([(ALICE, "Alice".to_owned()), (BOB, "Bob".to_owned())]),
            ..Self::default()
        }
    }

    pub fn reject_questions(&self, reject: bool) {
        self.reject_questions.store(reject, Ordering::SeqCst);
    }

    pub fn posted(&self) -> Vec<Posted> {
        self.posted.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.posted()
            .into_iter()
            .filter_map(|posted| match posted {
                Posted::Text(text) => Some(text),
                Posted::Question { .. } => None,
            })
            .collect()
    }

    pub fn questions(&self) -> usize {
        self.posted()
            .iter()
            .filter(|posted| matches!(posted, Posted::Question { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.posted.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn publish_question(
        &self,
        image: &ImageRef,
        caption: &str,
        options: &[String],
    ) -> Result<MessageHandle, TransportError> {
        if self.reject_questions.load(Ordering::SeqCst) {
            return Err(TransportError::Rejected("chat not found".to_owned()));
        }
        let mut posted = self.posted.lock().unwrap();
        posted.push(Posted::Question {
            image: image.as_str().to_owned(),
            caption: caption.to_owned(),
            options: options.to_vec(),
        });
        Ok(MessageHandle::from(posted.len() as i64))
    }

    async fn publish_text(&self, text: &str) -> Result<MessageHandle, TransportError> {
        let mut posted = self.posted.lock().unwrap();
        posted.push(Posted::Text(text.to_owned()));
        Ok(MessageHandle::from(posted.len() as i64))
    }

    async fn resolve_display_name(&self, participant: ParticipantId) -> Option<String> {
        self.names.get(&participant).cloned()
    }
}

pub fn config() -> EngineConfig {
    EngineConfig {
        recency: RecencyPolicy {
            threshold: RecencyThreshold::Fixed { year: 2015 },
            bypass_probability: 0.0,
        },
        ..EngineConfig::with_operators([OPERATOR])
    }
}

pub type TestEngine = Engine<MockProvider, MockTransport>;

pub fn engine_with(provider: MockProvider, transport: MockTransport) -> TestEngine {
    let config = config();
    Engine::with_selector(Selector::new(&config), config, provider, transport).unwrap()
}

pub fn engine() -> TestEngine {
    engine_with(MockProvider::asuna(), MockTransport::with_names())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
