#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use modutex::clients::{CitationResolver, TextGenerator};
use modutex::models::Prompt;
use modutex::{AppError, AppResult, Config, DocumentFlow};
use tempfile::TempDir;

/// 生成服务的模拟响应
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Status(u16),
}

/// 记录每次调用的模拟生成服务
#[derive(Clone)]
pub struct MockGenerator {
    reply: Reply,
    pub prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Reply::Text(text.to_string()),
            prompts: Arc::default(),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Reply::Status(status),
            prompts: Arc::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Prompt {
        self.prompts.lock().unwrap().last().cloned().expect("没有调用记录")
    }
}

impl TextGenerator for MockGenerator {
    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Status(status) => Err(AppError::Service {
                service: "OpenAI",
                status: *status,
                body: "mock failure".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// 模拟的文献服务
#[derive(Clone)]
pub struct MockResolver {
    record: Option<String>,
    pub requests: Arc<Mutex<Vec<String>>>,
}

impl MockResolver {
    pub fn with_record(record: &str) -> Self {
        Self {
            record: Some(record.to_string()),
            requests: Arc::default(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            record: None,
            requests: Arc::default(),
        }
    }
}

impl CitationResolver for MockResolver {
    async fn resolve(&self, doi: &str) -> AppResult<String> {
        self.requests.lock().unwrap().push(doi.to_string());
        self.record
            .clone()
            .ok_or_else(|| AppError::CitationNotFound {
                doi: doi.to_string(),
                status: 404,
            })
    }
}

pub fn config_for(dir: &Path) -> Config {
    let mut config = Config::for_project(dir);
    config.api_key = "sk-test-key-1234567890".to_string();
    config
}

pub fn flow_with(
    dir: &TempDir,
    generator: MockGenerator,
    resolver: MockResolver,
) -> DocumentFlow<MockGenerator, MockResolver> {
    DocumentFlow::with_clients(config_for(dir.path()), generator, resolver)
}

pub fn write_section(dir: &TempDir, name: &str, body: &str) {
    let sections = dir.path().join("sections");
    std::fs::create_dir_all(&sections).unwrap();
    std::fs::write(sections.join(format!("{name}.tex")), body).unwrap();
}

pub fn read(dir: &TempDir, relative: &str) -> String {
    std::fs::read_to_string(dir.path().join(relative)).unwrap()
}
