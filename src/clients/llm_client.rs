//! 生成服务客户端
//!
//! ## 技术栈
//! - 请求 / 响应结构使用 `async-openai` 的类型
//! - 传输层使用 `reqwest`，以便保留非 2xx 响应的状态码和原始内容
//! - 兼容 OpenAI API 的服务（通过 `api_base_url` 切换）

use std::future::Future;
use std::time::Duration;

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::Prompt;

const SERVICE: &str = "OpenAI";

/// 文本生成能力
///
/// 每次调用只发起一次请求，不做重试。
pub trait TextGenerator: Send + Sync {
    /// 提交提示词，返回原始文本结果
    fn complete(&self, prompt: &Prompt) -> impl Future<Output = AppResult<String>> + Send;

    /// 模型名称（仅用于日志）
    fn model_name(&self) -> &str;
}

/// OpenAI Chat Completions 客户端
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
    max_tokens: u32,
}

impl OpenAiClient {
    /// 创建新的客户端
    ///
    /// 这里不校验密钥；密钥在每次操作开始时由调用方校验。
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()
            .map_err(|source| AppError::Transport {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            http,
            api_key: config.api_key.trim().to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model_name: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// 构建请求体：system + user 两条消息
    pub fn build_request(&self, prompt: &Prompt) -> AppResult<CreateChatCompletionRequest> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(prompt.system.as_str())
            .build()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.user.as_str())
            .build()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(prompt.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| AppError::InvalidInput(e.to_string()))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base_url)
    }
}

impl TextGenerator for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        let request = self.build_request(prompt)?;

        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.user.len());

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| {
                warn!("LLM API 调用失败: {}", source);
                AppError::Transport {
                    service: SERVICE,
                    source,
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| AppError::Transport {
            service: SERVICE,
            source,
        })?;

        if !status.is_success() {
            match status.as_u16() {
                401 => warn!("API 密钥无效，请检查 OPENAI_API_KEY"),
                429 => warn!("请求频率受限，请稍后再试"),
                code => warn!("LLM API 返回错误状态: {}", code),
            }
            return Err(AppError::Service {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        debug!("LLM API 调用成功");
        extract_content(&body)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// 从 2xx 响应体中取出第一条回复
///
/// 内容原样返回；缺失或全是空白视为 [`AppError::EmptyResult`]。
pub fn extract_content(body: &str) -> AppResult<String> {
    let parsed: CreateChatCompletionResponse =
        serde_json::from_str(body).map_err(|source| AppError::InvalidResponse {
            service: SERVICE,
            source,
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(AppError::EmptyResult { service: SERVICE })
}
