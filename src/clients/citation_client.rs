/// 文献解析服务客户端
///
/// 通过 DOI 向 Crossref 请求 BibTeX 记录
use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::USER_AGENT;
use reqwest::Url;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};

const SERVICE: &str = "Crossref";

/// 引用记录解析能力
pub trait CitationResolver: Send + Sync {
    /// 返回 DOI 对应的原始 BibTeX 文本
    fn resolve(&self, doi: &str) -> impl Future<Output = AppResult<String>> + Send;
}

fn doi_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:https?://(?:dx\.)?doi\.org/|doi:\s*)").expect("static regex")
    })
}

/// 规范化用户输入的 DOI
///
/// 去掉首尾空白以及 `https://doi.org/`、`doi:` 等前缀。
pub fn normalize_doi(raw: &str) -> AppResult<String> {
    let doi = doi_prefix_re().replace(raw.trim(), "").trim().to_string();
    if doi.is_empty() {
        return Err(AppError::InvalidInput("DOI 不能为空".to_string()));
    }
    Ok(doi)
}

/// Crossref 客户端
pub struct CrossrefClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl CrossrefClient {
    /// 创建新的 Crossref 客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.crossref_timeout_secs))
            .build()
            .map_err(|source| AppError::Transport {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.crossref_base_url.trim_end_matches('/').to_string(),
            user_agent: format!("ModuTex/1.0 (mailto:{})", config.crossref_mailto),
        })
    }

    /// BibTeX 记录的请求地址
    ///
    /// DOI 按 `/` 拆成路径段，每段单独转义，`#`、`?` 等字符不会截断路径。
    pub fn record_url(&self, doi: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Configuration(format!("crossref_base_url 无效: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Configuration(format!("crossref_base_url 无效: {}", self.base_url))
            })?
            .pop_if_empty()
            .push("works")
            .extend(doi.split('/'))
            .extend(["transform", "application", "x-bibtex"]);
        Ok(url)
    }
}

impl CitationResolver for CrossrefClient {
    async fn resolve(&self, doi: &str) -> AppResult<String> {
        let url = self.record_url(doi)?;
        debug!("请求引用记录: {}", url);

        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|source| AppError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::CitationNotFound {
                doi: doi.to_string(),
                status: status.as_u16(),
            });
        }

        let record = response.text().await.map_err(|source| AppError::Transport {
            service: SERVICE,
            source,
        })?;

        if record.trim().is_empty() {
            return Err(AppError::EmptyResult { service: SERVICE });
        }
        Ok(record)
    }
}
