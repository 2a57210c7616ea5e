//! 错误类型
//!
//! 所有公开操作都返回 [`AppResult`]，由调用方（命令行 / 界面）负责展示错误信息。

use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 凭据缺失或仍是占位值，在发起任何网络请求之前就会返回
    #[error("配置错误: {0}")]
    Configuration(String),

    /// 引用的片段或文件不存在
    #[error("未找到: {0}")]
    NotFound(String),

    /// 片段名称不合法
    #[error("片段名称不合法 '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// 其他不合法的输入（空 DOI、无法构建请求等）
    #[error("输入不合法: {0}")]
    InvalidInput(String),

    /// 主文档缺少锚点、锚点重复或顺序错误
    #[error("主文档格式不正确: {0}")]
    MalformedDocument(String),

    /// 外部服务返回非 2xx 状态
    #[error("{service} 返回错误状态 {status}: {body}")]
    Service {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// 文献服务找不到该 DOI
    #[error("DOI 未找到或无效 '{doi}' (HTTP {status})")]
    CitationNotFound { doi: String, status: u16 },

    /// 网络错误或超时
    #[error("{service} 网络请求失败: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// 2xx 响应但无法解析
    #[error("{service} 响应解析失败: {source}")]
    InvalidResponse {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// 服务成功返回但没有可用内容
    #[error("{service} 返回内容为空")]
    EmptyResult { service: &'static str },

    /// 文件读写失败
    #[error("文件操作失败 ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 编译命令以非零状态退出
    #[error("编译失败 (退出码 {status:?}): {stderr}")]
    Compile { status: Option<i32>, stderr: String },
}

impl AppError {
    /// 创建文件操作错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// 创建名称错误
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// 是否为"未找到"类错误
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::NotFound(_) | AppError::CitationNotFound { .. }
        )
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
