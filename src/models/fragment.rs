//! 片段（Fragment）模型
//!
//! 片段名称和文件名一一对应，所有从用户输入到文件名的转换都经过 [`FragmentName::parse`]。

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn allowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\p{L}\p{N}_-]+$").expect("static regex"))
}

/// 片段名称
///
/// 不变量：非空，不含路径分隔符，只包含字母、数字、`_`、`-`。
/// `parse` 是幂等的：`parse(parse(x).as_str()) == parse(x)`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentName(String);

impl FragmentName {
    /// 将显示名称规范化为片段名称
    ///
    /// - 去掉首尾空白
    /// - 去掉结尾的 `.tex` 扩展名
    /// - 连续空白替换为 `_`
    /// - 保留大小写
    pub fn parse(raw: &str) -> AppResult<Self> {
        Self::parse_with_ext(raw, "tex")
    }

    /// 同 [`parse`](Self::parse)，但去掉指定扩展名
    pub fn parse_with_ext(raw: &str, ext: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.contains('/') || trimmed.contains('\\') {
            return Err(AppError::invalid_name(raw, "不能包含路径分隔符"));
        }

        let suffix = format!(".{}", ext);
        let stem = trimmed.strip_suffix(suffix.as_str()).unwrap_or(trimmed);
        let slug = whitespace_re().replace_all(stem.trim(), "_").into_owned();

        if slug.is_empty() {
            return Err(AppError::invalid_name(raw, "名称不能为空"));
        }
        if !allowed_re().is_match(&slug) {
            return Err(AppError::invalid_name(
                raw,
                "只能包含字母、数字、下划线和连字符",
            ));
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 在名称后追加固定后缀（用于文本转换时派生名称）
    pub fn with_suffix(&self, suffix: &str) -> AppResult<Self> {
        Self::parse(&format!("{}{}", self.0, suffix))
    }

    /// 对应的文件名
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{}", self.0, ext)
    }
}

impl fmt::Display for FragmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FragmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 一个片段：名称 + 原始 LaTeX 内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub name: FragmentName,
    pub body: String,
}

impl Fragment {
    pub fn new(name: FragmentName, body: impl Into<String>) -> Self {
        Self {
            name,
            body: body.into(),
        }
    }

    /// 手动创建空片段时写入的占位内容
    pub fn placeholder(name: FragmentName) -> Self {
        let body = format!("% TODO: Add content for {} section\n", name);
        Self { name, body }
    }
}
