use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 未配置时 `.env` 模板里的占位密钥
pub const PLACEHOLDER_API_KEY: &str = "your_api_key";

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "modutex.toml";

/// 已知模型及其说明（仅用于展示）
pub const KNOWN_MODELS: &[(&str, &str)] = &[
    ("gpt-4", "GPT-4 (Best Quality - Expensive)"),
    ("gpt-4-turbo", "GPT-4 Turbo (Recommended)"),
    ("gpt-3.5-turbo", "GPT-3.5 Turbo (Fast & Cheap)"),
];

/// 程序配置
///
/// 每个操作都显式接收一份配置，不从进程环境里隐式读取。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- LLM 配置 ---
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub llm_timeout_secs: u64,
    // --- 项目布局 ---
    /// 项目根目录，其余路径都相对于它
    pub project_dir: PathBuf,
    /// 片段目录（同时也是 `\input{}` 的路径前缀）
    pub sections_dir: String,
    pub fragment_ext: String,
    pub master_file: String,
    pub bib_file: String,
    // --- 文献服务 ---
    pub crossref_base_url: String,
    pub crossref_mailto: String,
    pub crossref_timeout_secs: u64,
    // --- 其他 ---
    pub compile_command: Vec<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4-turbo".to_string(),
            max_tokens: 2500,
            llm_timeout_secs: 60,
            project_dir: PathBuf::from("."),
            sections_dir: "sections".to_string(),
            fragment_ext: "tex".to_string(),
            master_file: "main.tex".to_string(),
            bib_file: "bib/references.bib".to_string(),
            crossref_base_url: "https://api.crossref.org".to_string(),
            crossref_mailto: "user@example.com".to_string(),
            crossref_timeout_secs: 10,
            compile_command: vec![
                "latexmk".to_string(),
                "-pdf".to_string(),
                "-interaction=nonstopmode".to_string(),
                "main.tex".to_string(),
            ],
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 只读取环境变量
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// 加载配置：默认值 → TOML 文件 → 环境变量 → 命令行项目目录
    ///
    /// 未指定配置文件时，读取项目目录（未指定则为当前目录）下的 `modutex.toml`。
    pub fn load(path: Option<&Path>, project: Option<&Path>) -> AppResult<Self> {
        Self::load_with(path, project, |key| std::env::var(key).ok())
    }

    /// 同 [`Config::load`]，环境变量由 `lookup` 提供
    pub fn load_with(
        path: Option<&Path>,
        project: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let discovered = project.unwrap_or(Path::new(".")).join(DEFAULT_CONFIG_FILE);
        let base = match path {
            Some(p) => Self::from_toml_file(p)?,
            None if discovered.exists() => Self::from_toml_file(&discovered)?,
            None => Self::default(),
        };

        let mut config = base.with_env(lookup);
        if let Some(dir) = project {
            config.project_dir = dir.to_path_buf();
        }
        Ok(config)
    }

    /// 从 TOML 文件读取，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        debug!("读取配置文件: {}", path.display());
        Self::from_toml_str(&content)
            .map_err(|e| AppError::Configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 通常是 `std::env::var`，测试中可以换成固定表。
    pub fn with_env(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = self;
        Self {
            api_key: lookup("OPENAI_API_KEY").unwrap_or(default.api_key),
            api_base_url: lookup("OPENAI_API_BASE").unwrap_or(default.api_base_url),
            model: lookup("OPENAI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(default.model),
            max_tokens: lookup("MODUTEX_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_tokens),
            llm_timeout_secs: lookup("MODUTEX_LLM_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.llm_timeout_secs),
            project_dir: lookup("MODUTEX_PROJECT_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.project_dir),
            sections_dir: lookup("MODUTEX_SECTIONS_DIR").unwrap_or(default.sections_dir),
            master_file: lookup("MODUTEX_MASTER_FILE").unwrap_or(default.master_file),
            bib_file: lookup("MODUTEX_BIB_FILE").unwrap_or(default.bib_file),
            crossref_base_url: lookup("CROSSREF_API_BASE").unwrap_or(default.crossref_base_url),
            crossref_mailto: lookup("CROSSREF_MAILTO").unwrap_or(default.crossref_mailto),
            verbose_logging: lookup("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
            ..default
        }
    }

    /// 以给定项目目录创建配置（其余取默认值）
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    /// 校验并返回 API 密钥
    ///
    /// 空值或占位值返回 [`AppError::Configuration`]。
    pub fn require_api_key(&self) -> AppResult<&str> {
        let key = self.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            return Err(AppError::Configuration(
                "未配置 OpenAI API 密钥，请设置 OPENAI_API_KEY（https://platform.openai.com/api-keys）"
                    .to_string(),
            ));
        }
        Ok(key)
    }

    pub fn has_api_key(&self) -> bool {
        self.require_api_key().is_ok()
    }

    /// 用于展示的脱敏密钥
    pub fn masked_api_key(&self) -> String {
        match self.require_api_key() {
            Err(_) => "NOT SET".to_string(),
            Ok(key) if key.chars().count() > 15 => {
                let chars: Vec<char> = key.chars().collect();
                let head: String = chars[..10].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{}...{}", head, tail)
            }
            Ok(_) => "SET".to_string(),
        }
    }

    /// 当前模型的说明
    pub fn model_description(&self) -> &'static str {
        KNOWN_MODELS
            .iter()
            .find(|(name, _)| *name == self.model)
            .map(|(_, desc)| *desc)
            .unwrap_or("Custom model")
    }

    pub fn sections_path(&self) -> PathBuf {
        self.project_dir.join(&self.sections_dir)
    }

    pub fn master_path(&self) -> PathBuf {
        self.project_dir.join(&self.master_file)
    }

    pub fn bib_path(&self) -> PathBuf {
        self.project_dir.join(&self.bib_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn placeholder_and_empty_keys_are_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.require_api_key(),
            Err(AppError::Configuration(_))
        ));

        config.api_key = PLACEHOLDER_API_KEY.to_string();
        assert!(!config.has_api_key());

        config.api_key = "sk-proj-abc".to_string();
        assert_eq!(config.require_api_key().unwrap(), "sk-proj-abc");
    }

    #[test]
    fn env_overrides_file_values() {
        let file = Config::from_toml_str(
            r#"
            model = "gpt-4"
            sections_dir = "parts"
            "#,
        )
        .unwrap();
        assert_eq!(file.model, "gpt-4");
        assert_eq!(file.max_tokens, 2500);

        let config = file.with_env(env_of(&[
            ("OPENAI_MODEL", "gpt-3.5-turbo"),
            ("OPENAI_API_KEY", "sk-test"),
            ("MODUTEX_MAX_TOKENS", "not-a-number"),
        ]));
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.sections_dir, "parts");
        assert_eq!(config.max_tokens, 2500);
    }

    #[test]
    fn blank_model_override_keeps_default() {
        let config = Config::default().with_env(env_of(&[("OPENAI_MODEL", "  ")]));
        assert_eq!(config.model, "gpt-4-turbo");
        assert_eq!(config.model_description(), "GPT-4 Turbo (Recommended)");
    }

    #[test]
    fn masked_key_hides_middle() {
        let mut config = Config::default();
        assert_eq!(config.masked_api_key(), "NOT SET");

        config.api_key = "sk-proj-1234567890abcdef".to_string();
        assert_eq!(config.masked_api_key(), "sk-proj-12...cdef");

        config.api_key = "short-key".to_string();
        assert_eq!(config.masked_api_key(), "SET");
    }

    #[test]
    fn paths_are_relative_to_project_dir() {
        let config = Config::for_project("/tmp/paper");
        assert_eq!(config.sections_path(), PathBuf::from("/tmp/paper/sections"));
        assert_eq!(config.master_path(), PathBuf::from("/tmp/paper/main.tex"));
        assert_eq!(
            config.bib_path(),
            PathBuf::from("/tmp/paper/bib/references.bib")
        );
    }

    #[test]
    fn project_flag_reads_config_from_project_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(DEFAULT_CONFIG_FILE),
            "model = \"gpt-4\"\nsections_dir = \"chapters\"\n",
        )
        .unwrap();

        let config = Config::load_with(None, Some(tmp.path()), env_of(&[])).unwrap();

        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.sections_dir, "chapters");
        assert_eq!(config.project_dir, tmp.path());
    }

    #[test]
    fn project_flag_overrides_project_dir_from_env_and_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join(DEFAULT_CONFIG_FILE),
            "project_dir = \"/elsewhere\"\n",
        )
        .unwrap();
        let env = env_of(&[("MODUTEX_PROJECT_DIR", "/from-env")]);

        let config = Config::load_with(None, Some(tmp.path()), env).unwrap();

        assert_eq!(config.project_dir, tmp.path());
    }

    #[test]
    fn explicit_config_file_wins_over_project_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join(DEFAULT_CONFIG_FILE), "model = \"gpt-4\"\n").unwrap();
        let explicit = tmp.path().join("other.toml");
        std::fs::write(&explicit, "model = \"gpt-3.5-turbo\"\n").unwrap();

        let config = Config::load_with(Some(&explicit), Some(tmp.path()), env_of(&[])).unwrap();

        assert_eq!(config.model, "gpt-3.5-turbo");
    }
}
