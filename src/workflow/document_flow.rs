//! 文档处理流程 - 流程层
//!
//! 核心职责：定义每个用户操作的完整步骤
//!
//! - 生成：校验密钥 → 构建提示词 → 调用生成服务 → 写入片段
//! - 编辑：读取已有片段 → 校验密钥 → 调用生成服务 → 覆盖片段
//! - 转换：读取文本 → 校验密钥 → 调用生成服务 → 写入片段
//! - 同步：片段目录 → 主文档 `\input` 区块
//! - 引用：DOI → BibTeX → 追加到 `.bib`
//!
//! 每个操作最多发起一次网络请求，失败时不写任何文件。所有状态都在文件系统中，
//! 流程本身不缓存任何内容。

use std::path::Path;

use tracing::{info, warn};

use crate::clients::{
    normalize_doi, CitationResolver, CrossrefClient, OpenAiClient, TextGenerator,
};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Fragment, FragmentName, Prompt};
use crate::services::{
    prompts, BibWriter, CompileReport, FragmentStore, MasterSync, PdfCompiler, SyncReport,
};
use crate::utils::logging::log_preview;
use crate::workflow::report::{
    CitationReport, DeleteReport, FragmentList, FragmentReport, StatusReport,
};

/// 文本转换时派生名称的后缀
pub const CONVERTED_SUFFIX: &str = "_latex";

/// 文档处理流程
///
/// - 编排每个操作的步骤和校验顺序
/// - 持有配置，但不持有任何跨调用的状态
/// - 外部服务通过 [`TextGenerator`] / [`CitationResolver`] 注入
pub struct DocumentFlow<G = OpenAiClient, C = CrossrefClient> {
    config: Config,
    generator: G,
    resolver: C,
    store: FragmentStore,
    master: MasterSync,
    bib: BibWriter,
    compiler: PdfCompiler,
}

impl DocumentFlow {
    /// 使用真实的 OpenAI / Crossref 客户端创建
    pub fn new(config: Config) -> AppResult<Self> {
        let generator = OpenAiClient::new(&config)?;
        let resolver = CrossrefClient::new(&config)?;
        Ok(Self::with_clients(config, generator, resolver))
    }
}

impl<G: TextGenerator, C: CitationResolver> DocumentFlow<G, C> {
    /// 使用自定义客户端创建
    pub fn with_clients(config: Config, generator: G, resolver: C) -> Self {
        Self {
            store: FragmentStore::new(&config),
            master: MasterSync::new(&config),
            bib: BibWriter::new(&config),
            compiler: PdfCompiler::new(&config),
            config,
            generator,
            resolver,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &FragmentStore {
        &self.store
    }

    /// 生成新的章节
    ///
    /// # 参数
    /// - `name`: 片段名称
    /// - `description`: 章节主题描述
    pub async fn generate(&self, name: &str, description: &str) -> AppResult<FragmentReport> {
        let name = self.store.parse_name(name)?;
        self.config.require_api_key()?;

        info!(
            "[AI] 正在为 '{}' 生成内容，模型: {}",
            name,
            self.generator.model_name()
        );
        info!("[PROMPT] {}", description);

        let content = self.complete(&prompts::generate_prompt(description)).await?;
        let report = self.persist(Fragment::new(name, content)).await?;

        info!("[SUCCESS] 章节已生成: {}", report.path.display());
        Ok(report)
    }

    /// 按说明改写已有章节，原内容直接覆盖
    pub async fn edit(&self, name: &str, instruction: &str) -> AppResult<FragmentReport> {
        let name = self.store.parse_name(name)?;
        let current = self.store.read(&name).await?;
        self.config.require_api_key()?;

        info!(
            "[AI] 正在改写 '{}'，模型: {}",
            name,
            self.generator.model_name()
        );
        info!("[PROMPT] {}", instruction);

        let content = self
            .complete(&prompts::edit_prompt(&current.body, instruction))
            .await?;
        let report = self.persist(Fragment::new(name, content)).await?;

        info!("[SUCCESS] 章节已改写: {}", report.path.display());
        Ok(report)
    }

    /// 将纯文本转换为 LaTeX 并写入指定片段
    pub async fn convert_text(&self, plain_text: &str, name: &str) -> AppResult<FragmentReport> {
        let name = self.store.parse_name(name)?;
        self.config.require_api_key()?;

        info!(
            "[AI] 正在转换文本为 LaTeX，模型: {}",
            self.generator.model_name()
        );

        let content = self.complete(&prompts::convert_prompt(plain_text)).await?;
        let report = self.persist(Fragment::new(name, content)).await?;

        info!(
            "[SUCCESS] 转换完成: {} 字符 -> {} 字符",
            plain_text.chars().count(),
            report.length
        );
        Ok(report)
    }

    /// 读取文本文件并转换
    ///
    /// 未指定 `target` 时使用 `<文件名>_latex` 作为片段名称。
    pub async fn convert_file(
        &self,
        source: &Path,
        target: Option<&str>,
    ) -> AppResult<FragmentReport> {
        let plain_text = match tokio::fs::read_to_string(source).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::NotFound(source.display().to_string()));
            }
            Err(e) => return Err(AppError::io(source, e)),
        };

        let name = match target {
            Some(target) => self.store.parse_name(target)?,
            None => derive_converted_name(source)?,
        };
        self.convert_text(&plain_text, name.as_str()).await
    }

    /// 重新生成主文档的 `\input` 区块
    pub async fn sync_master(&self) -> AppResult<SyncReport> {
        let report = self.master.sync(&self.store).await?;
        if report.included.is_empty() {
            info!("[INFO] 没有找到章节，主文档中不包含任何 \\input");
        } else {
            info!("[SUCCESS] 主文档已同步 {} 个章节", report.included.len());
        }
        Ok(report)
    }

    /// 通过 DOI 获取 BibTeX 并追加到参考文献文件
    pub async fn fetch_citation(&self, doi: &str) -> AppResult<CitationReport> {
        let doi = normalize_doi(doi)?;
        info!("[API] 正在获取 DOI 引用: {}", doi);

        let record = self.resolver.resolve(&doi).await.map_err(|e| {
            warn!("获取引用失败: {}", e);
            e
        })?;
        self.bib.append(&record).await?;

        info!("[SUCCESS] 引用已添加到 {}", self.bib.path().display());
        log_preview("Citation", &record, 200);

        Ok(CitationReport {
            doi,
            bib_path: self.bib.path().to_path_buf(),
            record,
        })
    }

    /// 列出所有章节（按名称排序）
    pub async fn list_fragments(&self) -> AppResult<FragmentList> {
        Ok(FragmentList(self.store.list().await?))
    }

    /// 读取章节内容
    pub async fn read_fragment(&self, name: &str) -> AppResult<Fragment> {
        let name = self.store.parse_name(name)?;
        self.store.read(&name).await
    }

    /// 创建只包含占位注释的空章节
    pub async fn create_empty(&self, name: &str) -> AppResult<FragmentReport> {
        let name = self.store.parse_name(name)?;
        let fragment = Fragment::placeholder(name);
        let path = self.store.create(&fragment).await?;
        info!("[SUCCESS] 已创建空章节: {}", path.display());
        Ok(FragmentReport {
            length: fragment.body.chars().count(),
            name: fragment.name,
            path,
        })
    }

    /// 删除章节
    pub async fn delete(&self, name: &str) -> AppResult<DeleteReport> {
        let name = self.store.parse_name(name)?;
        let path = self.store.delete(&name).await?;
        info!("🗑️ 已删除章节: {}", path.display());
        Ok(DeleteReport { name, path })
    }

    /// 编译 PDF
    pub async fn compile(&self) -> AppResult<CompileReport> {
        self.compiler.compile().await
    }

    /// 当前配置与项目状态
    pub async fn status(&self) -> AppResult<StatusReport> {
        let bib_dir_exists = match self.bib.path().parent() {
            Some(dir) => tokio::fs::try_exists(dir).await.unwrap_or(false),
            None => false,
        };
        Ok(StatusReport {
            api_key: self.config.masked_api_key(),
            model: self.config.model.clone(),
            model_description: self.config.model_description().to_string(),
            project_dir: self.config.project_dir.clone(),
            sections_exists: tokio::fs::try_exists(self.store.dir()).await.unwrap_or(false),
            bib_dir_exists,
            master_exists: tokio::fs::try_exists(self.master.master_path())
                .await
                .unwrap_or(false),
            fragment_count: self.store.list().await?.len(),
        })
    }

    /// 调用生成服务，空白结果视为失败
    async fn complete(&self, prompt: &Prompt) -> AppResult<String> {
        let content = self.generator.complete(prompt).await?;
        if content.trim().is_empty() {
            return Err(AppError::EmptyResult { service: "OpenAI" });
        }
        Ok(content)
    }

    async fn persist(&self, fragment: Fragment) -> AppResult<FragmentReport> {
        let path = self.store.write(&fragment).await?;
        log_preview(fragment.name.as_str(), &fragment.body, 300);
        Ok(FragmentReport {
            length: fragment.body.chars().count(),
            name: fragment.name,
            path,
        })
    }
}

/// 由源文件名派生转换结果的名称：`notes.txt` → `notes_latex`
pub fn derive_converted_name(source: &Path) -> AppResult<FragmentName> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AppError::invalid_name(source.display().to_string(), "无法读取文件名"))?;
    FragmentName::parse(stem)?.with_suffix(CONVERTED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converted_name_uses_file_stem() {
        assert_eq!(
            derive_converted_name(Path::new("/tmp/my notes.txt"))
                .unwrap()
                .as_str(),
            "my_notes_latex"
        );
        assert_eq!(
            derive_converted_name(Path::new("draft")).unwrap().as_str(),
            "draft_latex"
        );
    }
}
