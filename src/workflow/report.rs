//! 操作结果
//!
//! 每个操作成功后返回一个报告，`Display` 输出用作界面日志里的一行摘要。

use std::fmt;
use std::path::PathBuf;

use crate::models::FragmentName;
use crate::services::{CompileReport, SyncReport};

/// 写入片段后的结果
#[derive(Debug, Clone)]
pub struct FragmentReport {
    pub name: FragmentName,
    pub path: PathBuf,
    /// 写入内容的字符数
    pub length: usize,
}

impl fmt::Display for FragmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} 字符)", self.path.display(), self.length)
    }
}

/// 删除片段后的结果
#[derive(Debug, Clone)]
pub struct DeleteReport {
    pub name: FragmentName,
    pub path: PathBuf,
}

impl fmt::Display for DeleteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "已删除 {}", self.path.display())
    }
}

/// 添加引用后的结果
#[derive(Debug, Clone)]
pub struct CitationReport {
    pub doi: String,
    pub bib_path: PathBuf,
    pub record: String,
}

impl fmt::Display for CitationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} 已追加到 {}", self.doi, self.bib_path.display())
    }
}

/// 片段列表
#[derive(Debug, Clone, Default)]
pub struct FragmentList(pub Vec<FragmentName>);

impl fmt::Display for FragmentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "还没有任何章节");
        }
        write!(f, "共 {} 个章节:", self.0.len())?;
        for name in &self.0 {
            write!(f, "\n  • {}", name)?;
        }
        Ok(())
    }
}

/// 配置与项目状态
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub api_key: String,
    pub model: String,
    pub model_description: String,
    pub project_dir: PathBuf,
    pub sections_exists: bool,
    pub bib_dir_exists: bool,
    pub master_exists: bool,
    pub fragment_count: usize,
}

fn exists_label(exists: bool) -> &'static str {
    if exists {
        "EXISTS"
    } else {
        "MISSING"
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModuTex AI Configuration:")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f, "API Key: {}", self.api_key)?;
        writeln!(f, "Model: {} ({})", self.model, self.model_description)?;
        writeln!(f, "Working Directory: {}", self.project_dir.display())?;
        writeln!(
            f,
            "Sections Directory: {} ({} sections)",
            exists_label(self.sections_exists),
            self.fragment_count
        )?;
        writeln!(f, "Main Document: {}", exists_label(self.master_exists))?;
        write!(f, "Bibliography Directory: {}", exists_label(self.bib_dir_exists))
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match (self.created, self.changed) {
            (true, _) => "已创建",
            (false, true) => "已更新",
            (false, false) => "无变化",
        };
        write!(
            f,
            "{} {}，包含 {} 个章节",
            self.master_path.display(),
            action,
            self.included.len()
        )?;
        for name in &self.included {
            write!(f, "\n  • {}", name)?;
        }
        Ok(())
    }
}

impl fmt::Display for CompileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pdf_path {
            Some(pdf) => write!(f, "编译成功: {}", pdf.display()),
            None => write!(f, "编译成功 ({})", self.command),
        }
    }
}
