//! PDF 编译服务
//!
//! 在项目目录中运行配置好的 LaTeX 编译命令

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 编译结果
#[derive(Debug, Clone)]
pub struct CompileReport {
    pub command: String,
    pub stdout: String,
    /// 主文档对应的 PDF（若已生成）
    pub pdf_path: Option<PathBuf>,
}

pub struct PdfCompiler {
    project_dir: PathBuf,
    command: Vec<String>,
    master_file: String,
}

impl PdfCompiler {
    pub fn new(config: &Config) -> Self {
        Self {
            project_dir: config.project_dir.clone(),
            command: config.compile_command.clone(),
            master_file: config.master_file.clone(),
        }
    }

    pub async fn compile(&self) -> AppResult<CompileReport> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| AppError::Configuration("compile_command 不能为空".to_string()))?;
        let command_line = self.command.join(" ");
        info!("🚀 开始编译: {}", command_line);

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.project_dir)
            .output()
            .await
            .map_err(|e| AppError::io(program.as_str(), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AppError::Compile {
                status: output.status.code(),
                stderr: if stderr.is_empty() {
                    "Unknown compilation error".to_string()
                } else {
                    stderr
                },
            });
        }

        let pdf_path = self.project_dir.join(&self.master_file).with_extension("pdf");
        let pdf_exists = tokio::fs::try_exists(&pdf_path).await.unwrap_or(false);
        let pdf_path = pdf_exists.then_some(pdf_path);
        debug!("编译完成，PDF: {:?}", pdf_path);

        Ok(CompileReport {
            command: command_line,
            stdout,
            pdf_path,
        })
    }
}
