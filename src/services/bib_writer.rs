//! 参考文献写入服务 - 业务能力层
//!
//! 只负责"追加 BibTeX 记录"能力，不做解析、校验或去重

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 参考文献写入服务
///
/// 职责：
/// - 将记录追加到 `.bib` 文件末尾，前面留一个空行
/// - 文件或目录不存在时自动创建
/// - 同一个 DOI 重复添加会产生重复记录
pub struct BibWriter {
    bib_file_path: PathBuf,
}

impl BibWriter {
    /// 按配置创建
    pub fn new(config: &Config) -> Self {
        Self::with_path(config.bib_path())
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            bib_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.bib_file_path
    }

    /// 追加一条记录
    pub async fn append(&self, record: &str) -> AppResult<()> {
        debug!(
            "追加引用记录: {} | 长度: {}",
            self.bib_file_path.display(),
            record.len()
        );

        if let Some(parent) = self.bib_file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.bib_file_path)
            .await
            .map_err(|e| AppError::io(&self.bib_file_path, e))?;

        let entry = format!("\n{}\n", record);
        file.write_all(entry.as_bytes())
            .await
            .map_err(|e| AppError::io(&self.bib_file_path, e))?;
        file.flush()
            .await
            .map_err(|e| AppError::io(&self.bib_file_path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RECORD: &str = "@article{Doe_2020, title={T}}";

    #[tokio::test]
    async fn append_creates_file_and_keeps_duplicates() {
        let tmp = TempDir::new().unwrap();
        let writer = BibWriter::with_path(tmp.path().join("bib/references.bib"));

        writer.append(RECORD).await.unwrap();
        writer.append(RECORD).await.unwrap();

        let content = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content, format!("\n{RECORD}\n\n{RECORD}\n"));
    }

    #[tokio::test]
    async fn append_preserves_existing_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("refs.bib");
        std::fs::write(&path, "@misc{manual}\n").unwrap();

        BibWriter::with_path(&path).append(RECORD).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("@misc{{manual}}\n\n{RECORD}\n"));
    }
}
