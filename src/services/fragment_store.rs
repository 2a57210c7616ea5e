//! 片段存储 - 业务能力层
//!
//! 一个片段对应 `<sections_dir>/<name>.<ext>` 一个文件，文件内容就是片段正文，没有额外元数据。
//! 每次写入都是覆盖写，不保留历史版本。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Fragment, FragmentName};

/// 片段存储
pub struct FragmentStore {
    dir: PathBuf,
    ext: String,
}

impl FragmentStore {
    /// 按配置创建
    pub fn new(config: &Config) -> Self {
        Self::at(config.sections_path(), config.fragment_ext.clone())
    }

    /// 使用自定义目录创建
    pub fn at(dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ext: ext.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// 片段文件路径
    pub fn path_of(&self, name: &FragmentName) -> PathBuf {
        self.dir.join(name.file_name(&self.ext))
    }

    /// 规范化外部输入的名称
    pub fn parse_name(&self, raw: &str) -> AppResult<FragmentName> {
        FragmentName::parse_with_ext(raw, &self.ext)
    }

    pub async fn exists(&self, name: &FragmentName) -> bool {
        fs::try_exists(self.path_of(name)).await.unwrap_or(false)
    }

    /// 读取片段，不存在时返回 [`AppError::NotFound`]
    pub async fn read(&self, name: &FragmentName) -> AppResult<Fragment> {
        let path = self.path_of(name);
        match fs::read_to_string(&path).await {
            Ok(body) => Ok(Fragment::new(name.clone(), body)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(AppError::io(path, e)),
        }
    }

    /// 写入（覆盖）片段，目录不存在时自动创建
    pub async fn write(&self, fragment: &Fragment) -> AppResult<PathBuf> {
        self.ensure_dir().await?;
        let path = self.path_of(&fragment.name);
        fs::write(&path, fragment.body.as_bytes())
            .await
            .map_err(|e| AppError::io(&path, e))?;
        debug!("写入片段: {} ({} 字符)", path.display(), fragment.body.len());
        Ok(path)
    }

    /// 创建新片段，已存在时拒绝覆盖
    pub async fn create(&self, fragment: &Fragment) -> AppResult<PathBuf> {
        self.ensure_dir().await?;
        let path = self.path_of(&fragment.name);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(AppError::InvalidInput(format!(
                    "片段已存在: {}",
                    path.display()
                )));
            }
            Err(e) => return Err(AppError::io(&path, e)),
        };
        file.write_all(fragment.body.as_bytes())
            .await
            .map_err(|e| AppError::io(&path, e))?;
        file.flush().await.map_err(|e| AppError::io(&path, e))?;
        Ok(path)
    }

    /// 删除片段，不存在时返回 [`AppError::NotFound`]
    pub async fn delete(&self, name: &FragmentName) -> AppResult<PathBuf> {
        let path = self.path_of(name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(AppError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(AppError::io(path, e)),
        }
    }

    /// 列出所有片段名称（按名称排序）
    ///
    /// 目录不存在时返回空列表。文件名不是合法片段名称的文件会被跳过。
    pub async fn list(&self) -> AppResult<Vec<FragmentName>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(self.ext.as_str()) {
                continue;
            }
            if !entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match FragmentName::parse_with_ext(stem, &self.ext) {
                // 只接受与文件名完全一致的名称，保证名称和文件一一对应
                Ok(name) if name.as_str() == stem => names.push(name),
                _ => warn!("跳过无法识别的片段文件: {}", path.display()),
            }
        }

        names.sort();
        Ok(names)
    }

    async fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::io(&self.dir, e))
    }
}
