//! 主文档同步 - 业务能力层
//!
//! 根据片段目录重新生成主文档中的 `\input{}` 区块。
//!
//! ## 结构
//!
//! ```text
//! 导言区 ... \maketitle          <- head（含锚点）
//! 用户手写内容 / 旧的 \input 行    <- middle
//! \bibliographystyle{...} ...    <- tail（含锚点）
//! ```
//!
//! ## 不变量
//!
//! - 两个锚点各出现且只出现一次，并且顺序正确，否则返回 [`AppError::MalformedDocument`]
//! - middle 中只删除旧的 `\input{<sections>/...}` 行、占位注释和区块标记，其余行原样保留
//! - 片段不变时连续同步两次，输出逐字节相同
//! - 先读取、计算，最后一步才写入；任何错误都不会改动主文档

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{CanonicalSection, FragmentName};
use crate::services::fragment_store::FragmentStore;

/// 导言区之后的锚点
pub const AFTER_PREAMBLE_ANCHOR: &str = "\\maketitle";
/// 参考文献之前的锚点
pub const BEFORE_BIBLIOGRAPHY_ANCHOR: &str = "\\bibliographystyle";
/// 新建主文档中的占位注释
pub const PLACEHOLDER_COMMENT: &str = "% Sections will be automatically inserted here";
/// 自动生成区块的标记注释
pub const GENERATED_MARKER: &str = "% === Auto-generated section includes ===";

/// 主文档不存在时使用的模板
pub const DEFAULT_MASTER_TEMPLATE: &str = r"\documentclass[12pt]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{fontspec}
\usepackage{graphicx}
\usepackage{hyperref}
\usepackage{xcolor}
\usepackage{cite}

% Persian support
\newif\ifpersian
\persianfalse  % Change to \persiantrue for Persian documents

\ifpersian
    \usepackage{polyglossia}
    \setdefaultlanguage{persian}
    \setotherlanguage{english}
    \newfontfamily\persianfont{XB Zar}
    \newfontfamily\englishfont{Latin Modern Roman}
\fi

\title{Research Document}
\author{Author Name}
\date{\today}

\begin{document}

\maketitle

% Sections will be automatically inserted here

\bibliographystyle{ieeetr}
\bibliography{bib/references,bib/local_manual}

\end{document}
";

/// 按参考章节顺序排序，未识别的名称排在最后，同级按名称字典序
pub fn order_fragments(names: &mut [FragmentName]) {
    names.sort_by(|a, b| {
        CanonicalSection::sort_key(a.as_str())
            .cmp(&CanonicalSection::sort_key(b.as_str()))
            .then_with(|| a.cmp(b))
    });
}

/// 某个片段对应的 `\input` 指令
pub fn include_directive(include_prefix: &str, name: &FragmentName) -> String {
    format!("\\input{{{}/{}}}", include_prefix, name)
}

/// 查找只出现一次的锚点，返回其字节偏移
fn find_unique_anchor(document: &str, anchor: &str) -> AppResult<usize> {
    let mut positions = document.match_indices(anchor).map(|(pos, _)| pos);
    let first = positions
        .next()
        .ok_or_else(|| AppError::MalformedDocument(format!("缺少锚点 {}", anchor)))?;
    if positions.next().is_some() {
        return Err(AppError::MalformedDocument(format!("锚点 {} 出现了多次", anchor)));
    }
    Ok(first)
}

/// 是否为上一次同步生成的行（或占位注释）
fn is_generated_line(line: &str, directive_prefix: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with(directive_prefix)
        || trimmed.contains(PLACEHOLDER_COMMENT)
        || trimmed == GENERATED_MARKER
}

/// 用给定的片段顺序重建主文档
///
/// `ordered` 应该已经过 [`order_fragments`] 排序。
pub fn splice(document: &str, ordered: &[FragmentName], include_prefix: &str) -> AppResult<String> {
    let start = find_unique_anchor(document, AFTER_PREAMBLE_ANCHOR)?;
    let end = find_unique_anchor(document, BEFORE_BIBLIOGRAPHY_ANCHOR)?;
    let head_end = start + AFTER_PREAMBLE_ANCHOR.len();
    if head_end > end {
        return Err(AppError::MalformedDocument(format!(
            "{} 必须出现在 {} 之前",
            AFTER_PREAMBLE_ANCHOR, BEFORE_BIBLIOGRAPHY_ANCHOR
        )));
    }

    let head = &document[..head_end];
    let middle = &document[head_end..end];
    let tail = &document[end..];

    let directive_prefix = format!("\\input{{{}/", include_prefix);
    let mut kept: Vec<&str> = middle
        .split('\n')
        .filter(|line| !is_generated_line(line, &directive_prefix))
        .collect();
    while kept.last().is_some_and(|line| line.trim().is_empty()) {
        kept.pop();
    }

    let mut out = String::with_capacity(document.len() + ordered.len() * 32);
    out.push_str(head);
    out.push_str(&kept.join("\n"));
    out.push('\n');
    out.push_str(GENERATED_MARKER);
    out.push('\n');
    for name in ordered {
        out.push_str(&include_directive(include_prefix, name));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(tail);
    Ok(out)
}

/// 同步结果
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub master_path: PathBuf,
    /// 按写入顺序排列的片段
    pub included: Vec<FragmentName>,
    /// 主文档是否由模板新建
    pub created: bool,
    /// 内容是否发生变化
    pub changed: bool,
}

/// 主文档同步服务
pub struct MasterSync {
    master_path: PathBuf,
    include_prefix: String,
}

impl MasterSync {
    pub fn new(config: &Config) -> Self {
        Self::with_path(config.master_path(), config.sections_dir.clone())
    }

    pub fn with_path(master_path: impl Into<PathBuf>, include_prefix: impl Into<String>) -> Self {
        Self {
            master_path: master_path.into(),
            include_prefix: include_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn master_path(&self) -> &Path {
        &self.master_path
    }

    /// 读取主文档，不存在时返回模板
    async fn load(&self) -> AppResult<(String, bool)> {
        match fs::read_to_string(&self.master_path).await {
            Ok(content) => Ok((content, false)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("主文档不存在，使用默认模板: {}", self.master_path.display());
                Ok((DEFAULT_MASTER_TEMPLATE.to_string(), true))
            }
            Err(e) => Err(AppError::io(&self.master_path, e)),
        }
    }

    /// 写入：先写临时文件再重命名
    async fn store(&self, content: &str) -> AppResult<()> {
        if let Some(parent) = self.master_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::io(parent, e))?;
            }
        }
        let mut tmp = self.master_path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content.as_bytes())
            .await
            .map_err(|e| AppError::io(&tmp, e))?;
        fs::rename(&tmp, &self.master_path)
            .await
            .map_err(|e| AppError::io(&self.master_path, e))
    }

    /// 根据片段目录重新生成主文档的 `\input` 区块
    pub async fn sync(&self, store: &FragmentStore) -> AppResult<SyncReport> {
        let (document, created) = self.load().await?;

        let mut names = store.list().await?;
        order_fragments(&mut names);
        debug!("同步 {} 个片段到 {}", names.len(), self.master_path.display());

        let updated = splice(&document, &names, &self.include_prefix)?;
        let changed = created || updated != document;
        if changed {
            self.store(&updated).await?;
        } else {
            debug!("主文档无变化，跳过写入");
        }

        Ok(SyncReport {
            master_path: self.master_path.clone(),
            included: names,
            created,
            changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<FragmentName> {
        raw.iter().map(|n| FragmentName::parse(n).unwrap()).collect()
    }

    fn directives(document: &str) -> Vec<&str> {
        document
            .lines()
            .filter(|l| l.trim_start().starts_with("\\input{sections/"))
            .collect()
    }

    #[test]
    fn ordering_puts_known_sections_first() {
        let mut list = names(&["results", "introduction", "unknown_x", "abstract"]);
        order_fragments(&mut list);
        let order: Vec<&str> = list.iter().map(|n| n.as_str()).collect();
        assert_eq!(order, vec!["abstract", "introduction", "results", "unknown_x"]);
    }

    #[test]
    fn unknown_names_are_ordered_lexicographically() {
        let mut list = names(&["zeta", "conclusion", "appendix", "Methodology"]);
        order_fragments(&mut list);
        let order: Vec<&str> = list.iter().map(|n| n.as_str()).collect();
        assert_eq!(order, vec!["Methodology", "conclusion", "appendix", "zeta"]);
    }

    #[test]
    fn ordering_does_not_depend_on_input_order() {
        let mut a = names(&["b_extra", "discussion", "a_extra", "abstract"]);
        let mut b = names(&["abstract", "a_extra", "discussion", "b_extra"]);
        order_fragments(&mut a);
        order_fragments(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn template_placeholder_is_replaced() {
        let out = splice(
            DEFAULT_MASTER_TEMPLATE,
            &names(&["abstract", "introduction"]),
            "sections",
        )
        .unwrap();

        assert!(!out.contains(PLACEHOLDER_COMMENT));
        assert!(out.contains(
            "\\maketitle\n% === Auto-generated section includes ===\n\
             \\input{sections/abstract}\n\\input{sections/introduction}\n\n\
             \\bibliographystyle{ieeetr}"
        ));
        assert!(out.starts_with("\\documentclass[12pt]{article}"));
        assert!(out.ends_with("\\end{document}\n"));
    }

    #[test]
    fn splice_is_idempotent() {
        let list = names(&["abstract", "results", "zz"]);
        let once = splice(DEFAULT_MASTER_TEMPLATE, &list, "sections").unwrap();
        let twice = splice(&once, &list, "sections").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn hand_written_lines_survive() {
        let doc = "\\begin{document}\n\\maketitle\n\nA note kept by hand.\n\n\
                   \\input{sections/old}\n\\input{other/keep}\n\n\
                   \\bibliographystyle{plain}\n\\end{document}\n";
        let out = splice(doc, &names(&["intro"]), "sections").unwrap();

        assert!(out.contains("A note kept by hand."));
        assert!(out.contains("\\input{other/keep}"));
        assert!(!out.contains("\\input{sections/old}"));
        assert_eq!(directives(&out), vec!["\\input{sections/intro}"]);
        assert_eq!(splice(&out, &names(&["intro"]), "sections").unwrap(), out);
    }

    #[test]
    fn empty_store_removes_previous_directives() {
        let with = splice(DEFAULT_MASTER_TEMPLATE, &names(&["abstract"]), "sections").unwrap();
        let without = splice(&with, &[], "sections").unwrap();
        assert!(directives(&without).is_empty());
        assert!(without.contains(GENERATED_MARKER));
        assert_eq!(splice(&without, &[], "sections").unwrap(), without);
    }

    #[test]
    fn missing_anchor_is_malformed() {
        let doc = "\\maketitle\n\\input{sections/a}\n\\end{document}\n";
        assert!(matches!(
            splice(doc, &[], "sections"),
            Err(AppError::MalformedDocument(_))
        ));

        let doc = "\\begin{document}\n\\bibliographystyle{plain}\n";
        assert!(matches!(
            splice(doc, &[], "sections"),
            Err(AppError::MalformedDocument(_))
        ));
    }

    #[test]
    fn duplicated_or_reversed_anchor_is_malformed() {
        let doc = "\\maketitle\n\\maketitle\n\\bibliographystyle{plain}\n";
        assert!(matches!(
            splice(doc, &[], "sections"),
            Err(AppError::MalformedDocument(_))
        ));

        let doc = "\\bibliographystyle{plain}\n\\maketitle\n";
        assert!(matches!(
            splice(doc, &[], "sections"),
            Err(AppError::MalformedDocument(_))
        ));
    }

    #[test]
    fn crlf_documents_stay_idempotent() {
        let doc = "\\maketitle\r\n\r\n% Sections will be automatically inserted here\r\n\r\n\
                   \\bibliographystyle{plain}\r\n";
        let list = names(&["intro"]);
        let once = splice(doc, &list, "sections").unwrap();
        assert_eq!(splice(&once, &list, "sections").unwrap(), once);
        assert_eq!(directives(&once), vec!["\\input{sections/intro}"]);
    }
}
