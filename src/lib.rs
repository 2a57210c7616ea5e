//! # ModuTex
//!
//! 一个借助 LLM 起草、改写、格式化 LaTeX 章节，并自动维护主文档结构的工具
//!
//! ## 架构设计
//!
//! ### ① 外部服务层（Clients）
//! - `clients/` - 只负责和外部 API 通信
//! - `OpenAiClient` - 生成服务（`TextGenerator`）
//! - `CrossrefClient` - DOI → BibTeX（`CitationResolver`）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力只处理一件事
//! - `prompts` - 构建两段式提示词
//! - `FragmentStore` - 片段文件的读写
//! - `MasterSync` - 主文档 `\input` 区块的同步
//! - `BibWriter` - 追加参考文献
//! - `PdfCompiler` - 编译 PDF
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义每个用户操作的完整步骤
//! - `DocumentFlow` - 生成 / 编辑 / 转换 / 同步 / 引用
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 后台执行操作并转发进度事件

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Fragment, FragmentName};
pub use orchestrator::{TaskEvent, TaskRunner};
pub use workflow::DocumentFlow;
