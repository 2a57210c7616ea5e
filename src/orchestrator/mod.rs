//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 把一次用户操作放到后台任务中执行，使界面在网络请求期间保持响应。
//!
//! ## 层次关系
//!
//! ```text
//! main / 界面 (收集输入，显示事件)
//!     ↓
//! orchestrator::TaskRunner (后台执行，单个许可)
//!     ↓
//! workflow::DocumentFlow (单个操作的完整步骤)
//!     ↓
//! services (能力层：prompts / store / sync / bib / compile)
//!     ↓
//! clients (外部服务：OpenAI / Crossref)
//! ```

pub mod task_runner;

pub use task_runner::{TaskEvent, TaskRunner};
