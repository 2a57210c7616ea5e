//! 后台任务执行器
//!
//! 界面把每个操作交给执行器，在后台任务中运行，立即拿到一个句柄；
//! 进度通过事件通道转发给界面的日志视图。同一时间只运行一个操作。

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::AppResult;

/// 任务进度事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Started { id: u64, label: String },
    Finished { id: u64, label: String, summary: String },
    Failed { id: u64, label: String, message: String },
}

impl TaskEvent {
    pub fn id(&self) -> u64 {
        match self {
            TaskEvent::Started { id, .. }
            | TaskEvent::Finished { id, .. }
            | TaskEvent::Failed { id, .. } => *id,
        }
    }
}

/// 后台任务执行器
pub struct TaskRunner {
    permit: Arc<Semaphore>,
    events: mpsc::UnboundedSender<TaskEvent>,
    next_id: AtomicU64,
}

impl TaskRunner {
    /// 创建执行器，返回事件接收端
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TaskEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let runner = Self {
            permit: Arc::new(Semaphore::new(1)),
            events,
            next_id: AtomicU64::new(1),
        };
        (runner, receiver)
    }

    /// 提交一个操作
    ///
    /// 操作一旦开始就会运行到结束，不支持中途取消。
    pub fn submit<F, T>(&self, label: impl Into<String>, task: F) -> JoinHandle<AppResult<T>>
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
        T: Display + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let label = label.into();
        let permit = self.permit.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            // 信号量从不关闭，这里只会等待不会失败
            let _permit = permit.acquire_owned().await.ok();
            debug!("任务 #{} 开始: {}", id, label);
            let _ = events.send(TaskEvent::Started {
                id,
                label: label.clone(),
            });

            let result = task.await;

            let event = match &result {
                Ok(value) => TaskEvent::Finished {
                    id,
                    label,
                    summary: value.to_string(),
                },
                Err(e) => TaskEvent::Failed {
                    id,
                    label,
                    message: e.to_string(),
                },
            };
            // 接收端已关闭时忽略
            let _ = events.send(event);
            result
        })
    }
}
