use std::fmt::Display;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use modutex::utils::logging;
use modutex::{AppResult, Config, DocumentFlow, TaskEvent, TaskRunner};

#[derive(Parser)]
#[command(name = "modutex")]
#[command(version)]
#[command(about = "ModuTex - AI-powered LaTeX assistant")]
struct Cli {
    /// 配置文件路径（默认读取当前目录下的 modutex.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 项目目录
    #[arg(long, short = 'C', global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a LaTeX section using AI
    AddSection {
        /// Section name (without .tex)
        name: String,
        /// Content description prompt
        prompt: String,
        /// Update main.tex afterwards
        #[arg(long)]
        sync: bool,
    },
    /// Edit an existing section with AI
    EditSection {
        name: String,
        /// Edit instructions
        prompt: String,
    },
    /// Convert a plain text file to LaTeX
    TextToLatex {
        text_file: PathBuf,
        /// Output section name (defaults to <file>_latex)
        output_name: Option<String>,
    },
    /// Update main.tex with all sections
    UpdateMain,
    /// Fetch a BibTeX citation by DOI
    CiteDoi { doi: String },
    /// List sections
    List,
    /// Create an empty section
    NewSection { name: String },
    /// Delete a section
    DeleteSection { name: String },
    /// Compile the PDF
    Compile,
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref(), cli.project.as_deref())?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    let flow = Arc::new(DocumentFlow::new(config)?);
    let (runner, mut events) = TaskRunner::new();

    let forwarder = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(event);
        }
    });

    let success = dispatch(cli.command, &runner, flow).await;

    drop(runner);
    let _ = forwarder.await;

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

async fn dispatch(command: Commands, runner: &TaskRunner, flow: Arc<DocumentFlow>) -> bool {
    match command {
        Commands::AddSection { name, prompt, sync } => {
            let generated = {
                let flow = flow.clone();
                run(runner, "add-section", async move {
                    flow.generate(&name, &prompt).await
                })
                .await
            };
            if generated && sync {
                run(runner, "update-main", async move { flow.sync_master().await }).await
            } else {
                generated
            }
        }
        Commands::EditSection { name, prompt } => {
            run(runner, "edit-section", async move {
                flow.edit(&name, &prompt).await
            })
            .await
        }
        Commands::TextToLatex {
            text_file,
            output_name,
        } => {
            run(runner, "text-to-latex", async move {
                flow.convert_file(&text_file, output_name.as_deref()).await
            })
            .await
        }
        Commands::UpdateMain => {
            run(runner, "update-main", async move { flow.sync_master().await }).await
        }
        Commands::CiteDoi { doi } => {
            run(runner, "cite-doi", async move { flow.fetch_citation(&doi).await }).await
        }
        Commands::List => run(runner, "list", async move { flow.list_fragments().await }).await,
        Commands::NewSection { name } => {
            run(runner, "new-section", async move { flow.create_empty(&name).await }).await
        }
        Commands::DeleteSection { name } => {
            run(runner, "delete-section", async move { flow.delete(&name).await }).await
        }
        Commands::Compile => run(runner, "compile", async move { flow.compile().await }).await,
        Commands::Config => run(runner, "config", async move { flow.status().await }).await,
    }
}

/// 提交操作并等待结束，返回是否成功
async fn run<F, T>(runner: &TaskRunner, label: &str, task: F) -> bool
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Display + Send + 'static,
{
    match runner.submit(label, task).await {
        Ok(Ok(_)) => true,
        Ok(Err(_)) => false,
        Err(e) => {
            error!("[{}] 任务执行失败: {}", label, e);
            false
        }
    }
}

fn log_event(event: TaskEvent) {
    match event {
        TaskEvent::Started { id, label } => info!("▶ [#{}] {}", id, label),
        TaskEvent::Finished { id, label, summary } => {
            info!("✅ [#{}] {} 完成: {}", id, label, summary)
        }
        TaskEvent::Failed { id, label, message } => {
            error!("❌ [#{}] {} 失败: {}", id, label, message)
        }
    }
}
