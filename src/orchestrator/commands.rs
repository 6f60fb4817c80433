//! 命令分发 - 编排层
//!
//! 把一条命令行命令交给 App，并把结果写到标准输出

use crate::cli::{join_words, Command};
use crate::error::AppResult;
use crate::models::DirectOutcome;
use crate::orchestrator::app::{describe_buffer, App};
use crate::orchestrator::event_loop::run_event_loop;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

/// 执行一条命令，返回是否成功
pub async fn run_command(app: App, command: Command) -> AppResult<bool> {
    match command {
        Command::Select { text } => {
            let ack = app.select(&join_words(&text)).await;
            Ok(ack.map_or(true, |a| a.is_success()))
        }
        Command::Submit => {
            let outcome = app.submit().await;
            Ok(outcome.is_success())
        }
        Command::Status => {
            println!("{}", describe_buffer(&app.status().await));
            Ok(true)
        }
        Command::Reset => {
            app.reset().await?;
            println!("Question buffer cleared.");
            Ok(true)
        }
        Command::Direct { question, info } => {
            let outcome = app.direct(&question, info.as_deref()).await;
            println!("{}", outcome.status_line());
            Ok(matches!(outcome, DirectOutcome::Success { .. }))
        }
        Command::Ask { text, code_only } => {
            match app.ask(&join_words(&text), code_only).await? {
                Some(answer) => {
                    println!("{}", answer);
                    Ok(true)
                }
                None => {
                    println!("No text selected.");
                    Ok(false)
                }
            }
        }
        Command::Listen => {
            let app = Arc::new(app);
            let stdin = BufReader::new(tokio::io::stdin());
            run_event_loop(app, stdin, tokio::io::stdout()).await?;
            info!("✓ 监听结束");
            Ok(true)
        }
    }
}
