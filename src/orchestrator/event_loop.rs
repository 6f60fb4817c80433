//! 事件循环 - 编排层
//!
//! 从一行一个事件的输入流里读取用户动作：
//!
//! ```text
//! select <文本>   选中一段文本
//! submit          提交组合问题
//! status          查看缓冲区
//! reset           清空缓冲区
//! quit            退出
//! ```
//!
//! 选中事件按到达顺序逐个处理；提交在后台任务里跑，期间仍可继续选中。
//! 同一时间最多一个提交在途。非 UTF-8 的字节按替换字符读入，不会中断循环。

use crate::error::AppResult;
use crate::models::SubmissionOutcome;
use crate::orchestrator::app::{describe_buffer, App};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 已有提交在途时的提示
pub const SUBMISSION_IN_PROGRESS: &str = "A submission is already in progress.";

/// 一行输入解析出的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Select(String),
    Submit,
    Status,
    Reset,
    Quit,
    Unknown(String),
}

impl Event {
    /// 解析一行输入；空行返回 None
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest),
            None => (trimmed, ""),
        };

        let event = match command.to_ascii_lowercase().as_str() {
            "select" => Event::Select(rest.trim().to_string()),
            "submit" => Event::Submit,
            "status" => Event::Status,
            "reset" => Event::Reset,
            "quit" | "exit" => Event::Quit,
            _ => Event::Unknown(trimmed.to_string()),
        };
        Some(event)
    }
}

/// 运行事件循环直到 `quit` 或输入结束
///
/// 退出前会等待在途的提交完成
pub async fn run_event_loop<R, W>(app: Arc<App>, mut input: R, mut output: W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("👂 开始监听事件 (select / submit / status / reset / quit)");

    let mut in_flight: Option<JoinHandle<SubmissionOutcome>> = None;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if input.read_until(b'\n', &mut raw).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&raw);
        if std::str::from_utf8(&raw).is_err() {
            warn!("⚠️ 输入行不是合法的 UTF-8，已替换无效字节");
        }

        let Some(event) = Event::parse(&line) else {
            continue;
        };
        debug!("收到事件: {:?}", event);

        match event {
            Event::Select(text) => {
                app.select(&text).await;
            }
            Event::Submit => {
                if in_flight.as_ref().is_some_and(|h| !h.is_finished()) {
                    warn!("⚠️ 已有提交在途，忽略本次提交");
                    app.notify("Question Builder", SUBMISSION_IN_PROGRESS).await;
                    continue;
                }
                let app = app.clone();
                in_flight = Some(tokio::spawn(async move { app.submit().await }));
            }
            Event::Status => {
                let buffer = app.status().await;
                write_line(&mut output, &describe_buffer(&buffer)).await?;
            }
            Event::Reset => {
                if let Err(e) = app.reset().await {
                    warn!("⚠️ 清空缓冲区失败: {}", e);
                    write_line(&mut output, &format!("Reset failed: {}", e)).await?;
                }
            }
            Event::Quit => break,
            Event::Unknown(raw) => {
                write_line(&mut output, &format!("Unknown command: {}", raw)).await?;
            }
        }
    }

    if let Some(handle) = in_flight {
        info!("⏳ 等待在途提交完成...");
        if let Err(e) = handle.await {
            warn!("⚠️ 提交任务异常结束: {}", e);
        }
    }

    info!("👋 事件循环结束");
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> AppResult<()> {
    output.write_all(format!("{}\n", text).as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
