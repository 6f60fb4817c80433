//! 命令行参数定义

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 把选中的文本拼成一个带上下文的问题，发给本地处理服务
#[derive(Debug, Parser)]
#[command(name = "question_builder", version)]
pub struct Cli {
    /// TOML 配置文件路径（环境变量优先）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// 选中一段文本：第一段是主问题，之后的是上下文
    Select {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// 提交组合问题
    Submit,
    /// 查看当前缓冲区
    Status,
    /// 清空缓冲区
    Reset,
    /// 直接输入一个问题，不经过缓冲区
    Direct {
        #[arg(short, long)]
        question: String,
        /// 附加信息
        #[arg(short, long)]
        info: Option<String>,
    },
    /// 把一段文本直接问 Gemini
    Ask {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// 只输出回答里的代码块
        #[arg(long)]
        code_only: bool,
    },
    /// 从标准输入逐行读取事件
    Listen,
}

/// 把多个参数拼回一段文本
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}
