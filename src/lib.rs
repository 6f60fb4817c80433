//! # Question Builder
//!
//! 把分几次选中的文本拼成一个"主问题 + 上下文"的组合问题，
//! 一次性发给本地的问答处理服务
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持久化键值存储，只暴露 get / set / remove 能力
//! - `JsonFileStore` - 一个 JSON 文件存全部键值
//!
//! ### ② 业务能力层（Services / Clients）
//! - `services/` - 描述"我能做什么"
//! - `BufferStore` - 问题缓冲区的读改写（单写者）
//! - `Notifier` - 通知能力
//! - `clients/` - 处理服务和 Gemini 的 HTTP 客户端
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义每个用户动作的完整流程
//! - `AccumulationController` - 选中文本 → 主问题 / 上下文
//! - `SubmissionController` - 组合 → 发送 → 有条件清空
//! - `DirectEntry` - 直接输入一个问题
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 装配资源，把结果转成通知
//! - `orchestrator/event_loop` - 逐行读事件，最多一个提交在途
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Acknowledgement, DirectOutcome, QuestionBuffer, SubmissionOutcome};
pub use orchestrator::App;
pub use workflow::{AccumulationController, DirectEntry, SubmissionController};
