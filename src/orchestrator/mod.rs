//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责装配资源和调度用户动作，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用
//! - 按配置创建存储、处理服务客户端、通知渠道
//! - 持有三个流程（积累 / 提交 / 直接输入）
//! - 把流程结果转成通知
//!
//! ### `commands` - 命令分发
//! - 一条命令行命令对应一次动作
//!
//! ### `event_loop` - 事件循环
//! - 从标准输入逐行读事件
//! - 提交在后台跑，同一时间最多一个
//!
//! ## 层次关系
//!
//! ```text
//! commands / event_loop
//!     ↓
//! app (App)
//!     ↓
//! workflow (Accumulation / Submission / DirectEntry)
//!     ↓
//! services (BufferStore / Notifier) + clients (ProcessClient / GeminiClient)
//!     ↓
//! infrastructure (KeyValueStore)
//! ```
//!
//! ## 设计原则
//!
//! 1. **向下依赖**：编排层 → workflow → services → infrastructure
//! 2. **无业务逻辑**：只做调度和展示，不做缓冲区判断

pub mod app;
pub mod commands;
pub mod event_loop;

// 重新导出主要类型
pub use app::{describe_buffer, App};
pub use commands::run_command;
pub use event_loop::{run_event_loop, Event, SUBMISSION_IN_PROGRESS};
