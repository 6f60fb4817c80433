use anyhow::{Context, Result};
use clap::Parser;
use question_builder::cli::Cli;
use question_builder::orchestrator::{run_command, App};
use question_builder::utils::logging;
use question_builder::Config;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logging::init(cli.verbose || config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).context("初始化应用失败")?;
    let succeeded = run_command(app, cli.command).await?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
