//! ATP CLI 应用

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

mod commands;

#[derive(Parser)]
#[command(name = "atp")]
#[command(about = "OCloudView ATP - SSH 测试处理器命令行工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// SSH 远程执行
    Ssh {
        #[command(subcommand)]
        action: SshAction,
    },
}

#[derive(Subcommand)]
pub enum SshAction {
    /// 在远程主机执行命令块
    Exec {
        /// 端点 (USERNAME:PASSWORD@IP:PORT)
        #[arg(short, long)]
        endpoint: String,

        /// 命令（可多次指定，按顺序执行）
        #[arg(short = 'c', long = "command", conflicts_with = "script_file")]
        commands: Vec<String>,

        /// 命令块文件（每行一条命令）
        #[arg(short, long, conflicts_with = "commands")]
        script_file: Option<String>,

        /// 测试属性文件 (TOML)，未指定时按默认搜索路径查找
        #[arg(short, long)]
        properties: Option<String>,

        /// 首字节超时（毫秒），覆盖属性文件中的设置
        #[arg(short, long)]
        timeout: Option<u64>,

        /// 以 JSON 输出响应
        #[arg(long)]
        json_output: bool,
    },

    /// 解析端点并显示（密码不显示）
    Endpoint {
        /// 端点 (USERNAME:PASSWORD@IP:PORT)
        raw: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    info!("ATP CLI 启动");

    // 处理命令
    match cli.command {
        Commands::Ssh { action } => commands::ssh::handle(action).await?,
    }

    Ok(())
}
