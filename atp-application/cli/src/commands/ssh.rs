//! SSH 远程执行命令

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use atp_processor::{Request, TestProperties, TracingLogger};
use atp_ssh_executor::{Endpoint, RusshTransport, SshTestProcessor, RESPONSE_TIMEOUT_KEY};
use colored::Colorize;
use serde::Serialize;

use crate::SshAction;

/// JSON 输出格式
#[derive(Debug, Serialize)]
struct ExecOutput<'a> {
    endpoint: String,
    success: bool,
    error_kind: Option<&'a str>,
    error: Option<String>,
    text: Option<String>,
}

pub async fn handle(action: SshAction) -> Result<()> {
    match action {
        SshAction::Exec {
            endpoint,
            commands,
            script_file,
            properties,
            timeout,
            json_output,
        } => {
            let test_block = build_test_block(&commands, script_file.as_deref())?;
            let properties = load_properties(properties.as_deref(), timeout)?;
            exec(&endpoint, test_block, properties, json_output).await
        }
        SshAction::Endpoint { raw } => show_endpoint(&raw),
    }
}

async fn exec(
    raw_endpoint: &str,
    test_block: String,
    properties: TestProperties,
    json_output: bool,
) -> Result<()> {
    let processor = SshTestProcessor::new(
        Arc::new(RusshTransport::new()),
        Arc::new(properties),
        Arc::new(TracingLogger),
    );
    let request = Request::new(raw_endpoint, test_block);

    let result = processor.run(&request).await;
    let display_endpoint = Endpoint::parse(raw_endpoint)
        .map(|e| e.to_string())
        .unwrap_or_else(|_| "<invalid>".to_string());

    if json_output {
        println!("{}", render_json(&display_endpoint, &result)?);
    } else if let Ok(text) = &result {
        print!("{}", text);
    }

    match result {
        Ok(_) => Ok(()),
        Err(e) => {
            if !json_output {
                eprintln!("{} {}: {}", "✗".red(), e.kind().yellow(), e);
            }
            anyhow::bail!("SSH 执行失败: {}", display_endpoint)
        }
    }
}

/// 以 JSON 形式输出执行结果
fn render_json(display_endpoint: &str, result: &atp_ssh_executor::Result<String>) -> Result<String> {
    let output = match result {
        Ok(text) => ExecOutput {
            endpoint: display_endpoint.to_string(),
            success: true,
            error_kind: None,
            error: None,
            text: Some(text.clone()),
        },
        Err(e) => ExecOutput {
            endpoint: display_endpoint.to_string(),
            success: false,
            error_kind: Some(e.kind()),
            error: Some(e.to_string()),
            text: None,
        },
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

fn show_endpoint(raw: &str) -> Result<()> {
    let endpoint = Endpoint::parse(raw).context("端点解析失败")?;

    println!("{} 端点解析成功", "✓".green());
    println!("  用户: {}", endpoint.username.yellow());
    println!("  密码: {}", "***".dimmed());
    println!("  主机: {}", endpoint.host.yellow());
    println!("  端口: {}", endpoint.port.to_string().yellow());

    Ok(())
}

/// 由命令参数或命令文件组成命令块
fn build_test_block(commands: &[String], script_file: Option<&str>) -> Result<String> {
    if let Some(path) = script_file {
        return fs::read_to_string(path)
            .with_context(|| format!("读取命令文件失败: {}", path));
    }

    if commands.is_empty() {
        anyhow::bail!("请通过 --command 或 --script-file 指定要执行的命令");
    }

    Ok(commands.join("\n"))
}

/// 加载测试属性，命令行超时优先
fn load_properties(path: Option<&str>, timeout_ms: Option<u64>) -> Result<TestProperties> {
    let mut properties = match path {
        Some(path) => TestProperties::load_from_file(Path::new(path))
            .with_context(|| format!("加载属性文件失败: {}", path))?,
        None => TestProperties::load().context("加载属性文件失败")?,
    };

    if let Some(ms) = timeout_ms {
        properties.set(RESPONSE_TIMEOUT_KEY, ms.to_string());
    }

    Ok(properties)
}
