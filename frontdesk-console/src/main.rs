//! 前台控制台主程序

mod script;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use frontdesk_admin::{init_logging, ConfigLoader};
use frontdesk_journey::{JourneyFilter, JourneyTracker};
use session::Session;
use tracing::{error, info, warn};

/// 前台控制台命令行参数
#[derive(Parser, Debug)]
#[command(name = "frontdesk-console")]
#[command(about = "Front desk patient journey tracker console")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    /// 会话脚本；未指定时载入演示患者并打印看板
    #[arg(short, long)]
    script: Option<String>,

    /// 以 JSON 输出
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::load(args.config.as_deref())?;
    init_logging(&config.logging, args.log_level.as_deref())?;

    let tracker = JourneyTracker::new(config.pipeline()?)
        .with_id_prefix(config.journey.patient_id_prefix.clone());

    info!("Starting front desk console");
    info!("  Stages: {}", tracker.pipeline().names().join(" > "));
    info!("  Patient id prefix: {}", config.journey.patient_id_prefix);

    let mut session = Session::new(tracker, args.json);

    let Some(path) = args.script else {
        session.seed_demo()?;
        println!("{}", session.execute(script::Command::Board(JourneyFilter::default()))?);
        println!("{}", session.execute(script::Command::Stats)?);
        return Ok(());
    };

    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read script {}", path))?;

    let mut failures = 0;
    for (line, command) in script::parse_script(&content) {
        let outcome = command.and_then(|command| session.execute(command));
        match outcome {
            Ok(output) => println!("{}", output),
            Err(e) => {
                failures += 1;
                warn!("Line {} rejected: {:#}", line, e);
                eprintln!("line {}: {:#}", line, e);
            }
        }
    }

    if failures > 0 {
        error!("{} script line(s) were rejected", failures);
    }
    info!("Session finished with {} patients", session.tracker().len());
    Ok(())
}
