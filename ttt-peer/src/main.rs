use anyhow::Result;
use clap::Parser;
use protocol::{NetworkConfig, DEFAULT_HOST, DEFAULT_PORT};
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttt_peer::{join, run_hotseat, PeerExit};

/// 井字棋玩家端：加入局域网中的主机，或本地热座对局
#[derive(Parser, Debug)]
#[command(name = "ttt-peer", version)]
struct Cli {
    /// 主机地址
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// 主机端口
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// 本地热座模式（双方在同一终端轮流落子）
    #[arg(long)]
    local: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，避免与棋盘混在一起）
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("ttt_peer=info".parse()?))
        .init();

    let cli = Cli::parse();

    if cli.local {
        let summary = run_hotseat(BufReader::new(tokio::io::stdin()), &mut std::io::stdout()).await?;
        info!("Hot-seat session ended after {} games", summary.games());
        return Ok(());
    }

    let network = NetworkConfig {
        host: cli.host,
        port: cli.port,
    };
    match join(&network.addr()).await? {
        PeerExit::GameOver(outcome) => info!("Match finished: {:?}", outcome),
        PeerExit::Disconnected => info!("Match aborted: connection lost"),
    }

    Ok(())
}
