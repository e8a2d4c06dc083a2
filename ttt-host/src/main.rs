use anyhow::Result;
use clap::Parser;
use protocol::{
    connect_with_retry, Listener, NetworkConfig, ProtocolError, TcpConnector, TcpListener,
    CONNECT_RETRY_INTERVAL, CONNECT_RETRY_WINDOW, DEFAULT_HOST, DEFAULT_PORT,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttt_host::{HostConfig, HostSession};
use ttt_peer::{play_console, PeerExit};

/// 井字棋：地址空闲则作为主机并执 X，已有主机则作为玩家加入
#[derive(Parser, Debug)]
#[command(name = "ttt-host", version)]
struct Cli {
    /// 监听 / 连接地址
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// 端口
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// 等待执子方时同时监视另一方是否掉线
    #[arg(long)]
    watch_idle_peer: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，避免与棋盘混在一起）
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("ttt_host=info".parse()?)
            .add_directive("ttt_peer=info".parse()?))
        .init();

    let cli = Cli::parse();
    let network = NetworkConfig {
        host: cli.host,
        port: cli.port,
    };
    let config = HostConfig {
        watch_idle_peer: cli.watch_idle_peer,
    };
    let addr = network.addr();

    match TcpListener::bind(&addr).await {
        Ok(listener) => host_and_play(listener, &addr, config).await,
        Err(ProtocolError::Io(e)) if e.kind() == std::io::ErrorKind::AddrInUse => {
            info!("{} is already hosted, joining as a player", addr);
            report(ttt_peer::join(&addr).await?);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// 作为主机：后台运行主机会话，本进程再以 X 方身份连回自己
async fn host_and_play(listener: TcpListener, addr: &str, config: HostConfig) -> Result<()> {
    info!("Hosting on {}", addr);
    let host = tokio::spawn(async move {
        let session = HostSession::accept(listener, config).await?;
        Ok::<_, ProtocolError>(session.run().await)
    });

    // 本地玩家最先连接，因此按接入顺序执 X
    let conn = connect_with_retry(&TcpConnector, addr, CONNECT_RETRY_WINDOW, CONNECT_RETRY_INTERVAL)
        .await?;
    report(play_console(conn).await);

    match host.await? {
        Ok(exit) => info!("Host session ended: {:?}", exit),
        Err(e) => error!("Host session failed: {}", e),
    }
    Ok(())
}

fn report(exit: PeerExit) {
    match exit {
        PeerExit::GameOver(outcome) => info!("Match finished: {:?}", outcome),
        PeerExit::Disconnected => info!("Match aborted: connection lost"),
    }
}
