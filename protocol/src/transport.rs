//! 传输层抽象
//!
//! 提供 Connector/Connection/Listener traits 使上层会话与具体传输实现解耦。
//! 分帧方式为按行分隔：每条消息是一行 UTF-8 JSON，以单个 `\n` 结尾。

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpSocket, TcpStream};
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

use crate::error::{ProtocolError, Result};
use crate::{CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT, LISTEN_BACKLOG, MAX_LINE_LEN};

/// 网络配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
}

impl NetworkConfig {
    /// `host:port` 形式的地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// 连接抽象 trait（核心抽象，用于会话层）
#[async_trait]
pub trait Connection: Send + Sync {
    /// 发送一条消息
    async fn send<M: Serialize + Send + Sync>(&mut self, msg: &M) -> Result<()>;

    /// 接收一条消息
    ///
    /// 对端在完整的一行到达前关闭连接时返回 [`ProtocolError::ConnectionClosed`]；
    /// 收到完整一行但解析失败时返回结构违规错误。可在 `select!` 中安全取消：
    /// 未读完的半行会保留到下一次调用。
    async fn recv<M: DeserializeOwned>(&mut self) -> Result<M>;

    /// 关闭连接（对端随后会读到 EOF）
    async fn close(&mut self) -> Result<()>;

    /// 获取远端地址
    fn peer_addr(&self) -> Option<String>;
}

/// 连接器 trait（加入方使用）
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: Connection;

    /// 建立连接
    async fn connect(&self, addr: &str) -> Result<Self::Conn>;
}

/// 监听器 trait（主机使用）
#[async_trait]
pub trait Listener: Send + Sync + Sized {
    type Conn: Connection;

    /// 绑定地址
    async fn bind(addr: &str) -> Result<Self>;

    /// 接受连接
    async fn accept(&mut self) -> Result<Self::Conn>;

    /// 获取本地地址
    fn local_addr(&self) -> Option<String>;
}

/// 在给定时长内反复尝试连接，直到成功
///
/// 仅用于建立连接阶段；对局中没有任何读超时。
pub async fn connect_with_retry<C: Connector>(
    connector: &C,
    addr: &str,
    window: Duration,
    interval: Duration,
) -> Result<C::Conn> {
    let deadline = Instant::now() + window;
    loop {
        match connector.connect(addr).await {
            Ok(conn) => return Ok(conn),
            Err(e) if Instant::now() + interval < deadline => {
                debug!("Connect to {} failed ({}), retrying", addr, e);
                sleep(interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}

// ============================================================================
// TCP 实现
// ============================================================================

/// TCP 连接器
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpConnection;

    async fn connect(&self, addr: &str) -> Result<Self::Conn> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ProtocolError::ConnectionTimeout)?
            .map_err(ProtocolError::Io)?;

        TcpConnection::from_stream(stream)
    }
}

/// TCP 连接
pub struct TcpConnection {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
    peer_addr: Option<String>,
}

impl TcpConnection {
    /// 从 TcpStream 创建
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr().ok().map(|a| a.to_string());
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: FrameReader::new(read_half),
            writer: FrameWriter::new(write_half),
            peer_addr,
        })
    }

    /// 分离读写端（玩家侧由独立的监听任务持有读端）
    pub fn split(self) -> (FrameReader<OwnedReadHalf>, FrameWriter<OwnedWriteHalf>) {
        (self.reader, self.writer)
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn send<M: Serialize + Send + Sync>(&mut self, msg: &M) -> Result<()> {
        self.writer.write_frame(msg).await
    }

    async fn recv<M: DeserializeOwned>(&mut self) -> Result<M> {
        self.reader.read_frame().await
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.shutdown().await
    }

    fn peer_addr(&self) -> Option<String> {
        self.peer_addr.clone()
    }
}

/// TCP 监听器（队列长度固定为 2）
pub struct TcpListener {
    listener: tokio::net::TcpListener,
}

#[async_trait]
impl Listener for TcpListener {
    type Conn = TcpConnection;

    async fn bind(addr: &str) -> Result<Self> {
        let addr: SocketAddr = tokio::net::lookup_host(addr)
            .await?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "address resolved to nothing")
            })?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(LISTEN_BACKLOG)?;

        Ok(Self { listener })
    }

    async fn accept(&mut self) -> Result<Self::Conn> {
        let (stream, _addr) = self.listener.accept().await.map_err(ProtocolError::Io)?;
        TcpConnection::from_stream(stream)
    }

    fn local_addr(&self) -> Option<String> {
        self.listener.local_addr().ok().map(|a| a.to_string())
    }
}

// ============================================================================
// 行分帧编解码
// ============================================================================

/// 帧读取器
pub struct FrameReader<R> {
    reader: BufReader<R>,
    /// 当前行的已读部分，跨调用保留
    buffer: Vec<u8>,
    /// 当前行超长后已丢弃的字节数
    discarded: usize,
}

impl<R: AsyncRead + Unpin + Send> FrameReader<R> {
    /// 创建新的帧读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::new(),
            discarded: 0,
        }
    }

    /// 读取并解码一行消息
    ///
    /// 缓冲最多保留 `MAX_LINE_LEN` 加行尾的字节；超出后丢弃到下一个 `\n`，
    /// 整行作为 [`ProtocolError::LineTooLong`] 返回。
    pub async fn read_frame<M: DeserializeOwned>(&mut self) -> Result<M> {
        loop {
            let available = self.reader.fill_buf().await?;

            // EOF：一个字节都没收到，或停在半行
            if available.is_empty() {
                self.buffer.clear();
                self.discarded = 0;
                return Err(ProtocolError::ConnectionClosed);
            }

            let (used, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (available.len(), false),
            };

            if self.discarded == 0 && self.buffer.len() + used <= MAX_LINE_LEN + 2 {
                self.buffer.extend_from_slice(&available[..used]);
            } else {
                self.discarded += self.buffer.len() + used;
                self.buffer.clear();
            }
            self.reader.consume(used);

            if complete {
                break;
            }
        }

        if self.discarded > 0 {
            let size = self.discarded - 1;
            self.discarded = 0;
            return Err(ProtocolError::LineTooLong {
                size,
                max: MAX_LINE_LEN,
            });
        }

        let result = decode_line(&self.buffer);
        self.buffer.clear();
        result
    }
}

fn decode_line<M: DeserializeOwned>(line: &[u8]) -> Result<M> {
    let body = line.strip_suffix(b"\n").unwrap_or(line);
    let body = body.strip_suffix(b"\r").unwrap_or(body);

    if body.len() > MAX_LINE_LEN {
        return Err(ProtocolError::LineTooLong {
            size: body.len(),
            max: MAX_LINE_LEN,
        });
    }

    Ok(serde_json::from_slice(body)?)
}

/// 帧写入器
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> FrameWriter<W> {
    /// 创建新的帧写入器
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 编码并写入一行消息
    pub async fn write_frame<M: Serialize>(&mut self, msg: &M) -> Result<()> {
        let mut payload = serde_json::to_vec(msg)?;

        if payload.contains(&b'\n') {
            return Err(ProtocolError::EmbeddedNewline);
        }
        if payload.len() > MAX_LINE_LEN {
            return Err(ProtocolError::LineTooLong {
                size: payload.len(),
                max: MAX_LINE_LEN,
            });
        }

        payload.push(b'\n');
        self.writer.write_all(&payload).await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// 关闭写端
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mark::Mark;
    use crate::message::Message;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_tcp_connection() {
        // 启动监听
        let mut listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // 客户端连接
        let client_handle = tokio::spawn(async move {
            let connector = TcpConnector;
            let mut conn = connector.connect(&addr).await.unwrap();

            conn.send(&Message::Move { row: 1, col: 2 }).await.unwrap();

            let msg: Message = conn.recv().await.unwrap();
            assert_eq!(msg, Message::Role { mark: Mark::X });
        });

        // 服务端接受连接
        let mut conn = listener.accept().await.unwrap();

        let msg: Message = conn.recv().await.unwrap();
        assert_eq!(msg, Message::Move { row: 1, col: 2 });

        conn.send(&Message::Role { mark: Mark::X }).await.unwrap();

        client_handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_is_seen_as_connection_closed() {
        let mut listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = TcpConnector.connect(&addr).await.unwrap();
        let mut server = listener.accept().await.unwrap();

        server.close().await.unwrap();
        let err = client.recv::<Message>().await.unwrap_err();
        assert!(err.is_disconnect());
    }

    #[tokio::test]
    async fn test_eof_before_any_byte() {
        let (client, server) = tokio::io::duplex(64);
        drop(client);
        let mut reader = FrameReader::new(server);
        let err = reader.read_frame::<Message>().await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_eof_mid_line() {
        let (mut client, server) = tokio::io::duplex(64);
        client.write_all(br#"{"type":"your_tu"#).await.unwrap();
        drop(client);

        let mut reader = FrameReader::new(server);
        let err = reader.read_frame::<Message>().await.unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_malformed_line_then_valid_line() {
        let (mut client, server) = tokio::io::duplex(256);
        client
            .write_all(b"not json\n{\"type\":\"your_turn\"}\r\n")
            .await
            .unwrap();

        let mut reader = FrameReader::new(server);
        let err = reader.read_frame::<Message>().await.unwrap_err();
        assert!(err.is_schema_violation());

        // 结构违规不影响后续分帧
        let msg: Message = reader.read_frame().await.unwrap();
        assert_eq!(msg, Message::YourTurn);
    }

    #[tokio::test]
    async fn test_line_too_long() {
        let (mut client, server) = tokio::io::duplex(MAX_LINE_LEN * 2 + 64);
        let mut line = vec![b' '; MAX_LINE_LEN + 1];
        line.push(b'\n');
        client.write_all(&line).await.unwrap();

        let mut reader = FrameReader::new(server);
        let err = reader.read_frame::<Message>().await.unwrap_err();
        assert!(matches!(err, ProtocolError::LineTooLong { .. }));
    }

    #[tokio::test]
    async fn test_unterminated_line_stays_bounded() {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(async move {
            let junk = vec![b'a'; 1024 * 1024];
            let _ = client.write_all(&junk).await;
            // 保持连接不关闭，也不发送换行
            std::future::pending::<()>().await;
        });

        let mut reader = FrameReader::new(server);
        let read = timeout(Duration::from_millis(500), reader.read_frame::<Message>()).await;
        assert!(read.is_err());
        assert!(reader.buffer.len() <= MAX_LINE_LEN + 2);
        assert!(reader.discarded > MAX_LINE_LEN);
    }

    #[tokio::test]
    async fn test_oversized_line_is_skipped() {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        tokio::spawn(async move {
            let mut data = vec![b'a'; MAX_LINE_LEN * 8];
            data.extend_from_slice(b"\n{\"type\":\"your_turn\"}\n");
            client.write_all(&data).await.unwrap();
        });

        let mut reader = FrameReader::new(server);
        let err = reader.read_frame::<Message>().await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::LineTooLong { size, .. } if size == MAX_LINE_LEN * 8
        ));
        assert!(err.is_schema_violation());

        // 超长行之后的下一行照常解码
        let msg: Message = reader.read_frame().await.unwrap();
        assert_eq!(msg, Message::YourTurn);
    }

    #[tokio::test]
    async fn test_writer_emits_single_line() {
        let (client, mut server) = tokio::io::duplex(256);
        let mut writer = FrameWriter::new(client);
        writer
            .write_frame(&Message::Error {
                message: "line one\nline two".to_string(),
            })
            .await
            .unwrap();
        drop(writer);

        let mut raw = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut server, &mut raw)
            .await
            .unwrap();
        assert_eq!(raw.matches('\n').count(), 1);
        assert!(raw.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_connect_with_retry_gives_up() {
        // 绑定后立即释放，得到一个大概率无人监听的端口
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().to_string()
        };
        let result = connect_with_retry(
            &TcpConnector,
            &addr,
            Duration::from_millis(300),
            Duration::from_millis(50),
        )
        .await;
        assert!(result.is_err());
    }
}
