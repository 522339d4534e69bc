//! WebSocket transport (tokio-tungstenite) and dialer.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::WebSocketStream;

use sockmux_core::error::{Error, Result};

use crate::config::ConnOptions;
use crate::connection::Connection;
use crate::transport::{Frame, FrameSink, FrameStream, Transport};

pub struct WsSink<S> {
    sink: SplitSink<WebSocketStream<S>, Message>,
}

pub struct WsFrames<S> {
    stream: SplitStream<WebSocketStream<S>>,
}

impl<S> Transport for WebSocketStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Sink = WsSink<S>;
    type Stream = WsFrames<S>;

    fn split(self) -> (Self::Sink, Self::Stream) {
        let (sink, stream) = StreamExt::split(self);
        (WsSink { sink }, WsFrames { stream })
    }
}

#[async_trait]
impl<S> FrameSink for WsSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| Error::Transport(format!("websocket send failed: {e}")))
    }

    async fn close(&mut self) -> Result<()> {
        match self.sink.close().await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(Error::Transport(format!("websocket close failed: {e}"))),
        }
    }
}

#[async_trait]
impl<S> FrameStream for WsFrames<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    async fn next_frame(&mut self) -> Option<Result<Frame>> {
        loop {
            let frame = match self.stream.next().await? {
                Ok(Message::Text(text)) => Frame::Text(text),
                Ok(Message::Binary(data)) => Frame::Binary(Bytes::from(data)),
                Ok(Message::Ping(_)) => Frame::Ping,
                Ok(Message::Pong(_)) => Frame::Pong,
                Ok(Message::Close(_)) => Frame::Close,
                // raw frames are never yielded while reading
                Ok(Message::Frame(_)) => continue,
                Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => return None,
                Err(e) => return Some(Err(Error::Transport(format!("websocket read failed: {e}")))),
            };
            return Some(Ok(frame));
        }
    }
}

/// Dial `url` with the configured handshake headers and wrap the socket in a
/// `Connection`.
pub async fn dial(url: &str, options: &ConnOptions) -> Result<Connection> {
    let mut request = url
        .into_client_request()
        .map_err(|e| Error::Dial(format!("invalid websocket url {url}: {e}")))?;

    for (name, value) in &options.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::Dial(format!("invalid header name {name}: {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::Dial(format!("invalid header value for {name}: {e}")))?;
        request.headers_mut().append(header_name, header_value);
    }

    let (stream, response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::Dial(format!("websocket connect to {url} failed: {e}")))?;
    tracing::info!(%url, status = %response.status(), "websocket connected");

    Ok(Connection::new(stream, options))
}

/// Build the socket endpoint URL for `host`.
///
/// Bare hosts and `http(s)://` URLs are mapped to `ws(s)://`; explicit
/// `ws://`/`wss://` schemes are kept.
pub fn socket_url(host: &str) -> String {
    let base = if host.starts_with("ws://") || host.starts_with("wss://") {
        host.to_string()
    } else if let Some(rest) = host.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = host.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        format!("ws://{host}")
    };
    format!("{}/socket.io/?EIO=3&transport=websocket", base.trim_end_matches('/'))
}
