//! Session-scoped progress channel: STOMP over a WebSocket.
//!
//! The session id travels twice, as an HTTP header on the upgrade request
//! and as a header on the STOMP `CONNECT` frame, so the server can route
//! the private progress topic to this client.

use std::time::Duration;

use clipfetch_logging::{clip_debug, clip_info, clip_trace};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::{SessionId, StompFrame};

/// Header carrying the client session id on the channel and the start/cancel calls.
pub const SESSION_HEADER: &str = "X-Session-ID";

const SUBSCRIPTION_ID: &str = "sub-0";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    /// `ws://` or `wss://` endpoint of the raw WebSocket transport.
    pub url: String,
    /// Destination to subscribe to once connected.
    pub topic: String,
    /// Bound on the upgrade plus the STOMP handshake.
    pub connect_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },
    #[error("connection timed out after {0:?}")]
    Timeout(Duration),
    #[error("server rejected the session: {0}")]
    Rejected(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("connection closed")]
    Closed,
    #[error(transparent)]
    WebSocket(#[from] tungstenite::Error),
}

/// A connected, optionally subscribed, progress channel.
pub struct ProgressChannel {
    stream: Option<WsStream>,
    subscription: Option<String>,
}

impl ProgressChannel {
    /// Open the WebSocket and complete the STOMP handshake within the timeout.
    pub async fn connect(
        settings: &ChannelSettings,
        session: &SessionId,
    ) -> Result<Self, ChannelError> {
        match tokio::time::timeout(settings.connect_timeout, handshake(&settings.url, session)).await
        {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Timeout(settings.connect_timeout)),
        }
    }

    pub async fn subscribe(&mut self, destination: &str) -> Result<(), ChannelError> {
        let frame = StompFrame::new("SUBSCRIBE")
            .header("id", SUBSCRIPTION_ID)
            .header("destination", destination)
            .header("ack", "auto");
        self.send(frame).await?;
        self.subscription = Some(SUBSCRIPTION_ID.to_string());
        clip_debug!("Subscribed to {}", destination);
        Ok(())
    }

    /// Body of the next `MESSAGE` frame; `Ok(None)` once the server closes.
    pub async fn next_message(&mut self) -> Result<Option<String>, ChannelError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        loop {
            let Some(frame) = read_frame(stream).await? else {
                return Ok(None);
            };
            match frame.command.as_str() {
                "MESSAGE" => return Ok(Some(frame.body)),
                "ERROR" => return Err(ChannelError::Rejected(error_text(&frame))),
                other => clip_trace!("Ignoring {} frame", other),
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Unsubscribe, disconnect and close the socket. Safe to call repeatedly.
    pub async fn close(&mut self) {
        let Some(mut stream) = self.stream.take() else {
            return;
        };
        if let Some(id) = self.subscription.take() {
            let frame = StompFrame::new("UNSUBSCRIBE").header("id", id);
            let _ = stream.send(Message::Text(frame.encode())).await;
        }
        let _ = stream
            .send(Message::Text(StompFrame::new("DISCONNECT").encode()))
            .await;
        let _ = stream.close(None).await;
        clip_debug!("Progress channel closed");
    }

    async fn send(&mut self, frame: StompFrame) -> Result<(), ChannelError> {
        let stream = self.stream.as_mut().ok_or(ChannelError::Closed)?;
        stream.send(Message::Text(frame.encode())).await?;
        Ok(())
    }
}

async fn handshake(url: &str, session: &SessionId) -> Result<ProgressChannel, ChannelError> {
    let connect_error = |message: String| ChannelError::Connect {
        url: url.to_string(),
        message,
    };

    let host = url::Url::parse(url)
        .map_err(|err| connect_error(err.to_string()))?
        .host_str()
        .map(str::to_string)
        .ok_or_else(|| connect_error("missing host".to_string()))?;

    let mut request = url
        .into_client_request()
        .map_err(|err| connect_error(err.to_string()))?;
    let value =
        HeaderValue::from_str(session.as_str()).map_err(|err| connect_error(err.to_string()))?;
    request.headers_mut().insert(SESSION_HEADER, value);

    let (mut stream, _response) = connect_async(request)
        .await
        .map_err(|err| connect_error(err.to_string()))?;

    let connect = StompFrame::new("CONNECT")
        .header("accept-version", "1.2")
        .header("host", host)
        .header("heart-beat", "0,0")
        .header(SESSION_HEADER, session.as_str());
    stream.send(Message::Text(connect.encode())).await?;

    loop {
        let frame = read_frame(&mut stream).await?.ok_or(ChannelError::Closed)?;
        match frame.command.as_str() {
            "CONNECTED" => break,
            "ERROR" => return Err(ChannelError::Rejected(error_text(&frame))),
            other => {
                return Err(ChannelError::Protocol(format!(
                    "expected CONNECTED, got {other}"
                )))
            }
        }
    }

    clip_info!("Progress channel connected to {}", url);
    Ok(ProgressChannel {
        stream: Some(stream),
        subscription: None,
    })
}

/// Next STOMP frame, skipping heart-beats and control messages.
async fn read_frame(stream: &mut WsStream) -> Result<Option<StompFrame>, ChannelError> {
    while let Some(message) = stream.next().await {
        let text = match message? {
            Message::Text(text) => text,
            Message::Binary(data) => String::from_utf8(data)
                .map_err(|_| ChannelError::Protocol("binary frame is not UTF-8".to_string()))?,
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            Message::Close(frame) => {
                clip_debug!("Server closed the channel: {:?}", frame);
                return Ok(None);
            }
        };
        match StompFrame::parse(&text) {
            Ok(Some(frame)) => return Ok(Some(frame)),
            Ok(None) => continue,
            Err(err) => return Err(ChannelError::Protocol(err.to_string())),
        }
    }
    Ok(None)
}

fn error_text(frame: &StompFrame) -> String {
    match frame.get("message") {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => frame.body.trim().to_string(),
    }
}
