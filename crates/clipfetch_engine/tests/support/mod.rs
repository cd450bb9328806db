#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use clipfetch_engine::{EngineEvent, EventSink, StompFrame};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

pub const TOPIC: &str = "/user/topic/progress";

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(clipfetch_logging::initialize_for_tests);
}

#[derive(Default)]
pub struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    pub fn new() -> Arc<Self> {
        init_logging();
        Arc::new(Self::default())
    }

    pub fn snapshot(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Polls until `pred` holds for the recorded events or `timeout` passes.
    pub fn wait_until(&self, timeout: Duration, pred: impl Fn(&[EngineEvent]) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if pred(&self.events.lock().unwrap()) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Clone, Debug)]
pub enum Behaviour {
    /// Answer CONNECT, then push `messages` after SUBSCRIBE. With `then_close`
    /// the socket is closed right after the last message.
    Serve {
        messages: Vec<String>,
        then_close: bool,
    },
    /// Answer CONNECT with an ERROR frame.
    Reject(String),
}

impl Behaviour {
    pub fn hold(messages: &[&str]) -> Self {
        Behaviour::Serve {
            messages: messages.iter().map(|m| m.to_string()).collect(),
            then_close: false,
        }
    }

    pub fn close_after(messages: &[&str]) -> Self {
        Behaviour::Serve {
            messages: messages.iter().map(|m| m.to_string()).collect(),
            then_close: true,
        }
    }
}

/// A single-purpose STOMP broker that records what clients send.
pub struct MockBroker {
    pub url: String,
    frames: Arc<Mutex<Vec<StompFrame>>>,
    upgrade_sessions: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockBroker {
    pub async fn start(behaviour: Behaviour) -> Self {
        init_logging();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let upgrade_sessions = Arc::new(Mutex::new(Vec::new()));

        let broker_frames = frames.clone();
        let broker_sessions = upgrade_sessions.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(
                    stream,
                    behaviour.clone(),
                    broker_frames.clone(),
                    broker_sessions.clone(),
                ));
            }
        });

        Self {
            url: format!("ws://{addr}/ws/websocket"),
            frames,
            upgrade_sessions,
        }
    }

    pub fn frames(&self) -> Vec<StompFrame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.frames().into_iter().map(|frame| frame.command).collect()
    }

    pub fn upgrade_sessions(&self) -> Vec<Option<String>> {
        self.upgrade_sessions.lock().unwrap().clone()
    }

    pub fn saw(&self, command: &str) -> bool {
        self.commands().iter().any(|c| c == command)
    }

    pub async fn wait_for(&self, command: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.saw(command) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.saw(command)
    }

    pub fn wait_for_blocking(&self, command: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.saw(command) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        self.saw(command)
    }
}

async fn serve(
    stream: TcpStream,
    behaviour: Behaviour,
    frames: Arc<Mutex<Vec<StompFrame>>>,
    sessions: Arc<Mutex<Vec<Option<String>>>>,
) {
    let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let session = request
            .headers()
            .get("X-Session-ID")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        sessions.lock().unwrap().push(session);
        Ok(response)
    };
    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
        return;
    };

    let mut next_id = 0;
    while let Some(Ok(message)) = ws.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let Ok(Some(frame)) = StompFrame::parse(&text) else {
            continue;
        };
        let command = frame.command.clone();
        let subscription = frame.get("id").unwrap_or("sub-0").to_string();
        frames.lock().unwrap().push(frame);

        match (command.as_str(), &behaviour) {
            ("CONNECT", Behaviour::Reject(reason)) => {
                let error = StompFrame::new("ERROR")
                    .header("message", reason.as_str())
                    .body("session rejected");
                let _ = ws.send(Message::Text(error.encode())).await;
                let _ = ws.close(None).await;
                return;
            }
            ("CONNECT", _) => {
                let connected = StompFrame::new("CONNECTED")
                    .header("version", "1.2")
                    .header("heart-beat", "0,0");
                let _ = ws.send(Message::Text(connected.encode())).await;
            }
            (
                "SUBSCRIBE",
                Behaviour::Serve {
                    messages,
                    then_close,
                },
            ) => {
                for body in messages {
                    next_id += 1;
                    let message = StompFrame::new("MESSAGE")
                        .header("destination", TOPIC)
                        .header("subscription", subscription.as_str())
                        .header("message-id", next_id.to_string())
                        .header("content-type", "text/plain;charset=UTF-8")
                        .body(body.as_str());
                    let _ = ws.send(Message::Text(message.encode())).await;
                }
                if *then_close {
                    let _ = ws.close(None).await;
                    return;
                }
            }
            _ => {}
        }
    }
}
