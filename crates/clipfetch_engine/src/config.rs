use std::path::PathBuf;
use std::time::Duration;

use clipfetch_logging::clip_warn;

use crate::ChannelSettings;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
const DEFAULT_PROGRESS_TOPIC: &str = "/user/topic/progress";
const CHANNEL_PATH: &str = "/ws/websocket";

/// Engine configuration.
///
/// | Env var                          | Default                         |
/// |----------------------------------|---------------------------------|
/// | `CLIPFETCH_SERVER_URL`           | `http://localhost:8080`         |
/// | `CLIPFETCH_CHANNEL_URL`          | derived from the server URL     |
/// | `CLIPFETCH_PROGRESS_TOPIC`       | `/user/topic/progress`          |
/// | `CLIPFETCH_DOWNLOAD_DIR`         | `./downloads`                   |
/// | `CLIPFETCH_STATE_DIR`            | `./.clipfetch`                  |
/// | `CLIPFETCH_CONNECT_TIMEOUT_SECS` | `10`                            |
/// | `CLIPFETCH_REQUEST_TIMEOUT_SECS` | `300`                           |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub server_url: String,
    /// Explicit channel endpoint; derived from `server_url` when `None`.
    pub channel_url: Option<String>,
    pub progress_topic: String,
    pub download_dir: PathBuf,
    pub state_dir: PathBuf,
    pub connect_timeout: Duration,
    /// Applies to every REST call, including the artifact download.
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            channel_url: None,
            progress_topic: DEFAULT_PROGRESS_TOPIC.to_string(),
            download_dir: PathBuf::from("downloads"),
            state_dir: PathBuf::from(".clipfetch"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
        }
    }
}

impl EngineConfig {
    pub fn default_with_output(download_dir: PathBuf) -> Self {
        Self {
            download_dir,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let text = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = text("CLIPFETCH_SERVER_URL") {
            config.server_url = url;
        }
        config.channel_url = text("CLIPFETCH_CHANNEL_URL");
        if let Some(topic) = text("CLIPFETCH_PROGRESS_TOPIC") {
            config.progress_topic = topic;
        }
        if let Some(dir) = text("CLIPFETCH_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        if let Some(dir) = text("CLIPFETCH_STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }
        if let Some(timeout) = seconds("CLIPFETCH_CONNECT_TIMEOUT_SECS", text) {
            config.connect_timeout = timeout;
        }
        if let Some(timeout) = seconds("CLIPFETCH_REQUEST_TIMEOUT_SECS", text) {
            config.request_timeout = timeout;
        }
        config
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    pub fn channel_url(&self) -> String {
        self.channel_url
            .clone()
            .unwrap_or_else(|| channel_url_for(&self.server_url))
    }

    pub fn channel_settings(&self) -> ChannelSettings {
        ChannelSettings {
            url: self.channel_url(),
            topic: self.progress_topic.clone(),
            connect_timeout: self.connect_timeout,
        }
    }
}

/// `http(s)://host` becomes `ws(s)://host/ws/websocket`.
pub fn channel_url_for(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}{CHANNEL_PATH}")
}

fn seconds(key: &str, text: impl Fn(&str) -> Option<String>) -> Option<Duration> {
    let value = text(key)?;
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            clip_warn!("Ignoring {}={:?}: expected a positive number of seconds", key, value);
            None
        }
    }
}
