use std::fmt;

/// Quality sent for every platform other than YouTube.
pub const DEFAULT_QUALITY: &str = "best";

/// Quality presets understood by the service.
pub const QUALITY_PRESETS: &[&str] = &["best", "1080p", "720p", "480p", "360p", "144p"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    #[default]
    Youtube,
    Instagram,
    Spotify,
    Other,
}

impl Platform {
    /// Parses a platform name; anything unrecognised maps to [`Platform::Other`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "youtube" => Platform::Youtube,
            "instagram" => Platform::Instagram,
            "spotify" => Platform::Spotify,
            _ => Platform::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Spotify => "spotify",
            Platform::Other => "other",
        }
    }

    /// Only YouTube honours a quality selection.
    pub fn supports_quality(self) -> bool {
        self == Platform::Youtube
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One start request. Built per user action from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub url: String,
    pub quality: String,
    pub platform: Platform,
    pub cookies: String,
}

impl JobRequest {
    pub fn new(url: &str, platform: Platform, quality: &str, cookies: &str) -> Self {
        let quality = if platform.supports_quality() && !quality.trim().is_empty() {
            quality.trim().to_string()
        } else {
            DEFAULT_QUALITY.to_string()
        };
        Self {
            url: url.trim().to_string(),
            quality,
            platform,
            cookies: cookies.trim().to_string(),
        }
    }
}
