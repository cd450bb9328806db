use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::Platform;

/// Longest URL accepted, in characters.
pub const MAX_URL_LEN: usize = 200;

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:(?:www|m|music)\.)?(?:youtube\.com/(?:watch\?(?:[^#\s]*&)?v=|embed/|shorts/|live/|v/|e/|c/|user/|channel/|@|playlist\?(?:[^#\s]*&)?list=)[\w.@-]+|youtu\.be/[\w-]+)",
    )
    .expect("youtube pattern")
});

static INSTAGRAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?://)?(?:www\.)?(?:instagram\.com|instagr\.am)/(?:(?:[\w.]+/)?(?:p|reel|reels|tv)/[\w-]+|stories/[\w.]+(?:/\d+)?|[\w.]+)/?(?:\?\S*)?$",
    )
    .expect("instagram pattern")
});

static SPOTIFY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?open\.spotify\.com/(?:track|album|playlist|artist)/[A-Za-z0-9_-]+(?:/|\?\S*)?$",
    )
    .expect("spotify pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid URL (max {MAX_URL_LEN} characters).")]
    Empty,
    #[error("Please enter a valid URL (max {MAX_URL_LEN} characters).")]
    TooLong { len: usize },
    #[error("Please enter a valid {platform} URL.")]
    PatternMismatch { platform: Platform },
}

/// Checks `url` against the length bound and the pattern registered for `platform`.
pub fn check(url: &str, platform: Platform) -> Result<(), ValidationError> {
    if url.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = url.chars().count();
    if len > MAX_URL_LEN {
        return Err(ValidationError::TooLong { len });
    }
    let pattern = match platform {
        Platform::Youtube => &*YOUTUBE,
        Platform::Instagram => &*INSTAGRAM,
        Platform::Spotify => &*SPOTIFY,
        Platform::Other => return Err(ValidationError::PatternMismatch { platform }),
    };
    if pattern.is_match(url) {
        Ok(())
    } else {
        Err(ValidationError::PatternMismatch { platform })
    }
}

pub fn validate(url: &str, platform: Platform) -> bool {
    check(url, platform).is_ok()
}
