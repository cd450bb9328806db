use std::sync::LazyLock;

use regex::Regex;

use crate::ProgressEvent;

const PROGRESS_PREFIX: &str = "Progress:";
const FINISHED_PREFIX: &str = "Download finished:";
const ERROR_PREFIX: &str = "Error:";
const CANCELED_LITERAL: &str = "Download canceled";
const DOWNLOAD_MARKER: &str = "[download]";

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+\.?[0-9]*)%").expect("percent pattern"));

/// Decode one raw channel frame. Total: unknown text becomes a `Stage`.
pub fn decode_frame(frame: &str) -> ProgressEvent {
    if let Some(rest) = frame.strip_prefix(PROGRESS_PREFIX) {
        let rest = rest.trim();
        if rest.starts_with(DOWNLOAD_MARKER) {
            if let Some(percent) = parse_percent(rest) {
                return ProgressEvent::Progress { percent };
            }
        }
        return ProgressEvent::Stage {
            label: rest.to_string(),
        };
    }
    if let Some(rest) = frame.strip_prefix(FINISHED_PREFIX) {
        return ProgressEvent::Finished {
            file_name: rest.trim().to_string(),
        };
    }
    if let Some(rest) = frame.strip_prefix(ERROR_PREFIX) {
        return ProgressEvent::Error {
            message: rest.trim().to_string(),
        };
    }
    if frame == CANCELED_LITERAL {
        return ProgressEvent::Canceled;
    }
    ProgressEvent::Stage {
        label: frame.trim().to_string(),
    }
}

fn parse_percent(text: &str) -> Option<f64> {
    PERCENT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|percent| percent.is_finite())
}
