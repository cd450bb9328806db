use clipfetch_core::{AppViewModel, Notice};

const BAR_WIDTH: usize = 24;

/// Text for the status line, or `None` when there is nothing to show.
pub fn status_line(view: &AppViewModel) -> Option<String> {
    let status = view.status.as_deref()?;
    Some(match view.progress_percent {
        Some(percent) => format!("{} {}", progress_bar(percent), status),
        None => status.to_string(),
    })
}

pub fn notice_line(notice: &Notice) -> String {
    match notice {
        Notice::Info(text) => text.clone(),
        Notice::Error(text) => format!("Error: {text}"),
        Notice::Completed {
            title,
            thumbnail: Some(thumbnail),
        } => format!("Completed: {title} ({thumbnail})"),
        Notice::Completed { title, .. } => format!("Completed: {title}"),
        Notice::Saved { path } => format!("Saved to {path}"),
    }
}

fn progress_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Remembers the last status line so unchanged renders print nothing.
#[derive(Default)]
pub struct StatusPrinter {
    last: Option<String>,
}

impl StatusPrinter {
    pub fn next_line(&mut self, view: &AppViewModel) -> Option<String> {
        let line = status_line(view);
        if line == self.last {
            return None;
        }
        self.last = line.clone();
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn view(status: Option<&str>, progress: Option<f64>) -> AppViewModel {
        AppViewModel {
            status: status.map(str::to_string),
            progress_percent: progress,
            ..AppViewModel::default()
        }
    }

    #[test]
    fn status_line_includes_bar_while_downloading() {
        let line = status_line(&view(Some("Downloading: 50%"), Some(50.0))).unwrap();
        assert_eq!(
            line,
            format!("[{}{}] Downloading: 50%", "#".repeat(12), "-".repeat(12))
        );
    }

    #[test]
    fn status_line_without_progress_is_plain() {
        assert_eq!(
            status_line(&view(Some("Connecting to server..."), None)).as_deref(),
            Some("Connecting to server...")
        );
        assert_eq!(status_line(&view(None, None)), None);
    }

    #[test]
    fn notices_render_one_line_each() {
        assert_eq!(
            notice_line(&Notice::Error("network timeout".to_string())),
            "Error: network timeout"
        );
        assert_eq!(
            notice_line(&Notice::Completed {
                title: "Downloaded".to_string(),
                thumbnail: None
            }),
            "Completed: Downloaded"
        );
        assert_eq!(
            notice_line(&Notice::Completed {
                title: "Clip".to_string(),
                thumbnail: Some("https://img/t.jpg".to_string())
            }),
            "Completed: Clip (https://img/t.jpg)"
        );
        assert_eq!(
            notice_line(&Notice::Saved {
                path: "downloads/clip.mp4".to_string()
            }),
            "Saved to downloads/clip.mp4"
        );
    }

    #[test]
    fn printer_skips_repeated_lines() {
        let mut printer = StatusPrinter::default();
        let connecting = view(Some("Connecting to server..."), None);
        assert!(printer.next_line(&connecting).is_some());
        assert!(printer.next_line(&connecting).is_none());
        assert!(printer
            .next_line(&view(Some("Downloading: 1%"), Some(1.0)))
            .is_some());
        assert!(printer.next_line(&view(None, None)).is_none());
    }
}
