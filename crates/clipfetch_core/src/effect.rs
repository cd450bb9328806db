use crate::{JobId, JobRequest};

/// Side effects requested by [`crate::update`]; the front end executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Connect the progress channel and subscribe to the session topic.
    OpenChannel { job_id: JobId },
    /// Issue the start call; the response is not awaited by the controller.
    StartJob { job_id: JobId, request: JobRequest },
    /// Best-effort remote cancellation.
    CancelJob { job_id: JobId },
    /// Unsubscribe and close the channel. Idempotent.
    CloseChannel { job_id: JobId },
    /// Fetch metadata and the artifact, save it, clean up remotely.
    Finalize {
        job_id: JobId,
        request: JobRequest,
        file_name: String,
    },
    Notify(Notice),
}

/// The single user-visible notice surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
    /// Metadata branch settled; `title` is `"Downloaded"` on fallback.
    Completed {
        title: String,
        thumbnail: Option<String>,
    },
    /// Artifact written locally.
    Saved { path: String },
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
            Notice::Completed { title, .. } => title,
            Notice::Saved { path } => path,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}
