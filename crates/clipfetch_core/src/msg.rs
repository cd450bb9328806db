use crate::{JobId, Platform, ProgressEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the URL field.
    UrlChanged(String),
    /// User picked a platform. Ignored while a job is active.
    PlatformSelected(Platform),
    /// User picked a quality preset. Ignored while a job is active.
    QualitySelected(String),
    /// User edited the cookies field. Ignored while a job is active.
    CookiesChanged(String),
    /// User asked to start a job with the current form.
    StartClicked,
    /// User asked to cancel the active job.
    CancelClicked,
    /// Channel connected and the session topic is subscribed.
    ChannelConnected { job_id: JobId },
    /// Channel could not be opened.
    ChannelFailed { job_id: JobId, reason: String },
    /// An established channel dropped.
    ChannelLost { job_id: JobId, reason: String },
    /// Transport failure on the start call.
    StartFailed { job_id: JobId, reason: String },
    /// A decoded frame from the channel.
    Progress { job_id: JobId, event: ProgressEvent },
    /// Metadata branch of the finalizer settled. `None` means lookup failed.
    MetadataSettled {
        job_id: JobId,
        info: Option<MediaSummary>,
    },
    /// Artifact branch saved the file locally.
    ArtifactSaved { job_id: JobId, path: String },
    /// Artifact branch failed to fetch or save.
    ArtifactFailed { job_id: JobId, reason: String },
    /// Render tick.
    Tick,
    NoOp,
}

/// Display metadata for a finished job.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaSummary {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}
