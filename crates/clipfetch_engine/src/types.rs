use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub type JobId = u64;

/// A decoded progress frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress { percent: f64 },
    Stage { label: String },
    Finished { file_name: String },
    Error { message: String },
    Canceled,
}

/// Body of the start call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequest {
    pub url: String,
    pub quality: String,
    pub platform: String,
    pub cookies: String,
}

/// Display metadata returned by the info endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ChannelConnected { job_id: JobId },
    ChannelFailed { job_id: JobId, message: String },
    ChannelLost { job_id: JobId, message: String },
    Progress { job_id: JobId, event: ProgressEvent },
    StartFailed { job_id: JobId, message: String },
    /// `info` is `None` when the lookup failed for any reason.
    MetadataSettled {
        job_id: JobId,
        info: Option<MediaInfo>,
    },
    ArtifactSaved { job_id: JobId, path: PathBuf },
    ArtifactFailed { job_id: JobId, message: String },
    /// The user pressed Ctrl-C.
    Interrupted,
}
