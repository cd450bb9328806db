use crate::{JobState, Platform};

/// Everything a presentation layer needs to draw the controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub job_state: JobState,
    pub progress_percent: Option<f64>,
    pub status: Option<String>,
    pub url: String,
    pub platform: Platform,
    pub quality: String,
    pub quality_enabled: bool,
    pub can_start: bool,
    pub can_cancel: bool,
    /// Artifact downloads still running after their job settled.
    pub transfers_pending: usize,
}
