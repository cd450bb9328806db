use crate::view_model::AppViewModel;
use crate::{JobRequest, Platform, DEFAULT_QUALITY};

/// Identifies one start attempt. Events tagged with a stale id are dropped.
pub type JobId = u64;

/// Lifecycle of the single in-flight job. Terminal transitions fold back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    AwaitingConnection,
    Subscribed,
    Running,
    Finalizing,
}

impl JobState {
    pub fn is_idle(self) -> bool {
        self == JobState::Idle
    }
}

/// Current contents of the request form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestForm {
    pub url: String,
    pub platform: Platform,
    pub quality: String,
    pub cookies: String,
}

impl Default for RequestForm {
    fn default() -> Self {
        Self {
            url: String::new(),
            platform: Platform::default(),
            quality: DEFAULT_QUALITY.to_string(),
            cookies: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveJob {
    job_id: JobId,
    request: JobRequest,
}

/// Controller state. Only [`crate::update`] mutates it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    form: RequestForm,
    job_state: JobState,
    active: Option<ActiveJob>,
    last_job_id: JobId,
    progress: Option<f64>,
    status: Option<String>,
    transfers_pending: usize,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let idle = self.job_state.is_idle();
        AppViewModel {
            job_state: self.job_state,
            progress_percent: self.progress,
            status: self.status.clone(),
            url: self.form.url.clone(),
            platform: self.form.platform,
            quality: self.form.quality.clone(),
            quality_enabled: idle && self.form.platform.supports_quality(),
            can_start: idle,
            can_cancel: !idle,
            transfers_pending: self.transfers_pending,
        }
    }

    pub fn job_state(&self) -> JobState {
        self.job_state
    }

    pub fn form(&self) -> &RequestForm {
        &self.form
    }

    /// Id of the active attempt, if any.
    pub fn active_job_id(&self) -> Option<JobId> {
        self.active.as_ref().map(|job| job.job_id)
    }

    /// Returns true once after any visible change.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn form_mut(&mut self) -> &mut RequestForm {
        self.dirty = true;
        &mut self.form
    }

    pub(crate) fn is_current(&self, job_id: JobId) -> bool {
        self.active_job_id() == Some(job_id)
    }

    pub(crate) fn current_request(&self, job_id: JobId) -> Option<&JobRequest> {
        self.active
            .as_ref()
            .filter(|job| job.job_id == job_id)
            .map(|job| &job.request)
    }

    pub(crate) fn begin_job(&mut self, request: JobRequest) -> JobId {
        self.last_job_id += 1;
        let job_id = self.last_job_id;
        self.active = Some(ActiveJob { job_id, request });
        self.job_state = JobState::AwaitingConnection;
        self.progress = None;
        self.status = Some("Connecting to server...".to_string());
        self.dirty = true;
        job_id
    }

    pub(crate) fn transition(&mut self, to: JobState) {
        self.job_state = to;
        self.dirty = true;
    }

    /// Folds any state back to `Idle` and clears progress indicators.
    pub(crate) fn reset(&mut self) {
        self.job_state = JobState::Idle;
        self.active = None;
        self.progress = None;
        self.status = None;
        self.dirty = true;
    }

    pub(crate) fn set_progress(&mut self, percent: f64) {
        self.progress = Some(percent);
        self.dirty = true;
    }

    pub(crate) fn clear_progress(&mut self) {
        self.progress = None;
        self.status = None;
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
        self.dirty = true;
    }

    pub(crate) fn begin_transfer(&mut self) {
        self.transfers_pending += 1;
        self.dirty = true;
    }

    pub(crate) fn finish_transfer(&mut self) {
        self.transfers_pending = self.transfers_pending.saturating_sub(1);
        self.dirty = true;
    }
}
