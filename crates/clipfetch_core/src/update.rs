use crate::{
    check, AppState, Effect, JobId, JobRequest, JobState, MediaSummary, Msg, Notice,
    ProgressEvent,
};

const ALREADY_RUNNING: &str = "A download is already in progress.";
const CANCELED: &str = "Download canceled successfully.";
const CONNECTED: &str = "Connected. Processing...";
const EMPTY_COMPLETION: &str = "Server reported completion without a file name";
const FALLBACK_TITLE: &str = "Downloaded";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(text) => {
            state.form_mut().url = text;
            Vec::new()
        }
        Msg::PlatformSelected(platform) => {
            if state.job_state().is_idle() {
                state.form_mut().platform = platform;
            }
            Vec::new()
        }
        Msg::QualitySelected(quality) => {
            if state.job_state().is_idle() {
                state.form_mut().quality = quality;
            }
            Vec::new()
        }
        Msg::CookiesChanged(cookies) => {
            if state.job_state().is_idle() {
                state.form_mut().cookies = cookies;
            }
            Vec::new()
        }
        Msg::StartClicked => start_job(&mut state),
        Msg::CancelClicked => cancel_job(&mut state),
        Msg::ChannelConnected { job_id } => {
            if state.job_state() != JobState::AwaitingConnection {
                return (state, Vec::new());
            }
            let Some(request) = state.current_request(job_id).cloned() else {
                return (state, Vec::new());
            };
            state.transition(JobState::Subscribed);
            state.transition(JobState::Running);
            state.set_status(CONNECTED);
            vec![Effect::StartJob { job_id, request }]
        }
        Msg::ChannelFailed { job_id, reason } => {
            if state.is_current(job_id) && state.job_state() == JobState::AwaitingConnection {
                fail(&mut state, job_id, format!("Connection error: {reason}"))
            } else {
                Vec::new()
            }
        }
        Msg::ChannelLost { job_id, reason } => {
            if state.is_current(job_id) && is_streaming(state.job_state()) {
                fail(&mut state, job_id, format!("Connection error: {reason}"))
            } else {
                Vec::new()
            }
        }
        Msg::StartFailed { job_id, reason } => {
            if state.is_current(job_id) && is_streaming(state.job_state()) {
                fail(&mut state, job_id, format!("Failed to start download: {reason}"))
            } else {
                Vec::new()
            }
        }
        Msg::Progress { job_id, event } => {
            // Only the first terminal event of the active attempt is honoured.
            if !state.is_current(job_id) || state.job_state() != JobState::Running {
                return (state, Vec::new());
            }
            apply_event(&mut state, job_id, event)
        }
        Msg::MetadataSettled { job_id, info } => {
            if state.is_current(job_id) && state.job_state() == JobState::Finalizing {
                state.reset();
                vec![Effect::Notify(completed_notice(info))]
            } else {
                Vec::new()
            }
        }
        Msg::ArtifactSaved { path, .. } => {
            state.finish_transfer();
            vec![Effect::Notify(Notice::Saved { path })]
        }
        Msg::ArtifactFailed { reason, .. } => {
            state.finish_transfer();
            vec![Effect::Notify(Notice::Error(format!(
                "Error triggering download: {reason}"
            )))]
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_job(state: &mut AppState) -> Vec<Effect> {
    // Single flight: no queueing, no second job.
    if !state.job_state().is_idle() {
        return vec![Effect::Notify(Notice::Info(ALREADY_RUNNING.to_string()))];
    }

    let form = state.form();
    let url = form.url.trim();
    if let Err(err) = check(url, form.platform) {
        return vec![Effect::Notify(Notice::Error(err.to_string()))];
    }

    let request = JobRequest::new(url, form.platform, &form.quality, &form.cookies);
    let job_id = state.begin_job(request);
    vec![Effect::OpenChannel { job_id }]
}

fn cancel_job(state: &mut AppState) -> Vec<Effect> {
    let Some(job_id) = state.active_job_id() else {
        return Vec::new();
    };

    // Local state resets before the remote side acknowledges anything.
    state.reset();
    vec![
        Effect::Notify(Notice::Info(CANCELED.to_string())),
        Effect::CancelJob { job_id },
        Effect::CloseChannel { job_id },
    ]
}

fn apply_event(state: &mut AppState, job_id: JobId, event: ProgressEvent) -> Vec<Effect> {
    match event {
        ProgressEvent::Progress { percent } => {
            let percent = percent.clamp(0.0, 100.0);
            state.set_progress(percent);
            state.set_status(format!("Downloading: {percent}%"));
            Vec::new()
        }
        ProgressEvent::Stage { label } => {
            state.set_status(format!("Processing: {label}"));
            Vec::new()
        }
        ProgressEvent::Finished { file_name } if file_name.is_empty() => {
            fail(state, job_id, EMPTY_COMPLETION.to_string())
        }
        ProgressEvent::Finished { file_name } => {
            let Some(request) = state.current_request(job_id).cloned() else {
                return Vec::new();
            };
            state.transition(JobState::Finalizing);
            state.clear_progress();
            state.begin_transfer();
            vec![
                Effect::Finalize {
                    job_id,
                    request,
                    file_name,
                },
                Effect::CloseChannel { job_id },
            ]
        }
        ProgressEvent::Error { message } => fail(state, job_id, message),
        ProgressEvent::Canceled => {
            state.reset();
            vec![
                Effect::Notify(Notice::Info(CANCELED.to_string())),
                Effect::CloseChannel { job_id },
            ]
        }
    }
}

/// Resets to `Idle`, surfaces `message` and tears the channel down.
fn fail(state: &mut AppState, job_id: JobId, message: String) -> Vec<Effect> {
    state.reset();
    vec![
        Effect::Notify(Notice::Error(message)),
        Effect::CloseChannel { job_id },
    ]
}

fn is_streaming(job_state: JobState) -> bool {
    matches!(job_state, JobState::Subscribed | JobState::Running)
}

fn completed_notice(info: Option<MediaSummary>) -> Notice {
    let info = info.unwrap_or_default();
    let title = info
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());
    Notice::Completed {
        title,
        thumbnail: info.thumbnail.filter(|url| !url.is_empty()),
    }
}
