use std::sync::{mpsc, Arc};

use clipfetch_core::{Effect, MediaSummary, Msg, Notice, ProgressEvent};
use clipfetch_engine::{
    EngineConfig, EngineError, EngineEvent, EngineHandle, EventSink, MediaInfo, SessionId,
};
use clipfetch_logging::clip_info;

use super::app::AppInput;

/// Executes core effects against the engine and feeds engine events back
/// into the message loop.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        config: &EngineConfig,
        session: SessionId,
        input_tx: mpsc::Sender<AppInput>,
    ) -> Result<Self, EngineError> {
        let sink = Arc::new(MsgSink { tx: input_tx });
        let engine = EngineHandle::new(config, session, sink)?;
        engine.watch_interrupts();
        Ok(Self { engine })
    }

    /// Runs every effect; notices are handed back for display.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::OpenChannel { job_id } => self.engine.open_channel(job_id),
                Effect::StartJob { job_id, request } => {
                    clip_info!(
                        "StartJob job_id={} platform={} quality={} url={}",
                        job_id,
                        request.platform,
                        request.quality,
                        request.url
                    );
                    self.engine.start_job(job_id, to_engine_request(request));
                }
                Effect::CancelJob { job_id } => self.engine.cancel_job(job_id),
                Effect::CloseChannel { job_id } => self.engine.close_channel(job_id),
                Effect::Finalize {
                    job_id,
                    request,
                    file_name,
                } => {
                    self.engine
                        .finalize(job_id, to_engine_request(request), file_name);
                }
                Effect::Notify(notice) => notices.push(notice),
            }
        }
        notices
    }

    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

struct MsgSink {
    tx: mpsc::Sender<AppInput>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(map_event(event));
    }
}

fn map_event(event: EngineEvent) -> AppInput {
    let msg = match event {
        EngineEvent::ChannelConnected { job_id } => Msg::ChannelConnected { job_id },
        EngineEvent::ChannelFailed { job_id, message } => Msg::ChannelFailed {
            job_id,
            reason: message,
        },
        EngineEvent::ChannelLost { job_id, message } => Msg::ChannelLost {
            job_id,
            reason: message,
        },
        EngineEvent::Progress { job_id, event } => Msg::Progress {
            job_id,
            event: map_progress(event),
        },
        EngineEvent::StartFailed { job_id, message } => Msg::StartFailed {
            job_id,
            reason: message,
        },
        EngineEvent::MetadataSettled { job_id, info } => Msg::MetadataSettled {
            job_id,
            info: info.map(map_info),
        },
        EngineEvent::ArtifactSaved { job_id, path } => Msg::ArtifactSaved {
            job_id,
            path: path.display().to_string(),
        },
        EngineEvent::ArtifactFailed { job_id, message } => Msg::ArtifactFailed {
            job_id,
            reason: message,
        },
        EngineEvent::Interrupted => return AppInput::Interrupt,
    };
    AppInput::Core(msg)
}

fn map_progress(event: clipfetch_engine::ProgressEvent) -> ProgressEvent {
    match event {
        clipfetch_engine::ProgressEvent::Progress { percent } => ProgressEvent::Progress { percent },
        clipfetch_engine::ProgressEvent::Stage { label } => ProgressEvent::Stage { label },
        clipfetch_engine::ProgressEvent::Finished { file_name } => {
            ProgressEvent::Finished { file_name }
        }
        clipfetch_engine::ProgressEvent::Error { message } => ProgressEvent::Error { message },
        clipfetch_engine::ProgressEvent::Canceled => ProgressEvent::Canceled,
    }
}

fn map_info(info: MediaInfo) -> MediaSummary {
    MediaSummary {
        title: info.title,
        thumbnail: info.thumbnail,
    }
}

fn to_engine_request(request: clipfetch_core::JobRequest) -> clipfetch_engine::JobRequest {
    clipfetch_engine::JobRequest {
        url: request.url,
        quality: request.quality,
        platform: request.platform.as_str().to_string(),
        cookies: request.cookies,
    }
}
