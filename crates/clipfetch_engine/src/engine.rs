use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clipfetch_logging::{clip_debug, clip_warn};
use thiserror::Error;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    decode_frame, ApiError, AtomicFileWriter, ChannelSettings, EngineConfig, EngineEvent,
    Finalizer, JobId, JobRequest, ProgressChannel, ReqwestServiceApi, ServiceApi, SessionId,
};

const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Receives everything the engine reports. Called from runtime worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build the service client: {0}")]
    Api(#[from] ApiError),
}

enum EngineCommand {
    OpenChannel {
        job_id: JobId,
    },
    StartJob {
        job_id: JobId,
        request: JobRequest,
    },
    CancelJob {
        job_id: JobId,
    },
    CloseChannel {
        job_id: JobId,
    },
    Finalize {
        job_id: JobId,
        request: JobRequest,
        file_name: String,
    },
    WatchInterrupts,
}

struct Shared {
    api: Arc<dyn ServiceApi>,
    session: SessionId,
    channel: ChannelSettings,
    finalizer: Arc<Finalizer>,
    sink: Arc<dyn EventSink>,
}

struct ActiveChannel {
    job_id: JobId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the async runtime on a dedicated thread and executes commands in
/// the order they are issued.
///
/// At most one progress channel is open at a time. Opening a new one tears
/// down the previous one.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        config: &EngineConfig,
        session: SessionId,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let api = ReqwestServiceApi::new(
            config.server_url.clone(),
            config.connect_timeout,
            config.request_timeout,
        )?;
        Self::with_api(config, session, Arc::new(api), sink)
    }

    /// Same as [`EngineHandle::new`] with a caller-supplied service client.
    pub fn with_api(
        config: &EngineConfig,
        session: SessionId,
        api: Arc<dyn ServiceApi>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let runtime = Runtime::new()?;
        let writer = AtomicFileWriter::new(config.download_dir.clone());
        let shared = Arc::new(Shared {
            finalizer: Arc::new(Finalizer::new(api.clone(), writer, sink.clone())),
            api,
            session,
            channel: config.channel_settings(),
            sink,
        });

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let worker = thread::spawn(move || dispatch(runtime, cmd_rx, shared));

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            worker: Some(worker),
        })
    }

    pub fn open_channel(&self, job_id: JobId) {
        self.send(EngineCommand::OpenChannel { job_id });
    }

    pub fn start_job(&self, job_id: JobId, request: JobRequest) {
        self.send(EngineCommand::StartJob { job_id, request });
    }

    pub fn cancel_job(&self, job_id: JobId) {
        self.send(EngineCommand::CancelJob { job_id });
    }

    pub fn close_channel(&self, job_id: JobId) {
        self.send(EngineCommand::CloseChannel { job_id });
    }

    pub fn finalize(&self, job_id: JobId, request: JobRequest, file_name: impl Into<String>) {
        self.send(EngineCommand::Finalize {
            job_id,
            request,
            file_name: file_name.into(),
        });
    }

    /// Report every Ctrl-C as [`EngineEvent::Interrupted`] instead of terminating.
    pub fn watch_interrupts(&self) {
        self.send(EngineCommand::WatchInterrupts);
    }

    /// Close any open channel and stop the runtime. In-flight requests are dropped.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn send(&self, command: EngineCommand) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(command);
        }
    }

    fn stop(&mut self) {
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                clip_warn!("Engine worker panicked");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn dispatch(runtime: Runtime, cmd_rx: mpsc::Receiver<EngineCommand>, shared: Arc<Shared>) {
    let mut active: Option<ActiveChannel> = None;

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::OpenChannel { job_id } => {
                if let Some(previous) = active.take() {
                    clip_debug!("Replacing channel of job {}", previous.job_id);
                    previous.cancel.cancel();
                }
                let cancel = CancellationToken::new();
                let task = runtime.spawn(run_channel(job_id, shared.clone(), cancel.clone()));
                active = Some(ActiveChannel {
                    job_id,
                    cancel,
                    task,
                });
            }
            EngineCommand::CloseChannel { job_id } => {
                if active.as_ref().is_some_and(|channel| channel.job_id == job_id) {
                    if let Some(channel) = active.take() {
                        channel.cancel.cancel();
                    }
                }
            }
            EngineCommand::StartJob { job_id, request } => {
                let shared = shared.clone();
                runtime.spawn(async move { start_job(job_id, &request, &shared).await });
            }
            EngineCommand::CancelJob { job_id } => {
                let shared = shared.clone();
                runtime.spawn(async move {
                    match shared.api.cancel_job(&shared.session).await {
                        Ok(()) => clip_debug!("Cancel of job {} acknowledged", job_id),
                        Err(err) => clip_warn!("Cancel request for job {} failed: {}", job_id, err),
                    }
                });
            }
            EngineCommand::Finalize {
                job_id,
                request,
                file_name,
            } => {
                let finalizer = shared.finalizer.clone();
                runtime.spawn(async move { finalizer.run(job_id, &request, &file_name).await });
            }
            EngineCommand::WatchInterrupts => {
                let sink = shared.sink.clone();
                runtime.spawn(async move {
                    while tokio::signal::ctrl_c().await.is_ok() {
                        sink.emit(EngineEvent::Interrupted);
                    }
                });
            }
        }
    }

    // Handle dropped: give an open channel the chance to say goodbye.
    if let Some(channel) = active.take() {
        channel.cancel.cancel();
        runtime.block_on(async {
            let _ = tokio::time::timeout(CLOSE_GRACE, channel.task).await;
        });
    }
}

async fn start_job(job_id: JobId, request: &JobRequest, shared: &Shared) {
    match shared.api.start_job(&shared.session, request).await {
        Ok(()) => clip_debug!("Job {} accepted", job_id),
        // The outcome is expected on the channel either way.
        Err(err) if !err.is_transport() => {
            clip_warn!("Start call for job {} answered with {}", job_id, err)
        }
        Err(err) => shared.sink.emit(EngineEvent::StartFailed {
            job_id,
            message: err.to_string(),
        }),
    }
}

async fn run_channel(job_id: JobId, shared: Arc<Shared>, cancel: CancellationToken) {
    let sink = &shared.sink;
    let connected = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = ProgressChannel::connect(&shared.channel, &shared.session) => result,
    };
    let mut channel = match connected {
        Ok(channel) => channel,
        Err(err) => {
            sink.emit(EngineEvent::ChannelFailed {
                job_id,
                message: err.to_string(),
            });
            return;
        }
    };

    if let Err(err) = channel.subscribe(&shared.channel.topic).await {
        channel.close().await;
        sink.emit(EngineEvent::ChannelFailed {
            job_id,
            message: err.to_string(),
        });
        return;
    }
    sink.emit(EngineEvent::ChannelConnected { job_id });

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = channel.next_message() => match next {
                Ok(Some(body)) => {
                    clip_debug!("Job {} frame: {}", job_id, body);
                    sink.emit(EngineEvent::Progress {
                        job_id,
                        event: decode_frame(&body),
                    });
                }
                Ok(None) => {
                    sink.emit(EngineEvent::ChannelLost {
                        job_id,
                        message: "connection closed by server".to_string(),
                    });
                    break;
                }
                Err(err) => {
                    sink.emit(EngineEvent::ChannelLost {
                        job_id,
                        message: err.to_string(),
                    });
                    break;
                }
            },
        }
    }
    channel.close().await;
}
