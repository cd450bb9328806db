use std::path::PathBuf;
use std::sync::Arc;

use clipfetch_logging::{clip_debug, clip_info, clip_warn};

use crate::{
    safe_file_name, AtomicFileWriter, EngineEvent, EventSink, JobId, JobRequest, ServiceApi,
};

/// Runs the two independent branches that follow a finished job:
/// the metadata lookup and the artifact transfer.
///
/// Each branch reports exactly one event. Neither waits on nor cancels the
/// other.
pub struct Finalizer {
    api: Arc<dyn ServiceApi>,
    writer: AtomicFileWriter,
    sink: Arc<dyn EventSink>,
}

impl Finalizer {
    pub fn new(api: Arc<dyn ServiceApi>, writer: AtomicFileWriter, sink: Arc<dyn EventSink>) -> Self {
        Self { api, writer, sink }
    }

    pub async fn run(&self, job_id: JobId, request: &JobRequest, file_name: &str) {
        tokio::join!(
            self.settle_metadata(job_id, request),
            self.transfer_artifact(job_id, file_name),
        );
    }

    async fn settle_metadata(&self, job_id: JobId, request: &JobRequest) {
        let info = match self.api.media_info(request).await {
            Ok(info) => Some(info),
            Err(err) => {
                clip_warn!("Job {} metadata lookup failed: {}", job_id, err);
                None
            }
        };
        self.sink.emit(EngineEvent::MetadataSettled { job_id, info });
    }

    async fn transfer_artifact(&self, job_id: JobId, file_name: &str) {
        match self.save_artifact(file_name).await {
            Ok(path) => {
                clip_info!("Job {} saved {:?}", job_id, path);
                // Only after a successful save; failures leave the server copy alone.
                // Reported after cleanup settles; callers may shut down on it.
                match self.api.cleanup(file_name).await {
                    Ok(()) => clip_debug!("Cleaned up {} on the server", file_name),
                    Err(err) => clip_warn!("Cleanup of {} failed: {}", file_name, err),
                }
                self.sink.emit(EngineEvent::ArtifactSaved { job_id, path });
            }
            Err(message) => {
                clip_warn!("Job {} artifact {} failed: {}", job_id, file_name, message);
                self.sink
                    .emit(EngineEvent::ArtifactFailed { job_id, message });
            }
        }
    }

    async fn save_artifact(&self, file_name: &str) -> Result<PathBuf, String> {
        let bytes = self
            .api
            .fetch_artifact(file_name)
            .await
            .map_err(|err| err.to_string())?;
        clip_debug!("Fetched {} ({} bytes)", file_name, bytes.len());

        let writer = self.writer.clone();
        let local_name = safe_file_name(file_name);
        tokio::task::spawn_blocking(move || writer.write(&local_name, &bytes))
            .await
            .map_err(|err| err.to_string())?
            .map_err(|err| err.to_string())
    }
}
