//! Clipfetch engine: service I/O and effect execution.
mod api;
mod channel;
mod config;
mod decode;
mod engine;
mod filename;
mod finalize;
mod identity;
mod persist;
mod stomp;
mod types;

pub use api::{ApiError, ReqwestServiceApi, ServiceApi};
pub use channel::{ChannelError, ChannelSettings, ProgressChannel, SESSION_HEADER};
pub use config::{channel_url_for, EngineConfig};
pub use decode::decode_frame;
pub use engine::{ChannelEventSink, EngineError, EngineHandle, EventSink};
pub use filename::safe_file_name;
pub use finalize::Finalizer;
pub use identity::{IdentityError, SessionId, SessionStore};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use stomp::{StompError, StompFrame};
pub use types::{EngineEvent, JobId, JobRequest, MediaInfo, ProgressEvent};
