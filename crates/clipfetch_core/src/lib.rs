//! Clipfetch core: pure job lifecycle state machine, request validation and
//! view-model helpers. Nothing in here performs I/O.
mod effect;
mod event;
mod msg;
mod request;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::{Effect, Notice};
pub use event::ProgressEvent;
pub use msg::{MediaSummary, Msg};
pub use request::{JobRequest, Platform, DEFAULT_QUALITY, QUALITY_PRESETS};
pub use state::{AppState, JobId, JobState, RequestForm};
pub use update::update;
pub use validate::{check, validate, ValidationError, MAX_URL_LEN};
pub use view_model::AppViewModel;
