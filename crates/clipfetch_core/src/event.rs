/// A decoded progress-channel frame.
///
/// Percentages are not guaranteed to be monotonic.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Progress { percent: f64 },
    Stage { label: String },
    Finished { file_name: String },
    Error { message: String },
    Canceled,
}
