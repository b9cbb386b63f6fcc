// Event types for async communication

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A fragment of streamed response text
    ResponseFragment(String),
    /// The current response finished streaming
    ResponseComplete,
    /// The request or stream read failed
    ResponseFailed(String),
}
