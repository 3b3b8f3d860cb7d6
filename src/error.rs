use thiserror::Error;

/// Failure classes of a live voice session.
///
/// Everything here collapses to the `Error` session state for the caller;
/// the variants exist so logs and tests can tell the classes apart.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No API key was available at connect time. Fatal to the attempt,
    /// no transport connection is made.
    #[error("missing API key: set ARIA_API_KEY before connecting")]
    MissingCredential,

    /// The live transport reported a failure (connect, send, or protocol).
    #[error("transport error: {0}")]
    Transport(String),

    /// An inbound PCM chunk had an odd byte length and cannot be
    /// reinterpreted as 16-bit samples. Dropped, never fatal.
    #[error("malformed audio chunk: {len} bytes is not a whole number of 16-bit samples")]
    MalformedChunk { len: usize },

    /// The capture source could not be opened (missing device, denied
    /// permission, unreadable file).
    #[error("capture unavailable: {0}")]
    CaptureDenied(String),
}
