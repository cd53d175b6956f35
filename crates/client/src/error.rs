use thiserror::Error;

/// Failures talking to the identity endpoints.
///
/// The resolver folds every one of these into "no active session" for the
/// route guards; only login and registration surface them to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Transport failure (connect, timeout, TLS).
    #[error("network failure: {0}")]
    Network(String),

    /// The server does not recognise the session (HTTP 401).
    #[error("not authenticated")]
    Unauthorized,

    /// The server answered, but not in a shape we understand.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The server refused the request; `message` is meant for the user.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Login was accepted but the follow-up identity check found no session.
    #[error("session could not be established")]
    NoSession,
}

impl SessionError {
    /// Message suitable for showing next to a form.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Rejected { message, .. } => message.clone(),
            SessionError::Network(_) => "Unable to reach the server. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SessionError::Malformed(err.to_string())
        } else if err.is_timeout() {
            SessionError::Network(format!("request timed out: {err}"))
        } else {
            SessionError::Network(err.to_string())
        }
    }
}
