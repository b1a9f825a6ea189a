use thiserror::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ApiEndpoint {
    RapidUpload,
    PutAttachment,
    DeleteAuthorization,
    SendEnvelope,
}

impl std::fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        use ApiEndpoint::*;
        match self {
            RapidUpload => write!(f, "rapid_upload"),
            PutAttachment => write!(f, "put_attachment"),
            DeleteAuthorization => write!(f, "delete_authorization"),
            SendEnvelope => write!(f, "send_envelope"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server could not be reached or dropped the connection.
    Transport,
    /// The server answered with a non-success status.
    Status(u16),
    /// The response body could not be understood.
    Malformed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Status(code) => write!(f, "status {code}"),
            ErrorKind::Malformed => write!(f, "malformed response"),
        }
    }
}

/// Error returned by a network client for one endpoint call.
#[derive(Debug, Error)]
#[error("{endpoint} failed ({kind}): {message}")]
pub struct Error {
    endpoint: ApiEndpoint,
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn new(endpoint: ApiEndpoint, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            kind,
            message: message.into(),
        }
    }

    pub fn endpoint(&self) -> ApiEndpoint {
        self.endpoint
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
