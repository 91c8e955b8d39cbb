use ulid::Ulid;

#[derive(Debug)]
pub enum EngineError {
    /// Caller lacks the role or unit binding the operation requires.
    Unauthorized(&'static str),
    /// Malformed interval or input.
    Validation(&'static str),
    /// Candidate interval overlaps the named existing agenda.
    Conflict(Ulid),
    NotFound(Ulid),
    AlreadyExists(Ulid),
    LimitExceeded(&'static str),
    WalError(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            EngineError::Validation(msg) => write!(f, "invalid request: {msg}"),
            EngineError::Conflict(id) => write!(f, "conflict with agenda: {id}"),
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::AlreadyExists(id) => write!(f, "already exists: {id}"),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::WalError(e) => write!(f, "WAL error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
