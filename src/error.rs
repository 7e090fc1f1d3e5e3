/// Failure class of an [`AppError`].
///
/// The kind decides the process exit code and lets front-ends tell a broken
/// stage ("no data") apart from a broken session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid flags, environment, or derived configuration.
    Config,
    /// Local file could not be read or written.
    Io,
    /// Network or upstream API failure.
    Fetch,
    /// Malformed record or payload.
    Parse,
    /// The selected window contains no observations.
    WindowEmpty,
    /// The forecasting model could not be fitted.
    ModelFit,
    /// Terminal setup/draw failure in the dashboard.
    Terminal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config | ErrorKind::Io => 2,
            ErrorKind::WindowEmpty => 3,
            ErrorKind::Fetch | ErrorKind::Parse | ErrorKind::Terminal => 4,
            ErrorKind::ModelFit => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Config => "config error",
            ErrorKind::Io => "io error",
            ErrorKind::Fetch => "fetch error",
            ErrorKind::Parse => "parse error",
            ErrorKind::WindowEmpty => "empty window",
            ErrorKind::ModelFit => "model fit error",
            ErrorKind::Terminal => "terminal error",
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn window_empty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WindowEmpty, message)
    }

    pub fn model_fit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ModelFit, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::config("x").exit_code(), 2);
        assert_eq!(AppError::window_empty("x").exit_code(), 3);
        assert_eq!(AppError::fetch("x").exit_code(), 4);
        assert_eq!(AppError::model_fit("x").exit_code(), 5);
    }

    #[test]
    fn display_includes_kind_label() {
        let err = AppError::parse("bad row");
        assert_eq!(err.to_string(), "parse error: bad row");
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
