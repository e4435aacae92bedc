use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

use model::ModelErr;

pub type Result<T> = std::result::Result<T, AppErr>;

/// All errors that can occur while loading records or preparing a run.
#[derive(Debug)]
pub enum AppErr {
    /// Reading or writing the record storage failed.
    Io { path: PathBuf, source: io::Error },
    /// A record file couldn't be encoded or decoded.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// An environment variable holds an unusable value.
    Config(String),
    /// The model rejected its configuration or the training data.
    Model(ModelErr),
}

impl AppErr {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for AppErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error on {}: {source}", path.display()),
            Self::Json { path, source } => {
                write!(f, "json error on {}: {source}", path.display())
            }
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
            Self::Model(err) => write!(f, "model error: {err}"),
        }
    }
}

impl Error for AppErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Model(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<ModelErr> for AppErr {
    fn from(value: ModelErr) -> Self {
        Self::Model(value)
    }
}
