use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type SirResult<T> = Result<T, SirError>;
pub type ModelResult<T> = SirResult<T>;
pub type SynthesisResult<T> = SirResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SirErrorCategory {
    ParseError,
    ShapeError,
    FitError,
    EngineError,
    IoSystemError,
}

impl SirErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ParseError => 2,
            Self::ShapeError => 3,
            Self::FitError => 4,
            Self::EngineError => 5,
            Self::IoSystemError => 6,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParseError => "ParseError",
            Self::ShapeError => "ShapeError",
            Self::FitError => "FitError",
            Self::EngineError => "EngineError",
            Self::IoSystemError => "IoSystemError",
        }
    }
}

impl Display for SirErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Error surfaced to callers of the model and synthesis layers.
///
/// `placeholder` is a stable dotted code (`SHAPE.MODEL_COLUMNS`, ...) that
/// callers can match on without parsing the message.
#[derive(Debug, Clone)]
pub struct SirError {
    category: SirErrorCategory,
    placeholder: &'static str,
    message: String,
    source: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

impl SirError {
    pub fn new(
        category: SirErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
            source: None,
        }
    }

    pub fn parse(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SirErrorCategory::ParseError, placeholder, message)
    }

    pub fn shape(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SirErrorCategory::ShapeError, placeholder, message)
    }

    pub fn fit(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SirErrorCategory::FitError, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(SirErrorCategory::IoSystemError, placeholder, message)
    }

    /// Wraps an engine failure without rewriting its message.
    pub fn engine<E>(placeholder: &'static str, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            category: SirErrorCategory::EngineError,
            placeholder,
            message: source.to_string(),
            source: Some(Arc::new(source)),
        }
    }

    pub const fn category(&self) -> SirErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for SirError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category, self.placeholder, self.message
        )
    }
}

impl Error for SirError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn Error + 'static))
    }
}
