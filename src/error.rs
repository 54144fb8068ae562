use plotters::drawing::DrawingAreaErrorKind;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("usage: {0}")]
    Usage(String),

    #[error("cannot decode input: {0}")]
    Decode(String),

    #[error("{record} object is missing required field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("trial series lengths differ within one round \
        ( expected length: {expected}, found: {found} )")]
    RaggedSeries { expected: usize, found: usize },

    #[error("window of {window} ticks does not fit a series of {len} samples")]
    InvalidWindow { window: usize, len: usize },

    #[error("rounds disagree on the time step ( first round: {expected}, found: {found} )")]
    NonUniformDt { expected: f64, found: f64 },

    #[error("invalid fit input: {0}")]
    InvalidFitInput(String),

    #[error("figure rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// lets plot code use `?` on every chart call
impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for Error {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Error::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
