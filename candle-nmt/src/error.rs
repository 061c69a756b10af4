/// Main library error type.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("num_workers must be at least 1")]
    NoWorkers,

    #[error("worker id {worker_id} out of range for {num_workers} workers")]
    WorkerIdOutOfRange {
        worker_id: usize,
        num_workers: usize,
    },

    #[error("inference indices cannot be combined with {num_workers} workers")]
    IndicesWithWorkers { num_workers: usize },

    #[error("inference index {index} out of range for corpus of {len} sentences")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("decode stream exhausted after {got} of {expected} indexed sentences")]
    EarlyExhaustion { got: usize, expected: usize },

    #[error("indexed decoding expects one sentence per batch, got {got}")]
    UnexpectedBatchSize { got: usize },

    #[error(transparent)]
    Candle(#[from] candle::Error),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Arbitrary errors wrapping.
    #[error(transparent)]
    Wrapped(#[from] Box<dyn std::error::Error + Send + Sync>),

    /// User generated error message, typically created via `bail!`.
    #[error("{0}")]
    Msg(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn wrap(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Wrapped(Box::new(err))
    }

    pub fn msg(err: impl std::fmt::Display) -> Self {
        Self::Msg(err.to_string())
    }
}

#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Msg(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::Error::Msg(format!($err)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Msg(format!($fmt, $($arg)*)))
    };
}
