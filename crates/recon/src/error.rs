use std::fmt;

#[derive(Debug)]
pub enum StockError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty file name, zero sample limit, etc.).
    ConfigValidation(String),
    /// Missing required column in an input dataset.
    MissingColumn { source: String, column: String },
    /// Malformed CSV record in an input dataset.
    Csv { source: String, message: String },
    /// Input file could not be read.
    Io(String),
}

impl fmt::Display for StockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { source, column } => {
                write!(f, "{source}: missing column '{column}'")
            }
            Self::Csv { source, message } => write!(f, "{source}: malformed CSV: {message}"),
            Self::Io(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StockError {}
