use thiserror::Error;

#[derive(Error, Debug)]
pub enum TitheError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Spreadsheet write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Unknown member: {0}")]
    UnknownMember(String),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("Unknown batch: {0}")]
    UnknownBatch(String),

    #[error("Unknown fellowship: {0}")]
    UnknownFellowship(String),

    #[error("Unknown month: {0}")]
    UnknownMonth(String),

    #[error("Invalid week number: {0} (weeks start at 1)")]
    InvalidWeek(u32),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),

    #[error("Invalid denomination count: {0}")]
    InvalidCount(String),

    #[error("Batch {id} is {from}; cannot move to {to}")]
    InvalidTransition { id: String, from: String, to: String },

    #[error("Batch {id} is {status}; entries are frozen")]
    BatchNotOpen { id: String, status: String },

    #[error("Cannot finalize while variance exists: {0}")]
    Unbalanced(String),

    #[error("No active batch")]
    NoActiveBatch,

    #[error("Settings error: {0}")]
    Settings(String),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TitheError>;
