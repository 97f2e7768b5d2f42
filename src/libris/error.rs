use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibrisError {
    #[error("No item matches {0}")]
    NotFound(String),

    #[error("{borrower} does not hold a copy of \"{title}\"")]
    NotHeldByBorrower { borrower: String, title: String },

    #[error("{borrower} already holds a copy of \"{title}\"")]
    AlreadyHeld { borrower: String, title: String },

    #[error("No copies of \"{0}\" are available")]
    NoCopiesAvailable(String),

    #[error("No borrowed item matches \"{0}\"")]
    NotBorrowed(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Invalid borrower name: {0}")]
    InvalidBorrower(String),

    #[error("Quantity out of range: {0}")]
    QuantityOutOfRange(String),

    #[error("\"{title}\" still has {borrowed} copy(ies) on loan")]
    InProgress { title: String, borrowed: u32 },

    #[error("Title already in use: \"{0}\"")]
    TitleTaken(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LibrisError>;
