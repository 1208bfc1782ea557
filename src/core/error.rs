// Error handling for the console link

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No luminaire selected, command not sent")]
    MissingLuminaire,

    #[error("Missing argument for template '{template}', command not sent")]
    MissingArgument { template: String },

    #[error("Unknown command template #{0}")]
    UnknownTemplate(usize),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}
