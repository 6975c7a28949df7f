//! CLI error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Generator(#[from] dragon_gen::Error),
    #[error("Failed to set signal handler: {0}")]
    SignalHandler(#[from] ctrlc::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Report on stderr and exit with a failure code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {self}");
        std::process::exit(1)
    }
}
