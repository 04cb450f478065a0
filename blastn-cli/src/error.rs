//! Error handling for the blastn CLI

use thiserror::Error;
use std::path::PathBuf;

/// User-facing errors that come with suggestions
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input/Output error: {message}")]
    Io { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid sequence: {message}")]
    InvalidSequence { message: String },

    #[error("No sequences in {path}")]
    EmptyInput { path: PathBuf },
}

impl CliError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io { message: message.into() }
    }

    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    pub fn invalid_sequence<S: Into<String>>(message: S) -> Self {
        Self::InvalidSequence { message: message.into() }
    }

    pub fn empty_input(path: PathBuf) -> Self {
        Self::EmptyInput { path }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Fail with [`CliError::FileNotFound`] unless `path` exists.
pub fn require_file(path: &std::path::Path) -> CliResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CliError::file_not_found(path.to_path_buf()))
    }
}

/// Provide helpful error messages and suggestions
pub fn format_error_with_suggestions(error: &CliError) -> String {
    let mut message = error.to_string();

    match error {
        CliError::FileNotFound { path } => {
            message.push_str(&format!(
                "\n\nSuggestions:\n\
                 • Check that the file path is correct: {}\n\
                 • Ensure you have read permissions for the file\n\
                 • Compressed FASTA files need a .gz extension",
                path.display()
            ));
        }

        CliError::EmptyInput { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check that the file is FASTA (records start with '>') or FASTQ ('@')\n\
                 • Ensure the file is not truncated"
            );
        }

        CliError::InvalidSequence { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Sequences may only contain A, C, G and T\n\
                 • Lower-case bases are accepted and upper-cased"
            );
        }

        CliError::Config { .. } => {
            message.push_str(
                "\n\nSuggestions:\n\
                 • Check your blastn.toml configuration file\n\
                 • Use 'blastn config --example' to generate a sample configuration\n\
                 • The word length must be at least 1 and no longer than the query"
            );
        }

        CliError::Io { .. } => {}
    }

    message
}

/// Print error with helpful suggestions and exit
pub fn print_error_and_exit(error: &CliError) -> ! {
    eprintln!("Error: {}", format_error_with_suggestions(error));
    std::process::exit(1);
}
