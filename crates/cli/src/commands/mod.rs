//! Command implementations.
//!
//! Each submodule drives one area of the storefront client. Commands write
//! their results to stdout and log diagnostics through `tracing`.

use avira_vastra_storefront::AppError;
use avira_vastra_storefront::api::ApiError;
use avira_vastra_storefront::checkout::CheckoutError;
use avira_vastra_storefront::config::ConfigError;
use avira_vastra_storefront::navigation::{Navigation, Notice, NoticeLevel};
use thiserror::Error;

/// Write one line to stdout.
macro_rules! say {
    ($($arg:tt)*) => {{
        use std::io::Write as _;
        writeln!(std::io::stdout().lock(), $($arg)*)?;
    }};
}
pub(crate) use say;

pub mod account;
pub mod admin;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod products;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The storefront client failed.
    #[error("{}", .0.user_message())]
    App(#[from] AppError),

    /// The request was refused with a notice for the user.
    #[error("{0}")]
    Refused(Notice),

    /// Writing output or reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ApiError> for CliError {
    fn from(e: ApiError) -> Self {
        Self::App(e.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::App(e.into())
    }
}

impl From<CheckoutError> for CliError {
    fn from(e: CheckoutError) -> Self {
        Self::App(e.into())
    }
}

/// Result type for commands.
pub type CommandResult = Result<(), CliError>;

/// Print a notice with a level marker.
pub(crate) fn print_notice(notice: &Notice) -> CommandResult {
    let marker = match notice.level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
        NoticeLevel::Info => "info",
    };
    say!("[{marker}] {notice}");
    Ok(())
}

/// Print where the client would go next.
pub(crate) fn print_navigation(navigation: &Navigation) -> CommandResult {
    if let Some(notice) = &navigation.notice {
        print_notice(notice)?;
    }
    say!("-> {}", navigation.route);
    Ok(())
}
