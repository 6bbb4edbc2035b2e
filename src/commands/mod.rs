//! CLI commands for feedsim

pub mod calc_similarity;
pub mod dispatch;
pub mod format;
pub mod import;
pub mod init;
pub mod similar;
