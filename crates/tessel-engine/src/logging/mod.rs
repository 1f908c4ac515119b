//! Logger installation on top of the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
