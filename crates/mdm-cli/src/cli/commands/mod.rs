//! CLI command handlers, one file per subcommand.

mod config;
mod download;
mod dump;
mod info;

pub use config::run_config;
pub use download::{run_download, DownloadArgs};
pub use dump::run_dump;
pub use info::run_info;
