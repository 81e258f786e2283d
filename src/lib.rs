pub mod api;
pub mod core;

use log::LevelFilter;

pub use crate::core::{DatasetConfig, DatasetError, DatasetItem, WlaslDataset};

pub fn init_logging() {
    init_logging_with(LevelFilter::Info);
}

/// Installs `env_logger` once; later calls are no-ops. `RUST_LOG` overrides
/// `default_level`.
pub fn init_logging_with(default_level: LevelFilter) {
    let env = env_logger::Env::default().default_filter_or(default_level.to_string());
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
