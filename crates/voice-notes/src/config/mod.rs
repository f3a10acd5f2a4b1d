mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod logging_config;
mod storage_config;

pub(crate) use {
    audio_config::AudioConfig, config::Config, logging_config::LoggingConfig,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_LOG_FILTER: &str = "voice_notes=info,voice_notes_core=info";

pub(crate) fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
