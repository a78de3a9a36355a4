use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// Engine tuning knobs.
///
/// The configuration can be loaded from multiple locations in order of
/// precedence:
/// 1. Custom config file passed to [`EngineConfig::load_from`]
/// 2. Local `.grepview.yaml` in the current directory
/// 3. Global `$HOME/.config/grepview/config.yaml`
///
/// Example:
/// ```yaml
/// # Match worker threads per request
/// worker_threads: 8
///
/// # Queue bounds; omitted values scale with the worker count
/// input_queue_capacity: 32
/// result_queue_capacity: 128
///
/// # Log level for the embedding application (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of match worker threads spawned per request
    #[serde(default = "default_worker_threads")]
    pub worker_threads: NonZeroUsize,

    /// Capacity of the path queue between the enumerator and the workers.
    /// Defaults to 4 x `worker_threads`.
    #[serde(default)]
    pub input_queue_capacity: Option<usize>,

    /// Capacity of the bundle queue between the workers and the aggregator.
    /// Defaults to 16 x `worker_threads`.
    #[serde(default)]
    pub result_queue_capacity: Option<usize>,

    /// Log level (trace, debug, info, warn, error). The library only emits
    /// events; the embedding application installs the subscriber and applies
    /// this level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_worker_threads() -> NonZeroUsize {
    NonZeroUsize::new(8).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            input_queue_capacity: None,
            result_queue_capacity: None,
            log_level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from the default locations.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally layering a specific file on top.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            // Global config
            dirs::config_dir().map(|p| p.join("grepview/config.yaml")),
            // Local config
            Some(PathBuf::from(".grepview.yaml")),
            // Custom config
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Resolved capacity of the enumerator-to-worker queue.
    pub fn input_queue_capacity(&self) -> usize {
        self.input_queue_capacity
            .unwrap_or(4 * self.worker_threads.get())
    }

    /// Resolved capacity of the worker-to-aggregator queue.
    pub fn result_queue_capacity(&self) -> usize {
        self.result_queue_capacity
            .unwrap_or(16 * self.worker_threads.get())
    }
}
