//! Harness configuration via `striper-harness.toml`
//!
//! Suites that want to run against different pools, worker counts or
//! layouts read them from a config file instead of hard-coding them. Missing
//! keys fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use striper_concurrency::ParallelAccess;
use striper_core::{PoolLifecycle, SharedBuffer, StripeLayout, StriperError, StriperResult};

/// Config file name
pub const CONFIG_FILE_NAME: &str = "striper-harness.toml";

fn default_pool_prefix() -> String {
    "test-striper".to_string()
}

fn default_threads() -> usize {
    4
}

fn default_buffer_size() -> usize {
    4096
}

/// Harness configuration loaded from `striper-harness.toml`.
///
/// # Example
///
/// ```toml
/// pool_prefix = "test-striper"
/// threads = 4
/// buffer_size = 4096
///
/// # [layout]
/// # stripe_unit = 65536
/// # stripe_count = 4
/// # object_size = 4194304
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Prefix of temporary pool names
    #[serde(default = "default_pool_prefix")]
    pub pool_prefix: String,
    /// Worker count for parallel access
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Bytes per read / write
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    /// Layout applied to every session; backend default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<StripeLayout>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            pool_prefix: default_pool_prefix(),
            threads: default_threads(),
            buffer_size: default_buffer_size(),
            layout: None,
        }
    }
}

impl HarnessConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Striper harness configuration
#
# Prefix of temporary pool names: {prefix}-{pid}-{counter}-{uuid8}
pool_prefix = "test-striper"

# Workers spawned per parallel access call
threads = 4

# Bytes per read / write
buffer_size = 4096

# Striping layout applied to every session (default: backend default)
# object_size must be a multiple of stripe_unit
# [layout]
# stripe_unit = 65536
# stripe_count = 4
# object_size = 4194304
"#
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` naming the offending field.
    pub fn validate(&self) -> StriperResult<()> {
        if self.pool_prefix.is_empty() {
            return Err(StriperError::InvalidConfig(
                "pool_prefix must not be empty".to_string(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(StriperError::InvalidConfig(
                "buffer_size must be greater than zero".to_string(),
            ));
        }
        if let Some(layout) = &self.layout {
            layout
                .validate()
                .map_err(|e| StriperError::InvalidConfig(format!("layout: {}", e)))?;
        }
        Ok(())
    }

    /// Parse and validate config text.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the text does not parse or fails validation.
    pub fn from_toml_str(content: &str) -> StriperResult<Self> {
        let config: HarnessConfig = toml::from_str(content)
            .map_err(|e| StriperError::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `InvalidConfig` if it is invalid.
    pub fn from_file(path: &Path) -> StriperResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StriperError::Io(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            StriperError::InvalidConfig(msg) => {
                StriperError::InvalidConfig(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> StriperResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                StriperError::Io(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StriperResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StriperError::Io(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            StriperError::Io(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Zeroed buffer of `buffer_size` bytes
    pub fn buffer(&self) -> SharedBuffer {
        SharedBuffer::zeroed(self.buffer_size)
    }

    /// Coordinator on a fresh temporary pool named from `pool_prefix`, with
    /// the configured layout.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if validation fails, or the pool creation error.
    pub fn parallel_access<B>(&self, backend: Arc<B>) -> StriperResult<ParallelAccess<B>>
    where
        B: PoolLifecycle + 'static,
        B::Cluster: 'static,
    {
        self.validate()?;
        let access = ParallelAccess::with_temp_pool(backend, &self.pool_prefix)?;
        Ok(match self.layout {
            Some(layout) => access.with_layout(layout),
            None => access,
        })
    }
}
