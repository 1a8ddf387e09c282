//! Isolated on-disk environment for binary tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::GlobalConfig;
use crate::persistence::{PersistedState, StateFile};

/// A temp directory holding a config file, the state file it points at and
/// a download directory.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub downloads_dir: PathBuf,
}

impl TestEnvironment {
    /// Create a new environment with an empty state.
    pub fn new() -> Result<Self> {
        super::init_test_logging(None);

        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        let state_path = temp_dir.path().join("state").join("state.json");
        let downloads_dir = temp_dir.path().join("state").join("downloads");
        fs::create_dir_all(&downloads_dir)?;

        let env = Self {
            temp_dir,
            config_path,
            state_path,
            downloads_dir,
        };
        env.write_config(&env.config())?;
        Ok(env)
    }

    /// The config this environment starts with.
    pub fn config(&self) -> GlobalConfig {
        GlobalConfig {
            state_path: Some(self.state_path.clone()),
            reset_relaunch_delay_ms: 0,
            ..GlobalConfig::default()
        }
    }

    /// Replace the config file.
    pub fn write_config(&self, config: &GlobalConfig) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_path, content)?;
        Ok(())
    }

    /// Root of the environment.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Replace the persisted state.
    pub fn write_state(&self, state: &PersistedState) -> Result<()> {
        StateFile::new(&self.state_path).save(state)
    }

    /// Read the persisted state back.
    pub fn read_state(&self) -> Result<PersistedState> {
        StateFile::new(&self.state_path).load()
    }
}
