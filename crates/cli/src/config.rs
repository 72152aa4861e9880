//! CLI configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use battle_runtime::RuntimeConfig;

#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Scenario file; the bundled skirmish when unset.
    pub scenario: Option<PathBuf>,
    pub tick: Duration,
    /// Log directory; the platform cache directory when unset.
    pub log_dir: Option<PathBuf>,
    pub debug_play: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            tick: RuntimeConfig::DEFAULT_TICK_INTERVAL,
            log_dir: None,
            debug_play: false,
        }
    }
}

impl CliConfig {
    /// Construct CLI configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_SCENARIO` - path to a RON scenario
    /// - `BATTLE_TICK_MS` - scheduler period in milliseconds (default: 50)
    /// - `BATTLE_LOG_DIR` - directory for `battle.log`
    /// - `BATTLE_DEBUG_PLAY` - `true` to command every side for the opening turn
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = read_env::<PathBuf>("BATTLE_SCENARIO") {
            config.scenario = Some(path);
        }
        if let Some(millis) = read_env::<u64>("BATTLE_TICK_MS") {
            config.tick = Duration::from_millis(millis.max(1));
        }
        if let Some(path) = read_env::<PathBuf>("BATTLE_LOG_DIR") {
            config.log_dir = Some(path);
        }
        if let Some(enabled) = read_env::<bool>("BATTLE_DEBUG_PLAY") {
            config.debug_play = enabled;
        }

        config
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            tick_interval: Some(self.tick),
            debug_play: self.debug_play,
            ..RuntimeConfig::default()
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
