use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;
pub const DEFAULT_RETENTION_MS: i64 = 5_000;
pub const DEFAULT_ROLLING_CAPACITY: usize = 10;
pub const DEFAULT_MIN_ROLLING_SAMPLES: usize = 3;
pub const DEFAULT_TURN_LOOKBACK_MS: i64 = 3_000;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    pub sample_rate_hz: u32,
    pub retention_ms: i64,
    pub rolling_capacity: usize,
    pub min_rolling_samples: usize,
    pub turn_lookback_ms: i64,
    pub channel_capacity: usize,
}

impl EngineConfig {
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.sample_rate_hz == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.retention_ms <= 0 {
            return Err(ConfigError::ZeroRetention);
        }
        if self.rolling_capacity == 0 {
            return Err(ConfigError::ZeroRollingCapacity);
        }
        if self.min_rolling_samples == 0 || self.min_rolling_samples > self.rolling_capacity {
            return Err(ConfigError::MinRollingSamplesOutOfRange);
        }
        if self.turn_lookback_ms <= 0 {
            return Err(ConfigError::ZeroTurnLookback);
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroChannelCapacity);
        }
        Ok(self)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            retention_ms: DEFAULT_RETENTION_MS,
            rolling_capacity: DEFAULT_ROLLING_CAPACITY,
            min_rolling_samples: DEFAULT_MIN_ROLLING_SAMPLES,
            turn_lookback_ms: DEFAULT_TURN_LOOKBACK_MS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sample rate must be > 0 Hz")]
    ZeroSampleRate,
    #[error("history retention must be > 0 ms")]
    ZeroRetention,
    #[error("rolling window capacity must be > 0")]
    ZeroRollingCapacity,
    #[error("min rolling samples must be between 1 and the rolling capacity")]
    MinRollingSamplesOutOfRange,
    #[error("turn lookback must be > 0 ms")]
    ZeroTurnLookback,
    #[error("channel capacity must be > 0")]
    ZeroChannelCapacity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default().validated().expect("default valid");
        assert_eq!(config.sample_rate_hz, DEFAULT_SAMPLE_RATE_HZ);
        assert_eq!(config.retention_ms, DEFAULT_RETENTION_MS);
        assert_eq!(config.rolling_capacity, DEFAULT_ROLLING_CAPACITY);
    }

    #[test]
    fn zero_sample_rate_rejected() {
        let config = EngineConfig {
            sample_rate_hz: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validated(), Err(ConfigError::ZeroSampleRate));
    }

    #[test]
    fn non_positive_retention_rejected() {
        let config = EngineConfig {
            retention_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validated(), Err(ConfigError::ZeroRetention));
        let config = EngineConfig {
            retention_ms: -100,
            ..EngineConfig::default()
        };
        assert_eq!(config.validated(), Err(ConfigError::ZeroRetention));
    }

    #[test]
    fn min_rolling_samples_must_fit_capacity() {
        let config = EngineConfig {
            rolling_capacity: 4,
            min_rolling_samples: 5,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validated(),
            Err(ConfigError::MinRollingSamplesOutOfRange)
        );
        let config = EngineConfig {
            min_rolling_samples: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validated(),
            Err(ConfigError::MinRollingSamplesOutOfRange)
        );
    }

    #[test]
    fn zero_channel_capacity_rejected() {
        let config = EngineConfig {
            channel_capacity: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validated(), Err(ConfigError::ZeroChannelCapacity));
    }
}
