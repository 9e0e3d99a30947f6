//! Supervisor tunables: restart intensity window and init timeout (§4.E
//! "Supervisor startup defaults"). Mirrors `actor::RuntimeConfig`'s
//! defaults + builder + `validate` shape.

// Layer 1: Standard library imports
use std::time::Duration;

pub const DEFAULT_MAX_FREQUENCY: u32 = 5;
pub const DEFAULT_FREQUENCY_PERIOD: Duration = Duration::from_secs(1);
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub max_frequency: u32,
    pub frequency_period: Duration,
    pub init_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_frequency: DEFAULT_MAX_FREQUENCY,
            frequency_period: DEFAULT_FREQUENCY_PERIOD,
            init_timeout: DEFAULT_INIT_TIMEOUT,
        }
    }
}

impl SupervisorConfig {
    pub fn builder() -> SupervisorConfigBuilder {
        SupervisorConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.frequency_period.is_zero() {
            return Err("frequency_period must be > 0".to_string());
        }
        if self.init_timeout.is_zero() {
            return Err("init_timeout must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SupervisorConfigBuilder {
    config: SupervisorConfig,
}

impl SupervisorConfigBuilder {
    pub fn with_max_frequency(mut self, max_frequency: u32) -> Self {
        self.config.max_frequency = max_frequency;
        self
    }

    pub fn with_frequency_period(mut self, period: Duration) -> Self {
        self.config.frequency_period = period;
        self
    }

    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.config.init_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<SupervisorConfig, String> {
        self.config.validate()?;
        Ok(self.config)
    }
}
