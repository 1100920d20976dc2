use std::time::Duration;
use reqwest::Url;
use crate::config::env::*;
use crate::domain::{Dimension, Intervals};

#[derive(Clone)]
#[cfg_attr(test, derive(Default))]
pub struct AppConfig {
    pub intervals: Intervals,
    pub sweep_periods: SweepPeriods,
    pub notifier: NotifierConfig,
    pub metrics_port: u16,
}

/// How often each maintenance dimension is swept for reminders.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SweepPeriods {
    pub feed: Duration,
    pub water: Duration,
    pub clean: Duration,
}

#[derive(Clone, Default)]
pub struct NotifierConfig {
    pub webhook_url: Option<Url>,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Url,
    pub max_connections: u32
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Intervals::default();
        let intervals = Intervals {
            feed: get_env_positive_or_default("FEED_INTERVAL_MINUTES", defaults.feed),
            water: get_env_positive_or_default("WATER_INTERVAL_MINUTES", defaults.water),
            clean: get_env_positive_or_default("CLEAN_INTERVAL_MINUTES", defaults.clean),
        };
        let sweep_periods = SweepPeriods {
            feed: get_env_minutes_or_default("FEED_SWEEP_PERIOD_MINUTES", 2 * 60),
            clean: get_env_minutes_or_default("CLEAN_SWEEP_PERIOD_MINUTES", 5 * 60),
            water: get_env_minutes_or_default("WATER_SWEEP_PERIOD_MINUTES", 7 * 60),
        };
        let notifier = NotifierConfig {
            webhook_url: get_env_optional_value("NOTIFIER_WEBHOOK_URL")?,
            timeout: Duration::from_secs(get_env_positive_or_default("NOTIFIER_TIMEOUT_SECS", 5)),
        };
        Ok(Self {
            intervals,
            sweep_periods,
            notifier,
            metrics_port: get_env_value_or_default("METRICS_PORT", 8080),
        })
    }
}

impl SweepPeriods {
    pub fn of(&self, dimension: Dimension) -> Duration {
        match dimension {
            Dimension::Feed => self.feed,
            Dimension::Water => self.water,
            Dimension::Clean => self.clean,
        }
    }
}

impl Default for SweepPeriods {
    fn default() -> Self {
        Self {
            feed: Duration::from_secs(2 * 60 * 60),
            water: Duration::from_secs(7 * 60 * 60),
            clean: Duration::from_secs(5 * 60 * 60),
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: get_env_mandatory_value("DATABASE_URL")?,
            max_connections: get_env_value_or_default("DATABASE_MAX_CONNECTIONS", 10)
        })
    }
}
