//! Construction parameters for windows and for the engine that creates them.

use crate::error::{Result, RspError};
use crate::parsed_query::WindowDefinition;
use crate::windowing::{ReportStrategy, Tick};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything a `CSPARQLWindow` needs at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub name: String,
    pub width: i64,
    pub slide: i64,
    #[serde(default)]
    pub report: ReportStrategy,
    #[serde(default)]
    pub tick: Tick,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub max_delay: i64,
    /// Cadence of the late-element sweep. Falls back to `slide` milliseconds.
    #[serde(default)]
    pub late_sweep_interval_ms: Option<u64>,
}

impl WindowConfig {
    pub fn new(name: impl Into<String>, width: i64, slide: i64) -> Self {
        Self {
            name: name.into(),
            width,
            slide,
            report: ReportStrategy::default(),
            tick: Tick::default(),
            start_time: 0,
            max_delay: 0,
            late_sweep_interval_ms: None,
        }
    }

    pub fn with_report(mut self, report: ReportStrategy) -> Self {
        self.report = report;
        self
    }

    pub fn with_tick(mut self, tick: Tick) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_start_time(mut self, start_time: i64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_max_delay(mut self, max_delay: i64) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_late_sweep_interval(mut self, interval: Duration) -> Self {
        self.late_sweep_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.slide <= 0 {
            return Err(RspError::InvalidWindow {
                width: self.width,
                slide: self.slide,
            });
        }
        if self.max_delay < 0 {
            return Err(RspError::InvalidConfig(format!(
                "max_delay must be non-negative, got {}",
                self.max_delay
            )));
        }
        if self.late_sweep_interval_ms == Some(0) {
            return Err(RspError::InvalidConfig(
                "late_sweep_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn late_sweep_interval(&self) -> Duration {
        let millis = self
            .late_sweep_interval_ms
            .unwrap_or_else(|| self.slide.max(1) as u64);
        Duration::from_millis(millis.max(1))
    }
}

/// Options the `RSPEngine` applies to every window it derives from a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub max_delay: i64,
    pub report: ReportStrategy,
    pub tick: Tick,
    pub start_time: i64,
    pub late_sweep_interval_ms: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_delay: 0,
            report: ReportStrategy::OnWindowClose,
            tick: Tick::TimeDriven,
            start_time: 0,
            late_sweep_interval_ms: None,
        }
    }
}

impl EngineOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_delay(mut self, max_delay: i64) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_late_sweep_interval(mut self, interval: Duration) -> Self {
        self.late_sweep_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    pub fn window_config(&self, def: &WindowDefinition) -> WindowConfig {
        WindowConfig {
            name: def.window_name.clone(),
            width: def.width,
            slide: def.slide,
            report: self.report,
            tick: self.tick,
            start_time: self.start_time,
            max_delay: self.max_delay,
            late_sweep_interval_ms: self.late_sweep_interval_ms,
        }
    }
}
