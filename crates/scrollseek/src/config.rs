//! Scroller configuration.
//!
//! ```yaml
//! max_scrolls: 50
//! per_scroll_timeout_ms: 500
//! poll_interval_ms: 50
//! axis: horizontal
//! converter: reversed
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::direction::{Axis, DirectionConverter};
use crate::poller::{PollOptions, Poller, DEFAULT_POLL_INTERVAL_MS};
use crate::result::{SeekError, SeekResult};

/// Default scroll budget per direction
pub const DEFAULT_MAX_SCROLLS: u32 = 100;

/// Default poll budget between scrolls in milliseconds
pub const DEFAULT_PER_SCROLL_TIMEOUT_MS: u64 = 1000;

/// Configuration for a [`crate::SentinelScroller`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollerConfig {
    /// Maximum scroll steps per direction
    pub max_scrolls: u32,
    /// Poll budget before each scroll decision, in milliseconds
    pub per_scroll_timeout_ms: u64,
    /// Sleep between poll attempts, in milliseconds
    pub poll_interval_ms: u64,
    /// Axis searched by `scroll_to`
    pub axis: Axis,
    /// Mapping used for logical directions
    pub converter: DirectionConverter,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            max_scrolls: DEFAULT_MAX_SCROLLS,
            per_scroll_timeout_ms: DEFAULT_PER_SCROLL_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            axis: Axis::default(),
            converter: DirectionConverter::default(),
        }
    }
}

impl ScrollerConfig {
    /// Configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scroll budget
    #[must_use]
    pub const fn with_max_scrolls(mut self, max_scrolls: u32) -> Self {
        self.max_scrolls = max_scrolls;
        self
    }

    /// Set the per-scroll poll budget in milliseconds
    #[must_use]
    pub const fn with_per_scroll_timeout(mut self, timeout_ms: u64) -> Self {
        self.per_scroll_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the axis
    #[must_use]
    pub const fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Set the direction converter
    #[must_use]
    pub const fn with_converter(mut self, converter: DirectionConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Per-scroll poll budget as Duration
    #[must_use]
    pub const fn per_scroll_timeout(&self) -> Duration {
        Duration::from_millis(self.per_scroll_timeout_ms)
    }

    /// Poll options derived from this configuration
    #[must_use]
    pub const fn poll_options(&self) -> PollOptions {
        PollOptions {
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// A poller using this configuration's interval
    #[must_use]
    pub fn poller(&self) -> Poller {
        Poller::with_options(self.poll_options())
    }

    /// Check the configuration for values the engine cannot work with
    ///
    /// # Errors
    ///
    /// [`SeekError::Config`] when `poll_interval_ms` is zero.
    pub fn validate(&self) -> SeekResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(SeekError::config("poll_interval_ms must be greater than zero"));
        }
        Ok(())
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> SeekResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json_str(json: &str) -> SeekResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> SeekResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(SeekError::config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> SeekResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ScrollerConfig::default();
        assert_eq!(config.max_scrolls, 100);
        assert_eq!(config.per_scroll_timeout(), Duration::from_secs(1));
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.axis, Axis::Vertical);
        assert_eq!(config.converter, DirectionConverter::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ScrollerConfig::from_yaml_str("max_scrolls: 5\naxis: horizontal\n").unwrap();
        assert_eq!(config.max_scrolls, 5);
        assert_eq!(config.axis, Axis::Horizontal);
        assert_eq!(config.per_scroll_timeout_ms, 1000);
    }

    #[test]
    fn test_json() {
        let config =
            ScrollerConfig::from_json_str(r#"{"per_scroll_timeout_ms": 250, "converter": "reversed"}"#)
                .unwrap();
        assert_eq!(config.per_scroll_timeout_ms, 250);
        assert_eq!(config.converter, DirectionConverter::Reversed);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = ScrollerConfig::from_yaml_str("poll_interval_ms: 0").unwrap_err();
        assert!(matches!(err, SeekError::Config { .. }));
    }

    #[test]
    fn test_bad_yaml_is_yaml_error() {
        let err = ScrollerConfig::from_yaml_str("max_scrolls: [").unwrap_err();
        assert!(matches!(err, SeekError::Yaml(_)));
    }

    #[test]
    fn test_poller_uses_interval() {
        let poller = ScrollerConfig::new().with_poll_interval(25).poller();
        assert_eq!(poller.options().poll_interval(), Duration::from_millis(25));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("scroller.yaml");
        let yaml = ScrollerConfig::new().with_max_scrolls(7).to_yaml().unwrap();
        std::fs::write(&yaml_path, yaml).unwrap();
        assert_eq!(ScrollerConfig::load(&yaml_path).unwrap().max_scrolls, 7);

        let json_path = dir.path().join("scroller.json");
        let mut file = std::fs::File::create(&json_path).unwrap();
        file.write_all(br#"{"max_scrolls": 3}"#).unwrap();
        assert_eq!(ScrollerConfig::load(&json_path).unwrap().max_scrolls, 3);

        let toml_path = dir.path().join("scroller.toml");
        std::fs::write(&toml_path, "max_scrolls = 3").unwrap();
        assert!(matches!(
            ScrollerConfig::load(&toml_path).unwrap_err(),
            SeekError::Config { .. }
        ));

        assert!(matches!(
            ScrollerConfig::load(dir.path().join("missing.yaml")).unwrap_err(),
            SeekError::Io(_)
        ));
    }
}
