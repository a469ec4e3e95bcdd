//! Plugin-wide configuration and per-job properties.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wjp_core::sanitize::sanitize_full_category;
use wjp_core::TagLimits;
use wjp_sink::ProxyEndpoint;

use crate::builder::MAX_FIXED_TAGS;
use crate::error::ConfigError;

pub const DEFAULT_PROXY_PORT: u32 = 2878;
pub const DEFAULT_FLUSH_INTERVAL: u64 = 5;
pub const DEFAULT_METRICS_PREFIX: &str = "wjp";
pub const DEFAULT_JOB_METRICS_PREFIX: &str = "wjp.job";

/// Process-wide metrics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Wavefront proxy host. Empty means metrics are not sent.
    pub proxy_hostname: String,
    pub proxy_port: u32,
    /// Minutes between flushes of the host's sender.
    pub flush_interval: u64,
    /// System-level prefix.
    pub metrics_prefix: String,
    /// Prefix of every job, pipeline, test, coverage and step metric.
    pub job_metrics_prefix: String,
    /// Source identifier; the proxy hostname when absent.
    pub source: Option<String>,
    pub enable_junit_for_all_jobs: bool,
    pub enable_jacoco_for_all_jobs: bool,
    pub enable_parameters_for_all_jobs: bool,
    pub tag_limits: TagLimits,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            proxy_hostname: String::new(),
            proxy_port: DEFAULT_PROXY_PORT,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            metrics_prefix: DEFAULT_METRICS_PREFIX.to_string(),
            job_metrics_prefix: DEFAULT_JOB_METRICS_PREFIX.to_string(),
            source: None,
            enable_junit_for_all_jobs: false,
            enable_jacoco_for_all_jobs: false,
            enable_parameters_for_all_jobs: false,
            tag_limits: TagLimits::default(),
        }
    }
}

impl MetricsConfig {
    /// Reads a JSON config file, then validates and normalizes it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MetricsConfig = serde_json::from_str(&text)?;
        debug!(path = %path.display(), "loaded metrics config");
        config.normalized()
    }

    /// Checks port, flush interval and tag limits.
    ///
    /// Tag limits must leave room for every fixed tag after a full share of
    /// parameter tags, so `Status`/`Build Number` and the per-test tags are
    /// never refused by the cap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proxy_port > u32::from(u16::MAX) {
            return Err(ConfigError::InvalidPort(self.proxy_port));
        }
        if self.flush_interval < 1 {
            return Err(ConfigError::InvalidFlushInterval(self.flush_interval));
        }
        let limits = self.tag_limits;
        if limits.max_parameter_tags.saturating_add(MAX_FIXED_TAGS) > limits.max_tags {
            return Err(ConfigError::InvalidTagLimits {
                max_tags: limits.max_tags,
                max_parameter_tags: limits.max_parameter_tags,
                fixed: MAX_FIXED_TAGS,
            });
        }
        Ok(())
    }

    /// Validates, then sanitizes both prefixes with the dotted-name rules.
    pub fn normalized(mut self) -> Result<Self, ConfigError> {
        self.validate()?;
        self.metrics_prefix = sanitize_full_category(&self.metrics_prefix);
        self.job_metrics_prefix = sanitize_full_category(&self.job_metrics_prefix);
        self.proxy_hostname = self.proxy_hostname.trim().to_string();
        Ok(self)
    }

    /// Returns `true` when a proxy host is set. Callers emit nothing otherwise.
    pub fn is_configured(&self) -> bool {
        !self.proxy_hostname.trim().is_empty()
    }

    /// The proxy endpoint, or `None` when the host is unset or the port is
    /// out of range.
    pub fn endpoint(&self) -> Option<ProxyEndpoint> {
        if !self.is_configured() {
            return None;
        }
        let port = u16::try_from(self.proxy_port).ok()?;
        Some(ProxyEndpoint::new(self.proxy_hostname.trim(), port))
    }

    /// The source identifier put on every record.
    pub fn source_name(&self) -> &str {
        match self.source.as_deref() {
            Some(source) if !source.is_empty() => source,
            _ => &self.proxy_hostname,
        }
    }
}

/// Per-job opt-ins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobProperty {
    pub enable_junit: bool,
    pub enable_jacoco: bool,
    pub enable_parameters: bool,
    /// Newline-separated parameter names. Empty selects every parameter.
    pub job_parameters: String,
}

impl JobProperty {
    /// Parameter names selected by `job_parameters`, blank lines skipped.
    pub fn selected_parameters(&self) -> Vec<&str> {
        self.job_parameters
            .lines()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = MetricsConfig::default();
        assert_eq!(config.proxy_port, 2878);
        assert_eq!(config.flush_interval, 5);
        assert_eq!(config.job_metrics_prefix, "wjp.job");
        assert!(!config.is_configured());
        assert!(config.endpoint().is_none());
        assert_eq!(config.tag_limits.max_tags, 20);
    }

    #[test]
    fn validation_rejects_bad_port_and_interval() {
        let config = MetricsConfig {
            proxy_port: 70_000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(70_000))));

        let config = MetricsConfig {
            flush_interval: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFlushInterval(0))
        ));
    }

    #[test]
    fn tag_limits_must_leave_room_for_fixed_tags() {
        let with_limits = |max_tags, max_parameter_tags| MetricsConfig {
            proxy_hostname: "h".into(),
            tag_limits: TagLimits {
                max_tags,
                max_parameter_tags,
            },
            ..Default::default()
        };

        assert!(matches!(
            with_limits(1, 0).normalized(),
            Err(ConfigError::InvalidTagLimits { max_tags: 1, .. })
        ));
        assert!(matches!(
            with_limits(12, 10).validate(),
            Err(ConfigError::InvalidTagLimits { max_tags: 12, max_parameter_tags: 10, fixed: 3 })
        ));

        // The tightest accepted limits still keep both scope tags.
        let config = with_limits(3, 0).normalized().unwrap();
        let builder = crate::builder::MetricRecordBuilder::from_config(&config, 0);
        let tags = builder.status_tags("SUCCESS", "7");
        assert_eq!(tags.get("Status"), Some("SUCCESS"));
        assert_eq!(tags.get("Build Number"), Some("7"));
    }

    #[test]
    fn normalization_sanitizes_prefixes() {
        let config = MetricsConfig {
            job_metrics_prefix: "My Jenkins.Job".into(),
            proxy_hostname: " proxy.local ".into(),
            ..Default::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(config.job_metrics_prefix, "my_jenkins.job");
        assert_eq!(config.endpoint(), Some(ProxyEndpoint::new("proxy.local", 2878)));
    }

    #[test]
    fn source_falls_back_to_proxy_host() {
        let mut config = MetricsConfig {
            proxy_hostname: "proxy".into(),
            ..Default::default()
        };
        assert_eq!(config.source_name(), "proxy");
        config.source = Some("ci-01".into());
        assert_eq!(config.source_name(), "ci-01");
    }

    #[test]
    fn load_reads_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"proxy_hostname": "wf-proxy", "enable_junit_for_all_jobs": true, "tag_limits": {{"max_tags": 15}}}}"#
        )
        .unwrap();

        let config = MetricsConfig::load(file.path()).unwrap();
        assert_eq!(config.proxy_hostname, "wf-proxy");
        assert!(config.enable_junit_for_all_jobs);
        assert_eq!(config.proxy_port, 2878);
        assert_eq!(config.tag_limits.max_tags, 15);
        assert_eq!(config.tag_limits.max_parameter_tags, 10);
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(MetricsConfig::load(&missing), Err(ConfigError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(MetricsConfig::load(&bad), Err(ConfigError::Parse(_))));

        let invalid = dir.path().join("invalid.json");
        std::fs::write(&invalid, r#"{"flush_interval": 0}"#).unwrap();
        assert!(matches!(
            MetricsConfig::load(&invalid),
            Err(ConfigError::InvalidFlushInterval(0))
        ));
    }

    #[test]
    fn job_property_parameter_selection() {
        let property = JobProperty {
            enable_parameters: true,
            job_parameters: "branch\n\n  env \r\nregion".into(),
            ..Default::default()
        };
        assert_eq!(property.selected_parameters(), vec!["branch", "env", "region"]);
        assert!(JobProperty::default().selected_parameters().is_empty());
    }
}
