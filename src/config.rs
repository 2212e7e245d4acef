use schemview_common::{Result, SchemError};
use schemview_format::DecodeOptions;
use schemview_logger::{set_min_severity, LogSeverity};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// Cells scanned between cooperative yields in async scans.
pub const DEFAULT_YIELD_INTERVAL: usize = 1 << 16;

/// Settings read from `schemview.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Overrides the `SCHEMVIEW_LOG` threshold when set.
    pub log_level: Option<String>,
    pub decode: DecodeOptions,
    pub yield_interval: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            log_level: None,
            decode: DecodeOptions::default(),
            yield_interval: DEFAULT_YIELD_INTERVAL,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ViewerConfig =
            serde_json::from_str(json).map_err(|e| SchemError::Config(e.to_string()))?;
        if config.yield_interval == 0 {
            return Err(SchemError::Config("yield_interval must be positive".to_owned()));
        }
        config.log_severity()?;
        Ok(config)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn log_severity(&self) -> Result<Option<LogSeverity>> {
        self.log_level
            .as_deref()
            .map(|level| level.parse::<LogSeverity>().map_err(SchemError::Config))
            .transpose()
    }

    /// Applies process-wide settings (currently the log threshold).
    pub fn apply(&self) -> Result<()> {
        if let Some(severity) = self.log_severity()? {
            set_min_severity(severity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use schemview_format::LayoutPreference;

    #[test]
    fn test_from_json_nested_decode_options() {
        let config = ViewerConfig::from_json(
            r#"{
                "log_level": "debug",
                "decode": { "bit_layout": "spanning", "region": "Main" },
                "yield_interval": 1024
            }"#,
        )
        .unwrap();
        assert_eq!(config.log_severity().unwrap(), Some(LogSeverity::Debug));
        assert_eq!(config.decode.bit_layout, LayoutPreference::Spanning);
        assert_eq!(config.decode.region.as_deref(), Some("Main"));
        assert_eq!(config.decode.default_name, "Unnamed");
        assert_eq!(config.yield_interval, 1024);
    }

    #[test]
    fn test_invalid_values() {
        assert_matches!(
            ViewerConfig::from_json(r#"{ "log_level": "chatty" }"#),
            Err(SchemError::Config(_))
        );
        assert_matches!(
            ViewerConfig::from_json(r#"{ "yield_interval": 0 }"#),
            Err(SchemError::Config(_))
        );
        assert_matches!(ViewerConfig::from_json("not json"), Err(SchemError::Config(_)));
    }

    #[tokio::test]
    async fn test_load_or_default_missing_file() {
        let config = ViewerConfig::load_or_default("/nonexistent/schemview.json")
            .await
            .unwrap();
        assert_eq!(config, ViewerConfig::default());

        assert_matches!(
            ViewerConfig::load("/nonexistent/schemview.json").await,
            Err(SchemError::Io(_))
        );
    }
}
