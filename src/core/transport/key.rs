//! Destination object keys

use crate::config::S3Config;
use crate::domain::AssetKind;
use chrono::{DateTime, Utc};

/// Date component layout of the object key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY/MM/DD`
    Slashed,
    /// `YYYY-MM-DD`
    Dashed,
    /// `YYYYMMDD`
    Compact,
}

impl DateFormat {
    /// Parse a format selector, falling back to `YYYY/MM/DD`
    pub fn parse(selector: &str) -> Self {
        match selector {
            "YYYY-MM-DD" => DateFormat::Dashed,
            "YYYYMMDD" => DateFormat::Compact,
            "YYYY/MM/DD" => DateFormat::Slashed,
            other => {
                tracing::debug!(selector = other, "Unknown date format, using YYYY/MM/DD");
                DateFormat::Slashed
            }
        }
    }

    fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Slashed => "%Y/%m/%d",
            DateFormat::Dashed => "%Y-%m-%d",
            DateFormat::Compact => "%Y%m%d",
        }
    }

    pub fn render(&self, at: &DateTime<Utc>) -> String {
        at.format(self.pattern()).to_string()
    }
}

/// Builds `{prefix}/{date}/{kind}/{filename}` keys
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    prefix: String,
    date_format: DateFormat,
}

impl KeyBuilder {
    pub fn new(prefix: impl Into<String>, date_format: DateFormat) -> Self {
        Self {
            prefix: prefix.into().trim_matches('/').to_string(),
            date_format,
        }
    }

    pub fn from_config(config: &S3Config) -> Self {
        Self::new(config.prefix.clone(), DateFormat::parse(&config.prefix_format))
    }

    /// Bundle file name
    ///
    /// `{kind}_bundle_{n}-{HHMMSS}.zip` when the kind has several chunks,
    /// otherwise `{kind}-{HHMMSS}.zip`.
    pub fn file_name(kind: AssetKind, number: usize, total: usize, at: &DateTime<Utc>) -> String {
        let time = at.format("%H%M%S");
        if total > 1 {
            format!("{kind}_bundle_{number}-{time}.zip")
        } else {
            format!("{kind}-{time}.zip")
        }
    }

    /// Full object key for one bundle
    pub fn key(&self, kind: AssetKind, number: usize, total: usize, at: &DateTime<Utc>) -> String {
        let date = self.date_format.render(at);
        let file = Self::file_name(kind, number, total, at);

        if self.prefix.is_empty() {
            format!("{date}/{kind}/{file}")
        } else {
            format!("{}/{date}/{kind}/{file}", self.prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap()
    }

    #[test_case("YYYY/MM/DD", "2025/03/07" ; "slashed")]
    #[test_case("YYYY-MM-DD", "2025-03-07" ; "dashed")]
    #[test_case("YYYYMMDD", "20250307" ; "compact")]
    #[test_case("DD.MM.YYYY", "2025/03/07" ; "unknown falls back")]
    fn test_date_component(selector: &str, expected: &str) {
        assert_eq!(DateFormat::parse(selector).render(&at()), expected);
    }

    #[test]
    fn test_key_multiple_chunks() {
        let builder = KeyBuilder::new("quicksight-backups", DateFormat::Slashed);
        assert_eq!(
            builder.key(AssetKind::Dataset, 2, 3, &at()),
            "quicksight-backups/2025/03/07/datasets/datasets_bundle_2-140509.zip"
        );
    }

    #[test]
    fn test_key_single_chunk() {
        let builder = KeyBuilder::new("backups", DateFormat::Compact);
        assert_eq!(
            builder.key(AssetKind::Analysis, 1, 1, &at()),
            "backups/20250307/analyses/analyses-140509.zip"
        );
    }

    #[test]
    fn test_key_without_prefix() {
        let builder = KeyBuilder::new("", DateFormat::Dashed);
        assert_eq!(
            builder.key(AssetKind::Dashboard, 1, 1, &at()),
            "2025-03-07/dashboards/dashboards-140509.zip"
        );
    }
}
