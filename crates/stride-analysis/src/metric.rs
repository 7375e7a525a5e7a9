//! The fixed metric catalog.
//!
//! Exactly five metrics are tracked for every session: score, accuracy, play
//! time, completion rate, and max combo. [`MetricKey`] names them; a
//! [`MetricCatalog`] maps each key to its [`MetricDefinition`] (display name,
//! unit and formatter).
//!
//! The catalog is built once with [`MetricCatalog::standard`] and passed by
//! reference to the comparator and summary layers.
//!
//! # Examples
//!
//! ```
//! use stride_analysis::metric::{MetricCatalog, MetricKey, format_change};
//!
//! let catalog = MetricCatalog::standard();
//! let score = catalog.get(MetricKey::Score).unwrap();
//! assert_eq!(score.format(1200.0), "1200pts");
//! assert_eq!(format_change(100.0, 10.0, score), "+100pts (+10.0%)");
//!
//! let key: MetricKey = "completionRate".parse().unwrap();
//! assert_eq!(key, MetricKey::CompletionRate);
//! assert!("speed".parse::<MetricKey>().is_err());
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownMetricKeyError;

/// Canonical name of a tracked metric.
///
/// Ordering follows declaration order so that per-metric maps iterate in a
/// stable, documented sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
    Score,
    Accuracy,
    PlayTime,
    CompletionRate,
    MaxCombo,
}

impl MetricKey {
    /// All metric keys, in catalog order.
    pub const ALL: [Self; 5] = [
        Self::Score,
        Self::Accuracy,
        Self::PlayTime,
        Self::CompletionRate,
        Self::MaxCombo,
    ];

    /// The camelCase name used in JSON and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Accuracy => "accuracy",
            Self::PlayTime => "playTime",
            Self::CompletionRate => "completionRate",
            Self::MaxCombo => "maxCombo",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = UnknownMetricKeyError;

    /// Accepts the camelCase name as well as `snake_case` and `kebab-case`
    /// spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace(['_', '-'], "").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownMetricKeyError { key: s.to_owned() })
    }
}

/// Static description of one metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricDefinition {
    pub key: MetricKey,
    pub display_name: &'static str,
    pub unit: &'static str,
    formatter: fn(f64) -> String,
}

impl MetricDefinition {
    /// Renders a value (or a change in value) with the metric's unit.
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        (self.formatter)(value)
    }
}

fn format_points(value: f64) -> String {
    format!("{value:.0}pts")
}

fn format_ratio_as_percent(value: f64) -> String {
    format!("{:.0}%", value * 100.0)
}

fn format_seconds(value: f64) -> String {
    format!("{value:.0}s")
}

fn format_count(value: f64) -> String {
    format!("{value:.0}")
}

/// Immutable lookup table from [`MetricKey`] to [`MetricDefinition`].
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    definitions: Vec<MetricDefinition>,
}

impl MetricCatalog {
    /// The five standard metric definitions.
    #[must_use]
    pub fn standard() -> Self {
        let definitions = vec![
            MetricDefinition {
                key: MetricKey::Score,
                display_name: "Score",
                unit: "pts",
                formatter: format_points,
            },
            MetricDefinition {
                key: MetricKey::Accuracy,
                display_name: "Accuracy",
                unit: "%",
                formatter: format_ratio_as_percent,
            },
            MetricDefinition {
                key: MetricKey::PlayTime,
                display_name: "Play time",
                unit: "s",
                formatter: format_seconds,
            },
            MetricDefinition {
                key: MetricKey::CompletionRate,
                display_name: "Completion rate",
                unit: "%",
                formatter: format_ratio_as_percent,
            },
            MetricDefinition {
                key: MetricKey::MaxCombo,
                display_name: "Max combo",
                unit: "",
                formatter: format_count,
            },
        ];
        Self { definitions }
    }

    /// Returns a catalog without the definition for `key`.
    ///
    /// Comparisons requested for the removed key are skipped.
    #[must_use]
    pub fn without(mut self, key: MetricKey) -> Self {
        self.definitions.retain(|def| def.key != key);
        self
    }

    #[must_use]
    pub fn get(&self, key: MetricKey) -> Option<&MetricDefinition> {
        self.definitions.iter().find(|def| def.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.iter()
    }

    /// Display name for `key`, falling back to its canonical name.
    #[must_use]
    pub fn display_name(&self, key: MetricKey) -> &'static str {
        self.get(key).map_or(key.as_str(), |def| def.display_name)
    }
}

impl Default for MetricCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Formats a change as `"<signed change> (<signed percent>)"`, e.g.
/// `"+100pts (+10.0%)"`.
///
/// Zero and positive values carry a leading `+`.
#[must_use]
pub fn format_change(change: f64, change_percent: f64, definition: &MetricDefinition) -> String {
    // Adding 0.0 turns -0.0 into 0.0 so that no "-0" is rendered.
    let change = change + 0.0;
    let change_percent = change_percent + 0.0;
    let sign = if change < 0.0 { "" } else { "+" };
    let percent_sign = if change_percent < 0.0 { "" } else { "+" };
    format!(
        "{sign}{} ({percent_sign}{change_percent:.1}%)",
        definition.format(change)
    )
}

/// Parses a list of metric names, separating the unknown ones.
///
/// Unknown names are returned as errors alongside the recognized keys so the
/// caller can report them and carry on with the rest.
#[must_use]
pub fn parse_metric_keys<'a, I>(names: I) -> (Vec<MetricKey>, Vec<UnknownMetricKeyError>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut keys = vec![];
    let mut unknown = vec![];
    for name in names {
        match name.trim().parse::<MetricKey>() {
            Ok(key) if !keys.contains(&key) => keys.push(key),
            Ok(_) => {}
            Err(err) => unknown.push(err),
        }
    }
    (keys, unknown)
}
