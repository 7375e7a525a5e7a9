//! Session records and per-set aggregation.
//!
//! A [`SessionRecord`] is one play session as recorded by the game. The engine
//! never mutates records; it derives [`AggregateMetrics`] from a set of them on
//! demand.
//!
//! # Serialization
//!
//! Records use camelCase field names and accept optional fields:
//!
//! ```json
//! {
//!   "sessionId": "s-001",
//!   "playerId": "alice",
//!   "stageId": "stage-3",
//!   "score": 1250,
//!   "accuracy": 0.87,
//!   "startTime": 1700000000000,
//!   "endTime": 1700000300000,
//!   "completed": true,
//!   "maxCombo": 24
//! }
//! ```
//!
//! # Windows
//!
//! [`split_by_period`] cuts a history into the current window
//! `(now - period, now]` and the directly preceding past window
//! `(now - 2 * period, now - period]`.
//!
//! ```
//! use stride_analysis::session::{ComparisonPeriod, SessionRecord, split_by_period};
//!
//! const DAY: i64 = 24 * 60 * 60 * 1000;
//! let now = 100 * DAY;
//! let sessions = vec![
//!     SessionRecord::new(now - DAY, 1200.0),
//!     SessionRecord::new(now - 10 * DAY, 1000.0),
//!     SessionRecord::new(now - 30 * DAY, 800.0),
//! ];
//! let windows = split_by_period(&sessions, now, ComparisonPeriod::Week);
//! assert_eq!(windows.current.len(), 1);
//! assert_eq!(windows.past.len(), 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metric::MetricKey;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// One recorded play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_id: Option<String>,
    pub score: f64,
    /// Hit ratio in `[0, 1]`, when the game reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Session start, epoch milliseconds.
    pub start_time: i64,
    /// Session end, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    /// Play time in seconds, used when `end_time` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub max_combo: u32,
}

impl SessionRecord {
    /// A minimal record with only a start time and a score.
    #[must_use]
    pub fn new(start_time: i64, score: f64) -> Self {
        Self {
            session_id: None,
            player_id: None,
            stage_id: None,
            score,
            accuracy: None,
            start_time,
            end_time: None,
            duration: None,
            completed: false,
            max_combo: 0,
        }
    }

    /// Play time in seconds: `(end - start) / 1000`, else `duration`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn play_time_secs(&self) -> Option<f64> {
        match self.end_time {
            Some(end) if end >= self.start_time => Some((end - self.start_time) as f64 / 1000.0),
            _ => self.duration,
        }
    }
}

/// Averages of the five metrics over a set of sessions.
///
/// A metric is `None` when no session in the set reports it; an empty set
/// therefore has every metric absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub session_count: usize,
    pub score: Option<f64>,
    pub accuracy: Option<f64>,
    /// Average play time in seconds.
    pub play_time: Option<f64>,
    /// Completed sessions divided by all sessions.
    pub completion_rate: Option<f64>,
    /// Highest combo across the set.
    pub max_combo: Option<f64>,
}

impl AggregateMetrics {
    /// Aggregates a set of sessions.
    ///
    /// # Examples
    ///
    /// ```
    /// use stride_analysis::session::{AggregateMetrics, SessionRecord};
    ///
    /// let mut a = SessionRecord::new(0, 1000.0);
    /// a.completed = true;
    /// a.max_combo = 12;
    /// let mut b = SessionRecord::new(1, 1200.0);
    /// b.accuracy = Some(0.8);
    /// b.max_combo = 20;
    ///
    /// let metrics = AggregateMetrics::from_sessions(&[a, b]);
    /// assert_eq!(metrics.session_count, 2);
    /// assert_eq!(metrics.score, Some(1100.0));
    /// assert_eq!(metrics.accuracy, Some(0.8));
    /// assert_eq!(metrics.completion_rate, Some(0.5));
    /// assert_eq!(metrics.max_combo, Some(20.0));
    /// assert_eq!(metrics.play_time, None);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a SessionRecord>,
    {
        let mut count = 0_usize;
        let mut score_sum = 0.0;
        let mut accuracy = (0.0, 0_usize);
        let mut play_time = (0.0, 0_usize);
        let mut completed = 0_usize;
        let mut max_combo = 0_u32;

        for session in sessions {
            count += 1;
            score_sum += session.score;
            if let Some(value) = session.accuracy {
                accuracy.0 += value;
                accuracy.1 += 1;
            }
            if let Some(value) = session.play_time_secs() {
                play_time.0 += value;
                play_time.1 += 1;
            }
            if session.completed {
                completed += 1;
            }
            max_combo = max_combo.max(session.max_combo);
        }

        if count == 0 {
            return Self::default();
        }

        let average = |(sum, n): (f64, usize)| (n > 0).then(|| sum / n as f64);
        Self {
            session_count: count,
            score: Some(score_sum / count as f64),
            accuracy: average(accuracy),
            play_time: average(play_time),
            completion_rate: Some(completed as f64 / count as f64),
            max_combo: Some(f64::from(max_combo)),
        }
    }

    /// Value of `key`, if present.
    #[must_use]
    pub fn get(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::Score => self.score,
            MetricKey::Accuracy => self.accuracy,
            MetricKey::PlayTime => self.play_time,
            MetricKey::CompletionRate => self.completion_rate,
            MetricKey::MaxCombo => self.max_combo,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.session_count == 0
    }
}

/// Length of the window compared against the one before it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonPeriod {
    #[display("week")]
    Week,
    #[display("month")]
    Month,
    #[display("quarter")]
    Quarter,
}

impl ComparisonPeriod {
    pub const ALL: [Self; 3] = [Self::Week, Self::Month, Self::Quarter];

    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }

    #[must_use]
    pub const fn millis(self) -> i64 {
        self.days() * MILLIS_PER_DAY
    }
}

/// Sessions falling in the current and preceding windows of one period.
#[derive(Debug, Clone, Default)]
pub struct PeriodWindows<'a> {
    pub current: Vec<&'a SessionRecord>,
    pub past: Vec<&'a SessionRecord>,
}

impl PeriodWindows<'_> {
    #[must_use]
    pub fn current_metrics(&self) -> AggregateMetrics {
        AggregateMetrics::from_sessions(self.current.iter().copied())
    }

    #[must_use]
    pub fn past_metrics(&self) -> AggregateMetrics {
        AggregateMetrics::from_sessions(self.past.iter().copied())
    }
}

/// Splits sessions by start time into the current and past windows ending at
/// `now` (epoch milliseconds). Sessions outside both windows are ignored.
#[must_use]
pub fn split_by_period<'a, I>(sessions: I, now: i64, period: ComparisonPeriod) -> PeriodWindows<'a>
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let length = period.millis();
    let current_start = now - length;
    let past_start = current_start - length;

    let mut windows = PeriodWindows::default();
    for session in sessions {
        let t = session.start_time;
        if t > current_start && t <= now {
            windows.current.push(session);
        } else if t > past_start && t <= current_start {
            windows.past.push(session);
        }
    }
    windows
}

/// Groups sessions by stage id, in stage-id order. Sessions without a stage
/// are left out.
#[must_use]
pub fn group_by_stage<'a, I>(sessions: I) -> BTreeMap<&'a str, Vec<&'a SessionRecord>>
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let mut groups: BTreeMap<&str, Vec<&SessionRecord>> = BTreeMap::new();
    for session in sessions {
        if let Some(stage_id) = session.stage_id.as_deref() {
            groups.entry(stage_id).or_default().push(session);
        }
    }
    groups
}

/// Groups sessions by player id, in player-id order. Sessions without a player
/// are left out.
#[must_use]
pub fn group_by_player(sessions: &[SessionRecord]) -> BTreeMap<&str, Vec<&SessionRecord>> {
    let mut groups: BTreeMap<&str, Vec<&SessionRecord>> = BTreeMap::new();
    for session in sessions {
        if let Some(player_id) = session.player_id.as_deref() {
            groups.entry(player_id).or_default().push(session);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = MILLIS_PER_DAY;

    fn session(start_time: i64, score: f64) -> SessionRecord {
        SessionRecord::new(start_time, score)
    }

    #[test]
    fn test_empty_aggregate() {
        let metrics = AggregateMetrics::from_sessions(&[]);
        assert!(metrics.is_empty());
        for key in MetricKey::ALL {
            assert_eq!(metrics.get(key), None);
        }
    }

    #[test]
    fn test_play_time_sources() {
        let mut timed = session(10_000, 0.0);
        timed.end_time = Some(310_000);
        assert_eq!(timed.play_time_secs(), Some(300.0));

        let mut by_duration = session(0, 0.0);
        by_duration.duration = Some(120.0);
        assert_eq!(by_duration.play_time_secs(), Some(120.0));

        // An end before the start is not trusted.
        let mut inverted = session(10_000, 0.0);
        inverted.end_time = Some(5_000);
        inverted.duration = Some(42.0);
        assert_eq!(inverted.play_time_secs(), Some(42.0));

        let metrics = AggregateMetrics::from_sessions(&[timed, by_duration, session(0, 0.0)]);
        assert_eq!(metrics.play_time, Some(210.0));
    }

    #[test]
    fn test_accuracy_averaged_over_reporting_sessions() {
        let mut a = session(0, 100.0);
        a.accuracy = Some(0.9);
        let mut b = session(1, 200.0);
        b.accuracy = Some(0.7);
        let c = session(2, 300.0);
        let metrics = AggregateMetrics::from_sessions(&[a, b, c]);
        assert!((metrics.accuracy.unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(metrics.score, Some(200.0));
        assert_eq!(metrics.completion_rate, Some(0.0));
    }

    #[test]
    fn test_split_boundaries() {
        let now = 200 * DAY;
        let sessions = vec![
            session(now, 1.0),
            session(now - 7 * DAY + 1, 2.0),
            session(now - 7 * DAY, 3.0),
            session(now - 14 * DAY + 1, 4.0),
            session(now - 14 * DAY, 5.0),
            session(now + 1, 6.0),
        ];
        let windows = split_by_period(&sessions, now, ComparisonPeriod::Week);
        let scores = |list: &[&SessionRecord]| list.iter().map(|s| s.score).collect::<Vec<_>>();
        assert_eq!(scores(&windows.current), vec![1.0, 2.0]);
        assert_eq!(scores(&windows.past), vec![3.0, 4.0]);
        assert_eq!(windows.current_metrics().score, Some(1.5));
        assert_eq!(windows.past_metrics().score, Some(3.5));
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("week".parse::<ComparisonPeriod>().unwrap(), ComparisonPeriod::Week);
        assert_eq!("Quarter".parse::<ComparisonPeriod>().unwrap(), ComparisonPeriod::Quarter);
        assert_eq!(ComparisonPeriod::Month.to_string(), "month");
        assert_eq!(ComparisonPeriod::Month.days(), 30);
    }

    #[test]
    fn test_group_by_stage_skips_unassigned() {
        let mut a = session(0, 1.0);
        a.stage_id = Some("b".to_owned());
        let mut b = session(1, 2.0);
        b.stage_id = Some("a".to_owned());
        let mut c = session(2, 3.0);
        c.stage_id = Some("b".to_owned());
        let d = session(3, 4.0);
        let sessions = [a, b, c, d];

        let groups = group_by_stage(&sessions);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(groups["b"].len(), 2);
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let record: SessionRecord =
            serde_json::from_str(r#"{ "score": 900, "startTime": 1000 }"#).unwrap();
        assert_eq!(record, SessionRecord::new(1000, 900.0));
    }
}
