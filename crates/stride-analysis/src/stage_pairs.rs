//! Head-to-head comparison of stages.
//!
//! For every pair of stages, [`compare_stage_pairs`] tests whether score,
//! play time and accuracy differ with Welch's t-test and reports Cohen's d as
//! the size of the difference.
//!
//! # Examples
//!
//! ```
//! use stride_analysis::{session::SessionRecord, stage_pairs::compare_stage_pairs};
//!
//! let play = |stage: &str, start, score| {
//!     let mut session = SessionRecord::new(start, score);
//!     session.stage_id = Some(stage.to_owned());
//!     session
//! };
//! let sessions = (0..5)
//!     .flat_map(|i| {
//!         let jitter = f64::from(i) * 10.0;
//!         [play("cave", i64::from(i), 400.0 + jitter), play("forest", i64::from(i), 900.0 + jitter)]
//!     })
//!     .collect::<Vec<_>>();
//!
//! let pairs = compare_stage_pairs(&sessions, 10);
//! let pair = &pairs["cave_vs_forest"];
//! assert!(pair.score.as_ref().unwrap().significant);
//! assert_eq!(pair.summary, vec!["forest scores significantly higher than cave"]);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stride_stats::{
    descriptive,
    significance::{self, EffectSize, WelchTTest},
};

use crate::{
    benchmark::MeanInterval,
    session::{SessionRecord, group_by_stage},
};

/// Fewest plays per stage a metric is tested on.
const MIN_SAMPLES: usize = 5;
const SIGNIFICANCE_LEVEL: f64 = 0.05;
/// A stage scoring below this share of the other's mean needs work.
const SCORE_GAP_RATIO: f64 = 0.8;
/// A stage taking longer than this multiple of the other's mean needs work.
const PLAY_TIME_GAP_RATIO: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl From<significance::EffectMagnitude> for EffectMagnitude {
    fn from(magnitude: significance::EffectMagnitude) -> Self {
        match magnitude {
            significance::EffectMagnitude::Negligible => Self::Negligible,
            significance::EffectMagnitude::Small => Self::Small,
            significance::EffectMagnitude::Medium => Self::Medium,
            significance::EffectMagnitude::Large => Self::Large,
            significance::EffectMagnitude::VeryLarge => Self::VeryLarge,
        }
    }
}

/// One metric of stage `a` against stage `b`; differences are `a - b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDifference {
    pub mean_a: f64,
    pub mean_b: f64,
    pub mean_difference: f64,
    /// `None` when both stages are constant in this metric.
    pub t_statistic: Option<f64>,
    pub degrees_of_freedom: Option<f64>,
    pub p_value: Option<f64>,
    /// 95% interval of the mean difference.
    pub interval: Option<MeanInterval>,
    /// `p < 0.05`.
    pub significant: bool,
    pub cohens_d: f64,
    pub hedges_g: f64,
    pub effect: EffectMagnitude,
}

impl MetricDifference {
    /// `None` when either side has fewer than five values.
    #[must_use]
    pub fn test(a: &[f64], b: &[f64]) -> Option<Self> {
        if a.len() < MIN_SAMPLES || b.len() < MIN_SAMPLES {
            return None;
        }
        let welch = WelchTTest::new(a, b);
        let effect = EffectSize::new(a, b);
        let (mean_a, mean_b) = (descriptive::mean(a), descriptive::mean(b));
        Some(Self {
            mean_a,
            mean_b,
            mean_difference: mean_a - mean_b,
            t_statistic: welch.map(|t| t.t_statistic),
            degrees_of_freedom: welch.map(|t| t.degrees_of_freedom),
            p_value: welch.map(|t| t.p_value),
            interval: welch.map(|t| MeanInterval::from(t.confidence_interval)),
            significant: welch.is_some_and(|t| t.is_significant(SIGNIFICANCE_LEVEL)),
            cohens_d: effect.cohens_d,
            hedges_g: effect.hedges_g,
            effect: effect.magnitude.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePairComparison {
    pub stage_a: String,
    pub stage_b: String,
    pub score: Option<MetricDifference>,
    pub play_time: Option<MetricDifference>,
    pub accuracy: Option<MetricDifference>,
    /// One line per significant difference, or a single line saying there
    /// is none.
    pub summary: Vec<String>,
    /// Where stage `a` lags behind stage `b`.
    pub recommendations: Vec<String>,
}

/// Samples of one stage, in session order.
#[derive(Debug, Default)]
struct StageSamples {
    scores: Vec<f64>,
    play_times: Vec<f64>,
    accuracies: Vec<f64>,
}

impl StageSamples {
    fn from_sessions(sessions: &[&SessionRecord]) -> Self {
        Self {
            scores: sessions.iter().map(|s| s.score).collect(),
            play_times: sessions.iter().filter_map(|s| s.play_time_secs()).collect(),
            accuracies: sessions.iter().filter_map(|s| s.accuracy).collect(),
        }
    }
}

/// Compares every pair of stages played up to `now`.
///
/// Keys are `"<a>_vs_<b>"` with `a` before `b` in stage-id order.
#[must_use]
pub fn compare_stage_pairs<'a, I>(sessions: I, now: i64) -> BTreeMap<String, StagePairComparison>
where
    I: IntoIterator<Item = &'a SessionRecord>,
{
    let played = sessions.into_iter().filter(|s| s.start_time <= now);
    let stages = group_by_stage(played)
        .into_iter()
        .map(|(stage_id, sessions)| (stage_id, StageSamples::from_sessions(&sessions)))
        .collect::<Vec<_>>();

    let mut pairs = BTreeMap::new();
    for (i, (a_id, a)) in stages.iter().enumerate() {
        for (b_id, b) in &stages[i + 1..] {
            pairs.insert(format!("{a_id}_vs_{b_id}"), compare_pair(a_id, a, b_id, b));
        }
    }
    pairs
}

fn compare_pair(a_id: &str, a: &StageSamples, b_id: &str, b: &StageSamples) -> StagePairComparison {
    let score = MetricDifference::test(&a.scores, &b.scores);
    let play_time = MetricDifference::test(&a.play_times, &b.play_times);
    let accuracy = MetricDifference::test(&a.accuracies, &b.accuracies);

    let order = |a_wins: bool| if a_wins { (a_id, b_id) } else { (b_id, a_id) };
    let mut summary = vec![];
    if let Some(d) = score.as_ref().filter(|d| d.significant) {
        let (winner, loser) = order(d.mean_difference > 0.0);
        summary.push(format!("{winner} scores significantly higher than {loser}"));
    }
    if let Some(d) = play_time.as_ref().filter(|d| d.significant) {
        let (winner, loser) = order(d.mean_difference < 0.0);
        summary.push(format!("{winner} is finished significantly faster than {loser}"));
    }
    if let Some(d) = accuracy.as_ref().filter(|d| d.significant) {
        let (winner, loser) = order(d.mean_difference > 0.0);
        summary.push(format!("{winner} is played significantly more accurately than {loser}"));
    }
    if summary.is_empty() {
        summary.push(format!("No significant difference between {a_id} and {b_id}"));
    }

    let mut recommendations = vec![];
    if !a.scores.is_empty()
        && !b.scores.is_empty()
        && descriptive::mean(&a.scores) < descriptive::mean(&b.scores) * SCORE_GAP_RATIO
    {
        recommendations.push(format!("Focus on raising your score on {a_id}"));
    }
    if !a.play_times.is_empty()
        && !b.play_times.is_empty()
        && descriptive::mean(&a.play_times) > descriptive::mean(&b.play_times) * PLAY_TIME_GAP_RATIO
    {
        recommendations.push(format!("Work on finishing {a_id} faster"));
    }

    StagePairComparison {
        stage_a: a_id.to_owned(),
        stage_b: b_id.to_owned(),
        score,
        play_time,
        accuracy,
        summary,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: i64 = 1000;

    fn play(stage: &str, start: i64, score: f64, secs: i64, accuracy: f64) -> SessionRecord {
        let mut session = SessionRecord::new(start, score);
        session.stage_id = Some(stage.to_owned());
        session.end_time = Some(start + secs * SECOND);
        session.accuracy = Some(accuracy);
        session
    }

    /// Five plays per stage with a small spread around the given means.
    fn stage(id: &str, score: f64, secs: i64, accuracy: f64) -> Vec<SessionRecord> {
        [-2.0, -1.0, 0.0, 1.0, 2.0]
            .into_iter()
            .zip(0_i64..)
            .map(|(offset, i)| {
                play(
                    id,
                    i * 1000 * SECOND,
                    score + offset * 10.0,
                    secs + i,
                    accuracy + offset * 0.01,
                )
            })
            .collect()
    }

    #[test]
    fn test_every_pair_is_compared_once() {
        let mut sessions = stage("tutorial", 500.0, 60, 0.9);
        sessions.extend(stage("normal", 1000.0, 120, 0.8));
        sessions.extend(stage("hard", 1000.0, 240, 0.6));

        let pairs = compare_stage_pairs(&sessions, i64::MAX);
        assert_eq!(
            pairs.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["hard_vs_normal", "hard_vs_tutorial", "normal_vs_tutorial"]
        );

        let pair = &pairs["normal_vs_tutorial"];
        assert_eq!((pair.stage_a.as_str(), pair.stage_b.as_str()), ("normal", "tutorial"));
        let score = pair.score.as_ref().unwrap();
        assert!((score.mean_difference - 500.0).abs() < 1e-9);
        assert!(score.significant);
        assert_eq!(score.effect, EffectMagnitude::VeryLarge);
        assert!(score.interval.unwrap().lower > 0.0);
        assert_eq!(
            pair.summary,
            vec![
                "normal scores significantly higher than tutorial",
                "tutorial is finished significantly faster than normal",
                "tutorial is played significantly more accurately than normal",
            ]
        );
        assert_eq!(pair.recommendations, vec!["Work on finishing normal faster"]);
    }

    #[test]
    fn test_equal_stages_show_no_difference() {
        let mut sessions = stage("a", 1000.0, 100, 0.8);
        sessions.extend(stage("b", 1000.0, 100, 0.8));

        let pairs = compare_stage_pairs(&sessions, i64::MAX);
        let pair = &pairs["a_vs_b"];
        let score = pair.score.as_ref().unwrap();
        assert!(!score.significant);
        assert_eq!(score.p_value, Some(1.0));
        assert_eq!(score.effect, EffectMagnitude::Negligible);
        assert_eq!(pair.summary, vec!["No significant difference between a and b"]);
        assert!(pair.recommendations.is_empty());
    }

    #[test]
    fn test_too_few_plays() {
        let mut sessions = stage("a", 1000.0, 100, 0.8);
        sessions.extend(stage("b", 400.0, 100, 0.8).into_iter().take(4));

        let pair = &compare_stage_pairs(&sessions, i64::MAX)["a_vs_b"];
        assert_eq!(pair.score, None);
        assert_eq!(pair.summary, vec!["No significant difference between a and b"]);
        // Recommendations compare means only.
        assert!(pair.recommendations.is_empty());
        let reversed = compare_pair("b", &samples(&sessions, "b"), "a", &samples(&sessions, "a"));
        assert_eq!(reversed.recommendations, vec!["Focus on raising your score on b"]);
    }

    #[test]
    fn test_constant_stages_have_no_t_test() {
        let flat = |id: &str, score| {
            (0..5)
                .map(|i| play(id, i * 1000 * SECOND, score, 100, 0.8))
                .collect::<Vec<_>>()
        };
        let mut sessions = flat("a", 700.0);
        sessions.extend(flat("b", 900.0));

        let pair = &compare_stage_pairs(&sessions, i64::MAX)["a_vs_b"];
        let score = pair.score.as_ref().unwrap();
        assert_eq!(score.t_statistic, None);
        assert!(!score.significant);
        assert_eq!(score.mean_difference, -200.0);
    }

    #[test]
    fn test_future_sessions_and_single_stage() {
        let sessions = stage("a", 1000.0, 100, 0.8);
        assert!(compare_stage_pairs(&sessions, i64::MAX).is_empty());

        let mut sessions = stage("a", 1000.0, 100, 0.8);
        sessions.extend(stage("b", 1000.0, 100, 0.8));
        assert!(compare_stage_pairs(&sessions, -1).is_empty());
    }

    fn samples(sessions: &[SessionRecord], id: &str) -> StageSamples {
        let stage = sessions
            .iter()
            .filter(|s| s.stage_id.as_deref() == Some(id))
            .collect::<Vec<_>>();
        StageSamples::from_sessions(&stage)
    }
}
