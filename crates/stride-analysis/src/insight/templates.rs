use crate::metric::MetricKey;

/// Practice advice for one metric.
#[derive(Debug, Clone, Copy)]
pub struct MetricPractice {
    pub metric: MetricKey,
    /// One-line recommendation.
    pub focus: &'static str,
    /// Concrete practice steps, most important first.
    pub practices: &'static [&'static str],
    /// How a strength in this metric can be carried elsewhere.
    pub leverage: &'static str,
}

/// Fixed table of practice advice, one entry per metric.
#[derive(Debug, Clone)]
pub struct PracticeTemplates {
    entries: [MetricPractice; 5],
}

impl PracticeTemplates {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            entries: [
                MetricPractice {
                    metric: MetricKey::Score,
                    focus: "Work on raising your score in the stages where it dropped",
                    practices: &[
                        "Replay a recent stage and aim to beat your best score",
                        "Study your highest-scoring runs for bonus opportunities",
                        "Prioritize bonus targets over raw speed",
                    ],
                    leverage: "Apply your scoring routine to the stages where your score is lowest",
                },
                MetricPractice {
                    metric: MetricKey::Accuracy,
                    focus: "Slow down and prioritize precise inputs",
                    practices: &[
                        "Start each session with a short accuracy-only warm-up",
                        "Lower your pace until accuracy holds above your target",
                        "Review the sections where most misses happen",
                    ],
                    leverage: "Use your precision to attempt harder stages",
                },
                MetricPractice {
                    metric: MetricKey::PlayTime,
                    focus: "Build a steady, regular practice habit",
                    practices: &[
                        "Schedule short sessions on fixed days",
                        "Finish full runs instead of quitting early",
                        "Track your weekly play time",
                    ],
                    leverage: "Spend part of your regular practice time on your weakest metric",
                },
                MetricPractice {
                    metric: MetricKey::CompletionRate,
                    focus: "Complete more of the stages you start",
                    practices: &[
                        "Practice the hardest section of unfinished stages on its own",
                        "Pick one stage and play it until you clear it",
                        "Drop to an easier difficulty until clears are reliable",
                    ],
                    leverage: "Take on stages you have not cleared yet",
                },
                MetricPractice {
                    metric: MetricKey::MaxCombo,
                    focus: "Extend your combo chains",
                    practices: &[
                        "Drill the patterns that most often break your combo",
                        "Aim to hold each combo a few hits longer than last time",
                        "Favor steady play over risky high-value moves",
                    ],
                    leverage: "Use your combo control to push for higher scores",
                },
            ],
        }
    }

    #[must_use]
    pub fn get(&self, metric: MetricKey) -> &MetricPractice {
        // Entries are stored in `MetricKey` declaration order.
        &self.entries[metric as usize]
    }
}

impl Default for PracticeTemplates {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_metric_has_a_template() {
        let templates = PracticeTemplates::standard();
        for key in MetricKey::ALL {
            let practice = templates.get(key);
            assert_eq!(practice.metric, key);
            assert!(!practice.practices.is_empty());
        }
    }
}
