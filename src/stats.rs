use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{Attempt, User};
use crate::store::QuizStore;

/// Shown in place of a weakest topic when nothing qualifies.
pub const NO_DATA: &str = "no data";

/// Topics need this many attempts before they can be called the weakest.
pub const WEAKEST_TOPIC_MIN_SAMPLES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicStat {
    pub topic: String,
    pub correct: u32,
    pub total: u32,
}

impl TopicStat {
    fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            correct: 0,
            total: 0,
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    pub fn accuracy_percent(&self) -> u32 {
        percent(self.correct, self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub total_questions: u32,
    pub accuracy_rate: u32,
    pub current_streak: u32,
    pub weakest_topic: String,
    /// Per-topic counts in first-encountered order.
    pub topic_stats: IndexMap<String, TopicStat>,
}

impl UserStats {
    pub fn empty() -> Self {
        Self {
            total_questions: 0,
            accuracy_rate: 0,
            current_streak: 0,
            weakest_topic: NO_DATA.to_string(),
            topic_stats: IndexMap::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.total_questions > 0
    }
}

/// `round(100 * part / whole)` with halves rounding up, 0 when `whole` is 0.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (part as u64, whole as u64);
    ((200 * part + whole) / (2 * whole)) as u32
}

/// Group attempts by topic, keeping the order topics first appear in.
pub fn topic_stats(attempts: &[Attempt]) -> IndexMap<String, TopicStat> {
    let mut stats: IndexMap<String, TopicStat> = IndexMap::new();
    for attempt in attempts {
        let entry = stats
            .entry(attempt.topic.clone())
            .or_insert_with(|| TopicStat::new(&attempt.topic));
        entry.total += 1;
        if attempt.is_correct {
            entry.correct += 1;
        }
    }
    stats
}

/// Consecutive correct answers counting back from the most recent attempt.
pub fn current_streak(attempts: &[Attempt]) -> u32 {
    let mut ordered: Vec<&Attempt> = attempts.iter().collect();
    // Ties on timestamp fall back to insertion order
    ordered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

    ordered.iter().take_while(|a| a.is_correct).count() as u32
}

fn weakest_topic(stats: &IndexMap<String, TopicStat>) -> Option<&TopicStat> {
    let mut weakest: Option<&TopicStat> = None;
    for stat in stats.values() {
        if stat.total < WEAKEST_TOPIC_MIN_SAMPLES {
            continue;
        }
        match weakest {
            Some(w) if stat.accuracy() >= w.accuracy() => {}
            _ => weakest = Some(stat),
        }
    }
    weakest
}

pub fn aggregate(attempts: &[Attempt]) -> UserStats {
    if attempts.is_empty() {
        return UserStats::empty();
    }

    let total = attempts.len() as u32;
    let correct = attempts.iter().filter(|a| a.is_correct).count() as u32;
    let topic_stats = topic_stats(attempts);
    let weakest_topic = weakest_topic(&topic_stats)
        .map(|s| s.topic.clone())
        .unwrap_or_else(|| NO_DATA.to_string());

    UserStats {
        total_questions: total,
        accuracy_rate: percent(correct, total),
        current_streak: current_streak(attempts),
        weakest_topic,
        topic_stats,
    }
}

/// Stats for whoever is playing. Guests and store failures get zeroed stats.
pub fn load_user_stats<S: QuizStore + ?Sized>(store: &S, user: Option<&User>) -> UserStats {
    let Some(user) = user.filter(|u| !u.is_guest) else {
        log::debug!("no registered user, returning empty stats");
        return UserStats::empty();
    };

    match store.fetch_attempts(&user.id) {
        Ok(attempts) => aggregate(&attempts),
        Err(e) => {
            log::warn!("failed to load attempts for {}: {}", user.id, e);
            UserStats::empty()
        }
    }
}
