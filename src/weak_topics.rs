use serde::Serialize;

use crate::config::WeakTopicCriteria;
use crate::models::{Attempt, User};
use crate::stats::topic_stats;
use crate::store::QuizStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeakTopic {
    pub topic: String,
    pub accuracy: f64,
    pub attempts: u32,
}

/// Topics under the accuracy ceiling with enough samples, weakest first.
///
/// Ties keep the order topics first appear in the attempt history.
pub fn rank_weak_topics(attempts: &[Attempt], criteria: &WeakTopicCriteria) -> Vec<WeakTopic> {
    let mut weak: Vec<WeakTopic> = topic_stats(attempts)
        .into_values()
        .filter(|s| s.total >= criteria.min_samples)
        .map(|s| WeakTopic {
            accuracy: s.accuracy(),
            attempts: s.total,
            topic: s.topic,
        })
        .filter(|w| w.accuracy < criteria.accuracy_ceiling)
        .collect();

    weak.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));
    weak.truncate(criteria.max_count);
    weak
}

pub fn weak_topics(attempts: &[Attempt], criteria: &WeakTopicCriteria) -> Vec<String> {
    rank_weak_topics(attempts, criteria)
        .into_iter()
        .map(|w| w.topic)
        .collect()
}

// History for the current user. Guests have none to analyse and a failing
// store is treated as no data.
fn user_attempts<S: QuizStore + ?Sized>(store: &S, user: Option<&User>) -> Vec<Attempt> {
    let Some(user) = user.filter(|u| !u.is_guest) else {
        return vec![];
    };

    match store.fetch_attempts(&user.id) {
        Ok(attempts) => attempts,
        Err(e) => {
            log::warn!("could not classify topics for {}: {}", user.id, e);
            vec![]
        }
    }
}

/// Ranked weak topics for the current user.
pub fn find_weak_topics<S: QuizStore + ?Sized>(
    store: &S,
    user: Option<&User>,
    criteria: &WeakTopicCriteria,
) -> Vec<WeakTopic> {
    let weak = rank_weak_topics(&user_attempts(store, user), criteria);
    log::debug!(
        "weak topics: {:?}",
        weak.iter().map(|w| w.topic.as_str()).collect::<Vec<_>>()
    );
    weak
}

/// Weak topic names for the current user, weakest first.
pub fn find_weak_topic_names<S: QuizStore + ?Sized>(
    store: &S,
    user: Option<&User>,
    criteria: &WeakTopicCriteria,
) -> Vec<String> {
    weak_topics(&user_attempts(store, user), criteria)
}
