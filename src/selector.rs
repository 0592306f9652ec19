use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{QuizConfig, WeakTopicCriteria};
use crate::error::{QuizError, Result};
use crate::models::{Question, QuizMode, StoredQuestion, User};
use crate::store::QuizStore;
use crate::weak_topics::find_weak_topic_names;

/// A question set chosen ahead of the session that will play it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSet {
    pub mode: QuizMode,
    pub questions: Vec<Question>,
}

/// One-shot transfer slot between whoever prepares a set and the session
/// that consumes it. Taking empties the slot.
#[derive(Debug, Default)]
pub struct Handoff {
    slot: Option<PreparedSet>,
}

impl Handoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, set: PreparedSet) {
        if !self.is_empty() {
            log::debug!("replacing unconsumed prepared set");
        }
        self.slot = Some(set);
    }

    pub fn take(&mut self) -> Option<PreparedSet> {
        self.slot.take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

fn parse_all(raw: Vec<StoredQuestion>) -> Result<Vec<Question>> {
    raw.into_iter().map(StoredQuestion::parse).collect()
}

/// Fisher-Yates over the whole pool, then keep the first `count`.
pub fn shuffle_take<T, R: Rng + ?Sized>(mut items: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items.truncate(count);
    items
}

pub fn select_training<S, R>(
    store: &S,
    weak_topics: &[String],
    config: &QuizConfig,
    rng: &mut R,
) -> Result<Vec<Question>>
where
    S: QuizStore + ?Sized,
    R: Rng + ?Sized,
{
    if weak_topics.is_empty() {
        return Err(QuizError::NoWeakTopics);
    }

    let pool = parse_all(store.fetch_questions_by_topics(weak_topics, config.training_pool_limit)?)?;
    log::debug!(
        "training pool has {} questions across {:?}",
        pool.len(),
        weak_topics
    );

    let selected = shuffle_take(pool, config.questions_per_quiz, rng);
    if selected.is_empty() {
        return Err(QuizError::NoQuestionsAvailable);
    }
    Ok(selected)
}

pub fn select_practice<S, R>(
    store: &S,
    user: Option<&User>,
    config: &QuizConfig,
    rng: &mut R,
) -> Result<Vec<Question>>
where
    S: QuizStore + ?Sized,
    R: Rng + ?Sized,
{
    let target = config.questions_per_quiz;

    let raw = match user.filter(|u| !u.is_guest) {
        Some(user) => {
            log::debug!("smart practice selection for {}", user.id);
            store.fetch_smart_questions(&user.id, target)?
        }
        None => {
            let total = store.count_questions()?;
            let max_offset = total.saturating_sub(target);
            let offset = rng.gen_range(0..=max_offset);
            log::debug!("guest practice window at offset {} of {}", offset, total);
            store.fetch_random_questions(offset, target)?
        }
    };

    let questions = parse_all(raw)?;
    if questions.is_empty() {
        return Err(QuizError::NoQuestionsAvailable);
    }
    Ok(questions)
}

pub fn select_questions<S, R>(
    store: &S,
    mode: QuizMode,
    user: Option<&User>,
    weak_topics: &[String],
    config: &QuizConfig,
    rng: &mut R,
) -> Result<Vec<Question>>
where
    S: QuizStore + ?Sized,
    R: Rng + ?Sized,
{
    match mode {
        QuizMode::Training => select_training(store, weak_topics, config, rng),
        QuizMode::Practice => select_practice(store, user, config, rng),
    }
}

/// Classify the user's history and pick a training set from the weak topics.
pub fn prepare_training<S, R>(
    store: &S,
    user: Option<&User>,
    criteria: &WeakTopicCriteria,
    config: &QuizConfig,
    rng: &mut R,
) -> Result<PreparedSet>
where
    S: QuizStore + ?Sized,
    R: Rng + ?Sized,
{
    let topics = find_weak_topic_names(store, user, criteria);

    let questions = select_questions(store, QuizMode::Training, user, &topics, config, rng)?;
    log::info!(
        "prepared {} training questions for weak topics {}",
        questions.len(),
        topics.join(", ")
    );

    Ok(PreparedSet {
        mode: QuizMode::Training,
        questions,
    })
}

/// Questions for a session that is about to start: a handed-off set if one is
/// waiting, otherwise a fresh practice selection.
pub fn load_session_questions<S, R>(
    store: &S,
    user: Option<&User>,
    handoff: &mut Handoff,
    config: &QuizConfig,
    rng: &mut R,
) -> Result<PreparedSet>
where
    S: QuizStore + ?Sized,
    R: Rng + ?Sized,
{
    if let Some(set) = handoff.take() {
        if !set.questions.is_empty() {
            return Ok(set);
        }
        log::warn!("handed-off {} set was empty, falling back to practice", set.mode.as_str());
    }

    Ok(PreparedSet {
        mode: QuizMode::Practice,
        questions: select_questions(store, QuizMode::Practice, user, &[], config, rng)?,
    })
}
