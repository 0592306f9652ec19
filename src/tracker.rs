use crate::error::Result;
use crate::models::{MasteryRecord, NewAttempt, QuizMode, User};
use crate::session::{AttemptOutcome, Effect};
use crate::store::QuizStore;

/// Records answers for the signed-in user. Guests are never tracked.
pub struct MasteryTracker<'a, S: QuizStore + ?Sized> {
    store: &'a S,
    user: Option<&'a User>,
    mode: QuizMode,
}

impl<'a, S: QuizStore + ?Sized> MasteryTracker<'a, S> {
    pub fn new(store: &'a S, user: Option<&'a User>, mode: QuizMode) -> Self {
        Self { store, user, mode }
    }

    /// Best effort. Failures are logged and dropped.
    pub fn record_attempt(&self, outcome: &AttemptOutcome) {
        if let Err(e) = self.try_record_attempt(outcome) {
            log::error!(
                "failed to record attempt on question {}: {}",
                outcome.question_id,
                e
            );
        }
    }

    pub fn try_record_attempt(&self, outcome: &AttemptOutcome) -> Result<()> {
        let Some(user) = self.user.filter(|u| !u.is_guest) else {
            return Ok(());
        };

        // The history append and the mastery upsert succeed or fail independently
        if let Err(e) = self.store.insert_attempt(&NewAttempt {
            user_id: user.id.clone(),
            question_id: outcome.question_id,
            topic: outcome.topic.clone(),
            selected_index: outcome.selected_index,
            is_correct: outcome.is_correct,
            time_taken_seconds: outcome.time_taken_seconds,
            timestamp: outcome.at,
        }) {
            log::error!(
                "failed to append attempt on question {} for {}: {}",
                outcome.question_id,
                user.id,
                e
            );
        }

        // Training runs only feed the attempt history
        if self.mode == QuizMode::Training {
            return Ok(());
        }

        let record = if outcome.is_correct {
            MasteryRecord {
                user_id: user.id.clone(),
                question_id: outcome.question_id,
                wrong_attempts: 0,
                mastered_at: Some(outcome.at),
            }
        } else {
            let existing = self
                .store
                .get_mastery_record(&user.id, outcome.question_id)?
                .map(|r| r.wrong_attempts)
                .unwrap_or(0);
            MasteryRecord {
                user_id: user.id.clone(),
                question_id: outcome.question_id,
                wrong_attempts: existing + 1,
                mastered_at: None,
            }
        };

        self.store.upsert_mastery_record(&record)
    }
}

/// Run the store-bound effects and hand back the rest (timers, fetches) for
/// the caller to schedule.
pub fn execute_effects<S: QuizStore + ?Sized>(
    store: &S,
    user: Option<&User>,
    effects: Vec<Effect>,
) -> Vec<Effect> {
    let mut remaining = Vec::new();
    for effect in effects {
        match effect {
            Effect::RecordAttempt {
                session_id,
                mode,
                outcome,
            } => {
                log::debug!(
                    "session {}: recording {} answer on question {}",
                    session_id,
                    if outcome.is_correct { "correct" } else { "wrong" },
                    outcome.question_id
                );
                MasteryTracker::new(store, user, mode).record_attempt(&outcome);
            }
            other => remaining.push(other),
        }
    }
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::{DateTime, TimeZone, Utc};
    use std::time::Duration;

    fn setup_db() -> (Database, i64) {
        let db = Database::open(":memory:").unwrap();
        db.init().unwrap();
        let qid = db
            .add_question("algebra", "2x = 4, x = ?", r#"["1", "2", "4"]"#, 1)
            .unwrap();
        (db, qid)
    }

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 10, minute, 0).unwrap()
    }

    fn outcome(question_id: i64, is_correct: bool, minute: u32) -> AttemptOutcome {
        AttemptOutcome {
            question_id,
            topic: "algebra".to_string(),
            selected_index: Some(if is_correct { 1 } else { 0 }),
            is_correct,
            time_taken_seconds: 7,
            at: at(minute),
        }
    }

    mod record_tests {
        use super::*;

        #[test]
        fn guest_writes_nothing() {
            let (db, qid) = setup_db();
            let guest = User::guest();
            let tracker = MasteryTracker::new(&db, Some(&guest), QuizMode::Practice);
            tracker.try_record_attempt(&outcome(qid, true, 1)).unwrap();

            assert!(db.attempts_for_user(&guest.id).unwrap().is_empty());
            assert!(db.get_mastery(&guest.id, qid).unwrap().is_none());
        }

        #[test]
        fn no_user_writes_nothing() {
            let (db, qid) = setup_db();
            let tracker = MasteryTracker::new(&db, None, QuizMode::Practice);
            tracker.try_record_attempt(&outcome(qid, false, 1)).unwrap();
            assert!(db.get_mastery("u1", qid).unwrap().is_none());
        }

        #[test]
        fn practice_appends_attempt_and_tracks_mastery() {
            let (db, qid) = setup_db();
            let user = User::registered("u1");
            let tracker = MasteryTracker::new(&db, Some(&user), QuizMode::Practice);

            tracker.try_record_attempt(&outcome(qid, false, 1)).unwrap();
            tracker.try_record_attempt(&outcome(qid, false, 2)).unwrap();

            let attempts = db.attempts_for_user("u1").unwrap();
            assert_eq!(attempts.len(), 2);
            assert_eq!(attempts[0].time_taken_seconds, 7);
            assert_eq!(attempts[0].selected_index, Some(0));

            let record = db.get_mastery("u1", qid).unwrap().unwrap();
            assert_eq!(record.wrong_attempts, 2);
            assert!(!record.is_mastered());
        }

        #[test]
        fn correct_after_failures_masters_question() {
            let (db, qid) = setup_db();
            let user = User::registered("u1");
            let tracker = MasteryTracker::new(&db, Some(&user), QuizMode::Practice);

            tracker.try_record_attempt(&outcome(qid, false, 1)).unwrap();
            tracker.try_record_attempt(&outcome(qid, true, 2)).unwrap();

            let record = db.get_mastery("u1", qid).unwrap().unwrap();
            assert_eq!(record.wrong_attempts, 0);
            assert_eq!(record.mastered_at, Some(at(2)));
        }

        #[test]
        fn wrong_after_mastery_keeps_mastered_at() {
            let (db, qid) = setup_db();
            let user = User::registered("u1");
            let tracker = MasteryTracker::new(&db, Some(&user), QuizMode::Practice);

            tracker.try_record_attempt(&outcome(qid, true, 1)).unwrap();
            tracker.try_record_attempt(&outcome(qid, false, 2)).unwrap();

            let record = db.get_mastery("u1", qid).unwrap().unwrap();
            assert_eq!(record.wrong_attempts, 1);
            assert_eq!(record.mastered_at, Some(at(1)));
        }

        #[test]
        fn training_skips_mastery() {
            let (db, qid) = setup_db();
            let user = User::registered("u1");
            let tracker = MasteryTracker::new(&db, Some(&user), QuizMode::Training);

            tracker.try_record_attempt(&outcome(qid, true, 1)).unwrap();
            tracker.try_record_attempt(&outcome(qid, false, 2)).unwrap();

            assert_eq!(db.attempts_for_user("u1").unwrap().len(), 2);
            assert!(db.get_mastery("u1", qid).unwrap().is_none());
        }

        #[test]
        fn store_failure_is_swallowed() {
            let db = Database::open(":memory:").unwrap();
            let user = User::registered("u1");
            let tracker = MasteryTracker::new(&db, Some(&user), QuizMode::Practice);

            assert!(tracker.try_record_attempt(&outcome(1, true, 1)).is_err());
            // Must not panic
            tracker.record_attempt(&outcome(1, true, 1));
        }

        #[test]
        fn mastery_written_when_attempt_append_fails() {
            let (db, qid) = setup_db();
            db.conn().execute_batch("DROP TABLE user_attempts;").unwrap();
            let user = User::registered("u1");
            let tracker = MasteryTracker::new(&db, Some(&user), QuizMode::Practice);

            tracker.record_attempt(&outcome(qid, true, 3));

            let record = db.get_mastery("u1", qid).unwrap().unwrap();
            assert_eq!(record.wrong_attempts, 0);
            assert_eq!(record.mastered_at, Some(at(3)));
        }

        #[test]
        fn attempt_appended_when_mastery_upsert_fails() {
            let (db, qid) = setup_db();
            db.conn()
                .execute_batch("DROP TABLE user_mastered_questions;")
                .unwrap();
            let user = User::registered("u1");
            let tracker = MasteryTracker::new(&db, Some(&user), QuizMode::Practice);

            assert!(tracker.try_record_attempt(&outcome(qid, false, 1)).is_err());
            assert_eq!(db.attempts_for_user("u1").unwrap().len(), 1);
        }
    }

    mod execute_tests {
        use super::*;

        #[test]
        fn records_and_passes_through_other_effects() {
            let (db, qid) = setup_db();
            let user = User::registered("u1");
            let effects = vec![
                Effect::RecordAttempt {
                    session_id: 3,
                    mode: QuizMode::Practice,
                    outcome: outcome(qid, true, 1),
                },
                Effect::Schedule {
                    session_id: 3,
                    delay: Duration::from_millis(800),
                },
                Effect::FetchQuestions,
            ];

            let remaining = execute_effects(&db, Some(&user), effects);

            assert_eq!(
                remaining,
                vec![
                    Effect::Schedule {
                        session_id: 3,
                        delay: Duration::from_millis(800)
                    },
                    Effect::FetchQuestions,
                ]
            );
            assert_eq!(db.attempts_for_user("u1").unwrap().len(), 1);
            assert!(db.get_mastery("u1", qid).unwrap().unwrap().is_mastered());
        }

        #[test]
        fn records_in_submission_order() {
            let (db, qid) = setup_db();
            let user = User::registered("u1");
            let effects = vec![false, false, true]
                .into_iter()
                .enumerate()
                .map(|(i, correct)| Effect::RecordAttempt {
                    session_id: 1,
                    mode: QuizMode::Practice,
                    outcome: outcome(qid, correct, i as u32),
                })
                .collect();

            assert!(execute_effects(&db, Some(&user), effects).is_empty());

            let attempts = db.attempts_for_user("u1").unwrap();
            let results: Vec<bool> = attempts.iter().map(|a| a.is_correct).collect();
            assert_eq!(results, vec![false, false, true]);
        }
    }
}
