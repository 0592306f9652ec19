use crate::error::Result;
use crate::models::{Attempt, MasteryRecord, NewAttempt, StoredQuestion};

/// Everything the quiz core needs from persistent storage.
///
/// Question fetches hand back `StoredQuestion`s with options still serialized;
/// turning them into `Question`s is the selector's job.
pub trait QuizStore {
    fn fetch_attempts(&self, user_id: &str) -> Result<Vec<Attempt>>;

    fn fetch_questions_by_topics(
        &self,
        topics: &[String],
        limit: usize,
    ) -> Result<Vec<StoredQuestion>>;

    fn count_questions(&self) -> Result<usize>;

    fn fetch_random_questions(&self, offset: usize, limit: usize) -> Result<Vec<StoredQuestion>>;

    /// Store-side ranking for signed-in practice runs. Treated as a black box.
    fn fetch_smart_questions(&self, user_id: &str, limit: usize) -> Result<Vec<StoredQuestion>>;

    fn insert_attempt(&self, attempt: &NewAttempt) -> Result<i64>;

    fn get_mastery_record(&self, user_id: &str, question_id: i64)
        -> Result<Option<MasteryRecord>>;

    /// Upsert keyed on `(user_id, question_id)`. A record without `mastered_at`
    /// leaves any existing timestamp in place.
    fn upsert_mastery_record(&self, record: &MasteryRecord) -> Result<()>;
}
