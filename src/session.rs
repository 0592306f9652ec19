//! Quiz session state machine.
//!
//! All session changes go through [`QuizMachine::transition`], which takes the
//! current state and an event and returns the next state plus a list of
//! [`Effect`]s for the caller to run. The machine never performs I/O and never
//! reads the clock; timestamps arrive on the events.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::QuizConfig;
use crate::error::ErrorKind;
use crate::models::{Question, QuizMode};
use crate::selector::PreparedSet;
use crate::stats::percent;

#[derive(Debug, Clone, PartialEq)]
pub enum QuizState {
    Loading,
    InProgress(ActiveQuiz),
    Completed(QuizSummary),
    GameOver(QuizSummary),
    Errored(ErrorKind),
}

impl QuizState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QuizState::Completed(_) | QuizState::GameOver(_) | QuizState::Errored(_)
        )
    }

    pub fn active(&self) -> Option<&ActiveQuiz> {
        match self {
            QuizState::InProgress(quiz) => Some(quiz),
            _ => None,
        }
    }
}

/// What the session is waiting on after an answer was checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Advance,
    RevealThenAdvance,
    ClearForRetry,
    EndGame,
}

/// Last checked answer, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct { selected: usize },
    Incorrect { selected: usize },
    Revealed { selected: usize, correct: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveQuiz {
    pub session_id: u64,
    pub mode: QuizMode,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub answers: Vec<Option<usize>>,
    pub lives_remaining: u32,
    pub attempts_on_current: u32,
    pub started_at: DateTime<Utc>,
    pub question_started_at: DateTime<Utc>,
    pub pending: Option<Pending>,
    pub feedback: Option<Feedback>,
}

impl ActiveQuiz {
    fn new(session_id: u64, set: PreparedSet, lives: u32, at: DateTime<Utc>) -> Self {
        let count = set.questions.len();
        Self {
            session_id,
            mode: set.mode,
            questions: set.questions,
            current_index: 0,
            answers: vec![None; count],
            lives_remaining: lives,
            attempts_on_current: 0,
            started_at: at,
            question_started_at: at,
            pending: None,
            feedback: None,
        }
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answers[self.current_index]
    }

    pub fn is_evaluating(&self) -> bool {
        self.pending.is_some()
    }

    /// 1-based position and total, as shown in a progress bar.
    pub fn progress(&self) -> (usize, usize) {
        (self.current_index + 1, self.questions.len())
    }

    /// Correct answers on every question up to and including the current one.
    pub fn score(&self) -> u32 {
        self.questions
            .iter()
            .zip(&self.answers)
            .take(self.current_index + 1)
            .filter(|(q, a)| **a == Some(q.correct_index))
            .count() as u32
    }

    fn summary(&self, at: DateTime<Utc>) -> QuizSummary {
        let score = self.score();
        let total = self.questions.len() as u32;
        let elapsed_ms = (at - self.started_at).num_milliseconds().max(0);

        QuizSummary {
            mode: self.mode,
            score,
            total_questions: total,
            questions_attempted: self.current_index as u32 + 1,
            percentage: percent(score, total),
            lives_remaining: self.lives_remaining,
            elapsed_seconds: ((elapsed_ms + 500) / 1000) as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSummary {
    pub mode: QuizMode,
    pub score: u32,
    pub total_questions: u32,
    pub questions_attempted: u32,
    pub percentage: u32,
    pub lives_remaining: u32,
    pub elapsed_seconds: u64,
}

impl QuizSummary {
    pub fn wrong_answers(&self) -> u32 {
        self.total_questions - self.score
    }

    pub fn elapsed_display(&self) -> String {
        format!("{}:{:02}", self.elapsed_seconds / 60, self.elapsed_seconds % 60)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    Loaded {
        session_id: u64,
        set: PreparedSet,
        at: DateTime<Utc>,
    },
    LoadFailed(ErrorKind),
    Select(usize),
    Submit {
        at: DateTime<Utc>,
    },
    DelayElapsed {
        session_id: u64,
        at: DateTime<Utc>,
    },
    Restart,
}

/// One checked answer, ready to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub question_id: i64,
    pub topic: String,
    pub selected_index: Option<usize>,
    pub is_correct: bool,
    pub time_taken_seconds: u32,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RecordAttempt {
        session_id: u64,
        mode: QuizMode,
        outcome: AttemptOutcome,
    },
    /// Deliver `DelayElapsed { session_id }` after `delay`.
    Schedule { session_id: u64, delay: Duration },
    FetchQuestions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: QuizState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: QuizState) -> Self {
        Self {
            state,
            effects: vec![],
        }
    }

    fn with(state: QuizState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }
}

pub struct QuizMachine {
    config: QuizConfig,
}

impl QuizMachine {
    pub fn new(config: QuizConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn transition(&self, state: QuizState, event: QuizEvent) -> Transition {
        match (state, event) {
            (QuizState::Loading, QuizEvent::Loaded { session_id, set, at }) => {
                if set.questions.is_empty() {
                    return Transition::to(QuizState::Errored(ErrorKind::NoQuestions));
                }
                log::info!(
                    "session {} started: {} questions in {}",
                    session_id,
                    set.questions.len(),
                    set.mode.as_str()
                );
                Transition::to(QuizState::InProgress(ActiveQuiz::new(
                    session_id,
                    set,
                    self.config.max_lives,
                    at,
                )))
            }

            (QuizState::Loading, QuizEvent::LoadFailed(kind))
            | (QuizState::InProgress(_), QuizEvent::LoadFailed(kind)) => {
                Transition::to(QuizState::Errored(kind))
            }

            (QuizState::InProgress(quiz), QuizEvent::Select(index)) => {
                Transition::to(self.select(quiz, index))
            }

            (QuizState::InProgress(quiz), QuizEvent::Submit { at }) => self.submit(quiz, at),

            (QuizState::InProgress(quiz), QuizEvent::DelayElapsed { session_id, at }) => {
                if session_id != quiz.session_id {
                    log::debug!(
                        "ignoring timer from session {} in session {}",
                        session_id,
                        quiz.session_id
                    );
                    return Transition::to(QuizState::InProgress(quiz));
                }
                Transition::to(self.resolve_pending(quiz, at))
            }

            (state, QuizEvent::Restart) if state.is_terminal() => {
                Transition::with(QuizState::Loading, vec![Effect::FetchQuestions])
            }

            (state, event) => {
                log::trace!("no transition for {:?} in {:?}", event, state);
                Transition::to(state)
            }
        }
    }

    fn select(&self, mut quiz: ActiveQuiz, index: usize) -> QuizState {
        if quiz.is_evaluating() || index >= quiz.current_question().options.len() {
            return QuizState::InProgress(quiz);
        }
        let current = quiz.current_index;
        quiz.answers[current] = Some(index);
        QuizState::InProgress(quiz)
    }

    fn submit(&self, mut quiz: ActiveQuiz, at: DateTime<Utc>) -> Transition {
        let selected = match quiz.current_answer() {
            Some(selected) if !quiz.is_evaluating() => selected,
            _ => return Transition::to(QuizState::InProgress(quiz)),
        };

        let question = quiz.current_question();
        let is_correct = question.is_correct(selected);
        let correct_index = question.correct_index;
        let taken_ms = (at - quiz.question_started_at).num_milliseconds().max(0);

        let record = Effect::RecordAttempt {
            session_id: quiz.session_id,
            mode: quiz.mode,
            outcome: AttemptOutcome {
                question_id: question.id,
                topic: question.topic.clone(),
                selected_index: Some(selected),
                is_correct,
                time_taken_seconds: ((taken_ms + 500) / 1000) as u32,
                at,
            },
        };

        let (pending, delay) = if is_correct {
            quiz.feedback = Some(Feedback::Correct { selected });
            (Pending::Advance, self.config.correct_delay)
        } else {
            quiz.lives_remaining = quiz.lives_remaining.saturating_sub(1);
            quiz.attempts_on_current += 1;

            if quiz.lives_remaining == 0 {
                quiz.feedback = Some(Feedback::Incorrect { selected });
                (Pending::EndGame, self.config.game_over_delay)
            } else if quiz.attempts_on_current >= self.config.max_attempts_per_question {
                quiz.feedback = Some(Feedback::Revealed {
                    selected,
                    correct: correct_index,
                });
                (Pending::RevealThenAdvance, self.config.reveal_delay)
            } else {
                quiz.feedback = Some(Feedback::Incorrect { selected });
                (Pending::ClearForRetry, self.config.retry_delay)
            }
        };

        quiz.pending = Some(pending);
        let schedule = Effect::Schedule {
            session_id: quiz.session_id,
            delay,
        };
        Transition::with(QuizState::InProgress(quiz), vec![record, schedule])
    }

    fn resolve_pending(&self, mut quiz: ActiveQuiz, at: DateTime<Utc>) -> QuizState {
        let Some(pending) = quiz.pending.take() else {
            return QuizState::InProgress(quiz);
        };
        let current = quiz.current_index;

        match pending {
            Pending::ClearForRetry => {
                quiz.answers[current] = None;
                quiz.feedback = None;
                QuizState::InProgress(quiz)
            }
            Pending::Advance => self.move_next(quiz, at),
            Pending::RevealThenAdvance => {
                quiz.answers[current] = None;
                self.move_next(quiz, at)
            }
            Pending::EndGame => {
                let summary = quiz.summary(at);
                log::info!(
                    "session {} game over at question {} with score {}",
                    quiz.session_id,
                    summary.questions_attempted,
                    summary.score
                );
                QuizState::GameOver(summary)
            }
        }
    }

    fn move_next(&self, mut quiz: ActiveQuiz, at: DateTime<Utc>) -> QuizState {
        if quiz.current_index + 1 < quiz.questions.len() {
            quiz.current_index += 1;
            quiz.attempts_on_current = 0;
            quiz.question_started_at = at;
            quiz.feedback = None;
            QuizState::InProgress(quiz)
        } else {
            let summary = quiz.summary(at);
            log::info!(
                "session {} completed: {}/{}",
                quiz.session_id,
                summary.score,
                summary.total_questions
            );
            QuizState::Completed(summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(seconds)
    }

    fn question(id: i64, correct: i64) -> Question {
        Question::new(
            id,
            "algebra",
            format!("question {}", id),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
        )
        .unwrap()
    }

    fn set(n: usize) -> PreparedSet {
        PreparedSet {
            mode: QuizMode::Practice,
            questions: (0..n).map(|i| question(i as i64 + 1, (i % 4) as i64)).collect(),
        }
    }

    fn machine() -> QuizMachine {
        QuizMachine::new(QuizConfig::default())
    }

    fn started(m: &QuizMachine, n: usize) -> QuizState {
        m.transition(
            QuizState::Loading,
            QuizEvent::Loaded {
                session_id: 1,
                set: set(n),
                at: t(0),
            },
        )
        .state
    }

    fn active(state: &QuizState) -> &ActiveQuiz {
        state.active().expect("expected an in-progress quiz")
    }

    /// Select, submit and let the display delay pass.
    fn answer(m: &QuizMachine, state: QuizState, option: usize, at: i64) -> (QuizState, Vec<Effect>) {
        let state = m.transition(state, QuizEvent::Select(option)).state;
        let submitted = m.transition(state, QuizEvent::Submit { at: t(at) });
        let elapsed = m.transition(
            submitted.state,
            QuizEvent::DelayElapsed {
                session_id: 1,
                at: t(at + 1),
            },
        );
        (elapsed.state, submitted.effects)
    }

    fn correct_option(state: &QuizState) -> usize {
        active(state).current_question().correct_index
    }

    fn wrong_option(state: &QuizState) -> usize {
        (correct_option(state) + 1) % 4
    }

    mod loading_tests {
        use super::*;

        #[test]
        fn loaded_initializes_session() {
            let m = machine();
            let state = started(&m, 5);
            let quiz = active(&state);
            assert_eq!(quiz.current_index, 0);
            assert_eq!(quiz.answers, vec![None; 5]);
            assert_eq!(quiz.lives_remaining, 5);
            assert_eq!(quiz.attempts_on_current, 0);
            assert_eq!(quiz.started_at, t(0));
            assert_eq!(quiz.progress(), (1, 5));
        }

        #[test]
        fn loaded_with_no_questions_errors() {
            let m = machine();
            let state = started(&m, 0);
            assert_eq!(state, QuizState::Errored(ErrorKind::NoQuestions));
        }

        #[test]
        fn load_failure_errors_with_kind() {
            let m = machine();
            let next = m.transition(
                QuizState::Loading,
                QuizEvent::LoadFailed(ErrorKind::NoWeakTopics),
            );
            assert_eq!(next.state, QuizState::Errored(ErrorKind::NoWeakTopics));
            assert!(next.effects.is_empty());
        }

        #[test]
        fn events_before_load_are_ignored() {
            let m = machine();
            let next = m.transition(QuizState::Loading, QuizEvent::Submit { at: t(1) });
            assert_eq!(next.state, QuizState::Loading);
            assert!(next.effects.is_empty());
        }
    }

    mod select_tests {
        use super::*;

        #[test]
        fn select_overwrites_previous_choice() {
            let m = machine();
            let state = m.transition(started(&m, 3), QuizEvent::Select(1)).state;
            let state = m.transition(state, QuizEvent::Select(3)).state;
            assert_eq!(active(&state).current_answer(), Some(3));
        }

        #[test]
        fn select_out_of_range_is_ignored() {
            let m = machine();
            let state = m.transition(started(&m, 3), QuizEvent::Select(9)).state;
            assert_eq!(active(&state).current_answer(), None);
        }

        #[test]
        fn select_while_evaluating_is_ignored() {
            let m = machine();
            let state = started(&m, 3);
            let right = correct_option(&state);
            let state = m.transition(state, QuizEvent::Select(right)).state;
            let state = m.transition(state, QuizEvent::Submit { at: t(1) }).state;
            let state = m.transition(state, QuizEvent::Select((right + 1) % 4)).state;
            assert_eq!(active(&state).current_answer(), Some(right));
        }
    }

    mod submit_tests {
        use super::*;

        #[test]
        fn submit_without_selection_is_noop() {
            let m = machine();
            let before = started(&m, 3);
            let next = m.transition(before.clone(), QuizEvent::Submit { at: t(1) });
            assert_eq!(next.state, before);
            assert!(next.effects.is_empty());
        }

        #[test]
        fn correct_answer_records_then_advances_after_delay() {
            let m = machine();
            let state = started(&m, 3);
            let right = correct_option(&state);
            let state = m.transition(state, QuizEvent::Select(right)).state;
            let next = m.transition(state, QuizEvent::Submit { at: t(4) });

            assert_eq!(next.effects.len(), 2);
            match &next.effects[0] {
                Effect::RecordAttempt {
                    session_id,
                    mode,
                    outcome,
                } => {
                    assert_eq!(*session_id, 1);
                    assert_eq!(*mode, QuizMode::Practice);
                    assert!(outcome.is_correct);
                    assert_eq!(outcome.question_id, 1);
                    assert_eq!(outcome.selected_index, Some(right));
                    assert_eq!(outcome.time_taken_seconds, 4);
                }
                other => panic!("Expected RecordAttempt, got {:?}", other),
            }
            assert_eq!(
                next.effects[1],
                Effect::Schedule {
                    session_id: 1,
                    delay: Duration::from_millis(800)
                }
            );

            let quiz = active(&next.state);
            assert_eq!(quiz.current_index, 0);
            assert_eq!(quiz.pending, Some(Pending::Advance));
            assert_eq!(quiz.feedback, Some(Feedback::Correct { selected: right }));

            let state = m
                .transition(
                    next.state,
                    QuizEvent::DelayElapsed {
                        session_id: 1,
                        at: t(5),
                    },
                )
                .state;
            let quiz = active(&state);
            assert_eq!(quiz.current_index, 1);
            assert_eq!(quiz.question_started_at, t(5));
            assert_eq!(quiz.lives_remaining, 5);
            assert!(quiz.feedback.is_none());
        }

        #[test]
        fn second_submit_during_delay_is_ignored() {
            let m = machine();
            let state = started(&m, 3);
            let wrong = wrong_option(&state);
            let state = m.transition(state, QuizEvent::Select(wrong)).state;
            let state = m.transition(state, QuizEvent::Submit { at: t(1) }).state;
            let again = m.transition(state, QuizEvent::Submit { at: t(1) });

            assert!(again.effects.is_empty());
            assert_eq!(active(&again.state).lives_remaining, 4);
        }

        #[test]
        fn wrong_answer_costs_a_life_and_clears_for_retry() {
            let m = machine();
            let state = started(&m, 3);
            let wrong = wrong_option(&state);
            let state = m.transition(state, QuizEvent::Select(wrong)).state;
            let next = m.transition(state, QuizEvent::Submit { at: t(2) });

            assert_eq!(
                next.effects[1],
                Effect::Schedule {
                    session_id: 1,
                    delay: Duration::from_millis(600)
                }
            );
            let quiz = active(&next.state);
            assert_eq!(quiz.lives_remaining, 4);
            assert_eq!(quiz.attempts_on_current, 1);
            assert_eq!(quiz.pending, Some(Pending::ClearForRetry));

            let state = m
                .transition(
                    next.state,
                    QuizEvent::DelayElapsed {
                        session_id: 1,
                        at: t(3),
                    },
                )
                .state;
            let quiz = active(&state);
            assert_eq!(quiz.current_index, 0);
            assert_eq!(quiz.current_answer(), None);
            assert_eq!(quiz.attempts_on_current, 1);
            assert!(!quiz.is_evaluating());
        }

        #[test]
        fn three_misses_reveal_and_advance() {
            let m = machine();
            let mut state = started(&m, 3);
            let wrong = wrong_option(&state);

            for i in 0..2 {
                state = answer(&m, state, wrong, i * 2).0;
            }
            let state = m.transition(state, QuizEvent::Select(wrong)).state;
            let next = m.transition(state, QuizEvent::Submit { at: t(10) });

            assert_eq!(
                next.effects[1],
                Effect::Schedule {
                    session_id: 1,
                    delay: Duration::from_millis(1500)
                }
            );
            let quiz = active(&next.state);
            // One life per wrong submission
            assert_eq!(quiz.lives_remaining, 2);
            assert_eq!(quiz.attempts_on_current, 3);
            assert_eq!(
                quiz.feedback,
                Some(Feedback::Revealed {
                    selected: wrong,
                    correct: quiz.current_question().correct_index
                })
            );

            let state = m
                .transition(
                    next.state,
                    QuizEvent::DelayElapsed {
                        session_id: 1,
                        at: t(12),
                    },
                )
                .state;
            let quiz = active(&state);
            assert_eq!(quiz.current_index, 1);
            assert_eq!(quiz.attempts_on_current, 0);
            assert_eq!(quiz.answers[0], None);
            assert_eq!(quiz.lives_remaining, 2);
        }

        #[test]
        fn every_submission_is_recorded_in_order() {
            let m = machine();
            let state = started(&m, 3);
            let wrong = wrong_option(&state);
            let right = correct_option(&state);

            let (state, first) = answer(&m, state, wrong, 1);
            let (_, second) = answer(&m, state, right, 5);

            let outcomes: Vec<bool> = first
                .iter()
                .chain(second.iter())
                .filter_map(|e| match e {
                    Effect::RecordAttempt { outcome, .. } => Some(outcome.is_correct),
                    _ => None,
                })
                .collect();
            assert_eq!(outcomes, vec![false, true]);
        }
    }

    mod terminal_tests {
        use super::*;

        #[test]
        fn completing_all_questions() {
            let m = machine();
            let mut state = started(&m, 4);

            // Miss once on question 1, get everything else right
            for i in 0..4 {
                if i == 1 {
                    let wrong = wrong_option(&state);
                    state = answer(&m, state, wrong, 10 * i).0;
                }
                let right = correct_option(&state);
                state = answer(&m, state, right, 10 * i + 5).0;
            }

            match state {
                QuizState::Completed(summary) => {
                    assert_eq!(summary.score, 4);
                    assert_eq!(summary.total_questions, 4);
                    assert_eq!(summary.percentage, 100);
                    assert_eq!(summary.lives_remaining, 4);
                    assert_eq!(summary.wrong_answers(), 0);
                    assert_eq!(summary.elapsed_seconds, 36);
                    assert_eq!(summary.elapsed_display(), "0:36");
                }
                other => panic!("Expected Completed, got {:?}", other),
            }
        }

        #[test]
        fn abandoned_question_does_not_score() {
            let m = machine();
            let mut state = started(&m, 2);
            let wrong = wrong_option(&state);
            for i in 0..3 {
                state = answer(&m, state, wrong, i).0;
            }
            let right = correct_option(&state);
            state = answer(&m, state, right, 10).0;

            match state {
                QuizState::Completed(summary) => {
                    assert_eq!(summary.score, 1);
                    assert_eq!(summary.percentage, 50);
                    assert_eq!(summary.lives_remaining, 2);
                }
                other => panic!("Expected Completed, got {:?}", other),
            }
        }

        #[test]
        fn losing_last_life_is_game_over() {
            let m = machine();
            let mut state = started(&m, 5);

            // Question 0 right, question 1 abandoned after 3 misses
            let right = correct_option(&state);
            state = answer(&m, state, right, 0).0;
            let wrong = wrong_option(&state);
            for i in 0..3 {
                state = answer(&m, state, wrong, 10 + i).0;
            }
            assert_eq!(active(&state).current_index, 2);
            assert_eq!(active(&state).lives_remaining, 2);

            // Two more misses on question 2 use up the last lives
            let wrong = wrong_option(&state);
            state = answer(&m, state, wrong, 20).0;
            let state = m.transition(state, QuizEvent::Select(wrong)).state;
            let next = m.transition(state, QuizEvent::Submit { at: t(30) });
            assert_eq!(
                next.effects[1],
                Effect::Schedule {
                    session_id: 1,
                    delay: Duration::from_millis(1000)
                }
            );
            let quiz = active(&next.state);
            assert_eq!(quiz.lives_remaining, 0);
            assert_eq!(quiz.current_index, 2);

            let state = m
                .transition(
                    next.state,
                    QuizEvent::DelayElapsed {
                        session_id: 1,
                        at: t(31),
                    },
                )
                .state;
            match state {
                QuizState::GameOver(summary) => {
                    assert_eq!(summary.score, 1);
                    assert_eq!(summary.questions_attempted, 3);
                    assert_eq!(summary.total_questions, 5);
                    assert_eq!(summary.lives_remaining, 0);
                }
                other => panic!("Expected GameOver, got {:?}", other),
            }
        }

        #[test]
        fn game_over_on_first_question_scores_zero() {
            let config = QuizConfig {
                max_lives: 1,
                ..QuizConfig::default()
            };
            let m = QuizMachine::new(config);
            let state = started(&m, 3);
            let wrong = wrong_option(&state);
            let (state, _) = answer(&m, state, wrong, 1);

            match state {
                QuizState::GameOver(summary) => {
                    assert_eq!(summary.score, 0);
                    assert_eq!(summary.questions_attempted, 1);
                }
                other => panic!("Expected GameOver, got {:?}", other),
            }
        }
    }

    mod timer_tests {
        use super::*;

        #[test]
        fn stale_timer_is_ignored() {
            let m = machine();
            let state = started(&m, 3);
            let wrong = wrong_option(&state);
            let state = m.transition(state, QuizEvent::Select(wrong)).state;
            let state = m.transition(state, QuizEvent::Submit { at: t(1) }).state;

            let next = m.transition(
                state.clone(),
                QuizEvent::DelayElapsed {
                    session_id: 99,
                    at: t(2),
                },
            );
            assert_eq!(next.state, state);
        }

        #[test]
        fn timer_without_pending_is_ignored() {
            let m = machine();
            let state = started(&m, 3);
            let next = m.transition(
                state.clone(),
                QuizEvent::DelayElapsed {
                    session_id: 1,
                    at: t(2),
                },
            );
            assert_eq!(next.state, state);
        }
    }

    mod restart_tests {
        use super::*;

        #[test]
        fn restart_from_terminal_states_reloads() {
            let m = machine();
            let summary = QuizSummary {
                mode: QuizMode::Training,
                score: 1,
                total_questions: 2,
                questions_attempted: 2,
                percentage: 50,
                lives_remaining: 3,
                elapsed_seconds: 10,
            };
            for state in [
                QuizState::Completed(summary.clone()),
                QuizState::GameOver(summary),
                QuizState::Errored(ErrorKind::Transport),
            ] {
                let next = m.transition(state, QuizEvent::Restart);
                assert_eq!(next.state, QuizState::Loading);
                assert_eq!(next.effects, vec![Effect::FetchQuestions]);
            }
        }

        #[test]
        fn restart_mid_quiz_is_ignored() {
            let m = machine();
            let state = started(&m, 3);
            let next = m.transition(state.clone(), QuizEvent::Restart);
            assert_eq!(next.state, state);
            assert!(next.effects.is_empty());
        }

        #[test]
        fn fetch_failure_mid_quiz_errors() {
            let m = machine();
            let next = m.transition(
                started(&m, 3),
                QuizEvent::LoadFailed(ErrorKind::Malformed),
            );
            assert_eq!(next.state, QuizState::Errored(ErrorKind::Malformed));
        }
    }
}
