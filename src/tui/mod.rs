mod ui;
mod widgets;

use std::io;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::config::{QuizConfig, WeakTopicCriteria};
use crate::db::Database;
use crate::models::{QuizMode, User};
use crate::selector::{load_session_questions, prepare_training, Handoff};
use crate::session::{Effect, QuizEvent, QuizMachine, QuizState};
use crate::stats::{load_user_stats, TopicStat, UserStats};
use crate::tracker::execute_effects;
use crate::weak_topics::{find_weak_topics, WeakTopic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Topics,
    Quiz,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Dashboard => View::Topics,
            View::Topics => View::Dashboard,
            View::Quiz => View::Quiz,
        }
    }

    fn prev(&self) -> Self {
        // Only two browsable views
        self.next()
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }
}

// A display delay waiting to fire for one session
#[derive(Debug, Clone, Copy)]
struct Timer {
    due: Instant,
    session_id: u64,
}

pub struct App {
    db: Database,
    pub user: User,
    machine: QuizMachine,
    criteria: WeakTopicCriteria,
    rng: StdRng,
    handoff: Handoff,
    pub view: View,
    pub stats: UserStats,
    pub weak_topics: Vec<WeakTopic>,
    pub topics: StatefulList<TopicStat>,
    pub quiz: Option<QuizState>,
    next_session_id: u64,
    timer: Option<Timer>,
    pub should_quit: bool,
}

impl App {
    pub fn new(db: Database, user: User, config: QuizConfig, rng: StdRng) -> Self {
        let mut app = Self {
            db,
            user,
            machine: QuizMachine::new(config),
            criteria: WeakTopicCriteria::default(),
            rng,
            handoff: Handoff::new(),
            view: View::Dashboard,
            stats: UserStats::empty(),
            weak_topics: Vec::new(),
            topics: StatefulList::with_items(Vec::new()),
            quiz: None,
            next_session_id: 0,
            timer: None,
            should_quit: false,
        };
        app.refresh_data();
        app
    }

    pub fn config(&self) -> &QuizConfig {
        self.machine.config()
    }

    pub fn refresh_data(&mut self) {
        self.stats = load_user_stats(&self.db, Some(&self.user));
        self.weak_topics = find_weak_topics(&self.db, Some(&self.user), &self.criteria);
        self.topics = StatefulList::with_items(self.stats.topic_stats.values().cloned().collect());
    }

    pub fn start_practice(&mut self) {
        self.enter_quiz();
    }

    pub fn start_training(&mut self) {
        let config = self.machine.config().clone();
        match prepare_training(
            &self.db,
            Some(&self.user),
            &self.criteria,
            &config,
            &mut self.rng,
        ) {
            Ok(set) => {
                self.handoff.put(set);
                self.enter_quiz();
            }
            Err(e) => {
                log::info!("training unavailable: {}", e);
                self.view = View::Quiz;
                self.timer = None;
                self.quiz = Some(QuizState::Errored(e.kind()));
            }
        }
    }

    fn enter_quiz(&mut self) {
        self.view = View::Quiz;
        self.timer = None;
        self.quiz = Some(QuizState::Loading);
        self.run_effects(vec![Effect::FetchQuestions]);
    }

    fn leave_quiz(&mut self) {
        self.quiz = None;
        self.timer = None;
        self.view = View::Dashboard;
        self.refresh_data();
    }

    fn dispatch(&mut self, event: QuizEvent) {
        let Some(state) = self.quiz.take() else {
            return;
        };
        let transition = self.machine.transition(state, event);
        self.quiz = Some(transition.state);
        self.run_effects(transition.effects);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in execute_effects(&self.db, Some(&self.user), effects) {
            match effect {
                Effect::Schedule { session_id, delay } => {
                    self.timer = Some(Timer {
                        due: Instant::now() + delay,
                        session_id,
                    });
                }
                Effect::FetchQuestions => self.fetch_questions(),
                Effect::RecordAttempt { .. } => {}
            }
        }
    }

    fn fetch_questions(&mut self) {
        self.next_session_id += 1;
        let session_id = self.next_session_id;
        let config = self.machine.config().clone();

        let event = match load_session_questions(
            &self.db,
            Some(&self.user),
            &mut self.handoff,
            &config,
            &mut self.rng,
        ) {
            Ok(set) => QuizEvent::Loaded {
                session_id,
                set,
                at: Utc::now(),
            },
            Err(e) => {
                log::error!("could not load questions: {}", e);
                QuizEvent::LoadFailed(e.kind())
            }
        };
        self.dispatch(event);
    }

    /// Fire the pending display delay if it is due.
    fn tick(&mut self, now: Instant) {
        if self.timer.is_some_and(|t| t.due <= now) {
            self.fire_timer();
        }
    }

    fn fire_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.dispatch(QuizEvent::DelayElapsed {
                session_id: timer.session_id,
                at: Utc::now(),
            });
        }
    }

    fn handle_quiz_key(&mut self, key: KeyCode) {
        let (selected, option_count) = match self.quiz.as_ref().and_then(|q| q.active()) {
            Some(quiz) => (quiz.current_answer(), quiz.current_question().options.len()),
            None => (None, 0),
        };

        match key {
            KeyCode::Esc => self.leave_quiz(),
            KeyCode::Char('r') => self.dispatch(QuizEvent::Restart),
            KeyCode::Char('j') | KeyCode::Down if option_count > 0 => {
                let next = selected.map_or(0, |i| (i + 1) % option_count);
                self.dispatch(QuizEvent::Select(next));
            }
            KeyCode::Char('k') | KeyCode::Up if option_count > 0 => {
                let prev = selected.map_or(option_count - 1, |i| {
                    (i + option_count - 1) % option_count
                });
                self.dispatch(QuizEvent::Select(prev));
            }
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.dispatch(QuizEvent::Select(index));
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.dispatch(QuizEvent::Submit { at: Utc::now() })
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.view == View::Quiz {
            self.handle_quiz_key(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data();
            }

            KeyCode::Char('p') => self.start_practice(),
            KeyCode::Char('t') => self.start_training(),

            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
                self.view = self.view.prev()
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.view = self.view.next(),

            KeyCode::Char('j') | KeyCode::Down if self.view == View::Topics => self.topics.next(),
            KeyCode::Char('k') | KeyCode::Up if self.view == View::Topics => {
                self.topics.previous()
            }

            _ => {}
        }
    }
}

pub fn run(
    db: Database,
    user: User,
    config: QuizConfig,
    rng: StdRng,
    start: Option<QuizMode>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(db, user, config, rng);
    match start {
        Some(QuizMode::Practice) => app.start_practice(),
        Some(QuizMode::Training) => app.start_training(),
        None => {}
    }

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}
