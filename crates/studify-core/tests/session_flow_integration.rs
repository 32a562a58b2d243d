//! End-to-end session flow: timer completions feed the ledger, the
//! calendar counters and the pet, with services wired the way the app
//! wires them at startup.

use std::sync::Arc;

use chrono::Utc;
use studify_core::homework::NewHomework;
use studify_core::ledger::CoinLedger;
use studify_core::notify::MemoryNotifier;
use studify_core::pet::PetTracker;
use studify_core::settings::{Settings, TimerDurations};
use studify_core::stats::Statistics;
use studify_core::store::{KvStore, MemoryStore};
use studify_core::timer::{TimerController, TimerMode, TimerPhase};
use studify_core::{HomeworkStore, Priority};

struct App {
    store: Arc<dyn KvStore>,
    notifier: Arc<MemoryNotifier>,
    ledger: Arc<CoinLedger>,
    stats: Arc<Statistics>,
    settings: Settings,
}

impl App {
    fn new() -> Self {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let ledger = Arc::new(CoinLedger::new(store.clone()));
        let stats = Arc::new(Statistics::new(store.clone()));
        let settings = Settings::new(store.clone());
        Self {
            store,
            notifier: Arc::new(MemoryNotifier::new()),
            ledger,
            stats,
            settings,
        }
    }

    fn timer(&self) -> TimerController {
        TimerController::new(
            self.store.clone(),
            self.notifier.clone(),
            self.ledger.clone(),
            self.stats.clone(),
            self.settings.durations(),
        )
    }

    fn homework(&self) -> HomeworkStore {
        HomeworkStore::new(self.store.clone(), self.ledger.clone(), self.notifier.clone())
    }
}

fn run_to_completion(ctl: &mut TimerController, max_ticks: u64) -> u32 {
    let mut completions = 0;
    for _ in 0..max_ticks {
        if ctl.tick().unwrap().is_some() {
            completions += 1;
        }
    }
    completions
}

#[test]
fn work_then_break_cycle_pays_once_and_alternates_modes() {
    let app = App::new();
    app.settings
        .save(TimerDurations {
            work_min: 1,
            short_break_min: 1,
            long_break_min: 15,
        })
        .unwrap();

    let mut ctl = app.timer();
    ctl.start().unwrap();
    assert_eq!(run_to_completion(&mut ctl, 60), 1);

    // Work finished: paid, counted, flipped to an idle break.
    assert_eq!(app.ledger.balance(), 10);
    assert_eq!(app.stats.completed_sessions(), 1);
    assert_eq!(app.stats.sessions_on(Utc::now().date_naive()), 1);
    assert_eq!(ctl.engine().mode(), TimerMode::Break);
    assert_eq!(ctl.engine().phase(), TimerPhase::Idle);

    // The break pays nothing and flips back to work.
    ctl.start().unwrap();
    assert_eq!(run_to_completion(&mut ctl, 60), 1);
    assert_eq!(app.ledger.balance(), 10);
    assert_eq!(app.stats.completed_sessions(), 1);
    assert_eq!(ctl.engine().mode(), TimerMode::Work);

    // Streak reflects today's sessions.
    assert_eq!(app.stats.current_streak(Utc::now().date_naive()), 1);
}

#[test]
fn settings_observer_reconfigures_idle_timer() {
    let app = App::new();
    let mut ctl = app.timer();
    assert_eq!(ctl.engine().remaining_secs(), 25 * 60);

    app.settings
        .save(TimerDurations {
            work_min: 50,
            short_break_min: 10,
            long_break_min: 20,
        })
        .unwrap();
    ctl.apply_durations(&app.settings.durations());
    assert_eq!(ctl.engine().remaining_secs(), 50 * 60);
}

#[test]
fn homework_and_timer_share_one_ledger() {
    let app = App::new();
    app.settings
        .save(TimerDurations {
            work_min: 1,
            short_break_min: 1,
            long_break_min: 15,
        })
        .unwrap();

    let mut ctl = app.timer();
    ctl.start().unwrap();
    run_to_completion(&mut ctl, 60);

    let homework = app.homework();
    let item = homework
        .add(NewHomework {
            title: "Read chapter 4".into(),
            subject: "History".into(),
            due_date: Utc::now().date_naive(),
            priority: Priority::High,
            notes: String::new(),
        })
        .unwrap();
    homework.toggle_complete(&item.id).unwrap();

    // 10 from the session, 15 from the homework.
    assert_eq!(app.ledger.balance(), 25);
    let history = app.ledger.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount, 15);
    assert_eq!(history[1].amount, 10);
}

#[test]
fn pet_catches_up_with_completed_sessions() {
    let app = App::new();
    app.settings
        .save(TimerDurations {
            work_min: 1,
            short_break_min: 1,
            long_break_min: 15,
        })
        .unwrap();

    let mut ctl = app.timer();
    for _ in 0..3 {
        ctl.start().unwrap();
        run_to_completion(&mut ctl, 60);
        // Skip past the break.
        ctl.switch_mode();
    }
    assert_eq!(app.stats.completed_sessions(), 3);

    let pet = PetTracker::new(app.store.clone(), app.stats.clone());
    let progress = pet.sync().unwrap().unwrap();
    assert_eq!(progress.sessions_gained, 3);
    assert_eq!(progress.xp_gained, 30);
    assert!(pet.sync().unwrap().is_none());
}
