use std::sync::Arc;

use clap::Subcommand;
use studify_core::notify::NullNotifier;
use studify_core::settings::Settings;
use studify_core::store::keys;
use studify_core::timer::{PomodoroTimer, TimerController};

use crate::common::{self, Services};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown
    Start,
    /// Pause the running countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Back to idle with the full configured duration
    Reset,
    /// Toggle between work and break while idle
    Switch,
    /// Print the current timer state as JSON
    Status,
}

fn load_engine(services: &Services) -> PomodoroTimer {
    if let Ok(Some(json)) = services.store.get(keys::TIMER_ENGINE) {
        if let Ok(engine) = serde_json::from_str::<PomodoroTimer>(&json) {
            return engine;
        }
    }
    let durations = Settings::new(services.store.clone()).durations();
    PomodoroTimer::new(durations.work_min, durations.short_break_min)
}

fn save_engine(
    services: &Services,
    engine: &PomodoroTimer,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine)?;
    services.store.set(keys::TIMER_ENGINE, &json)?;
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let services = common::open_services()?;
    let engine = load_engine(&services);
    let mut ctl = TimerController::with_engine(
        engine,
        services.store.clone(),
        Arc::new(NullNotifier),
        services.ledger.clone(),
        services.stats.clone(),
    );

    // Reconcile a countdown left running by a previous invocation; a
    // deadline that already passed completes here, exactly once.
    if let Some(done) = ctl.restore()? {
        common::print_json(&done)?;
    }

    match action {
        TimerAction::Start => match ctl.start()? {
            Some(event) => common::print_json(&event)?,
            None => common::print_json(&ctl.snapshot())?,
        },
        TimerAction::Pause => match ctl.pause()? {
            Some(event) => common::print_json(&event)?,
            None => common::print_json(&ctl.snapshot())?,
        },
        TimerAction::Resume => match ctl.resume()? {
            Some(event) => common::print_json(&event)?,
            None => common::print_json(&ctl.snapshot())?,
        },
        TimerAction::Reset => {
            if let Some(event) = ctl.reset()? {
                common::print_json(&event)?;
            }
        }
        TimerAction::Switch => match ctl.switch_mode() {
            Some(event) => common::print_json(&event)?,
            None => eprintln!("stop the timer before switching modes"),
        },
        TimerAction::Status => {
            common::print_json(&ctl.snapshot())?;
        }
    }

    save_engine(&services, ctl.engine())?;
    Ok(())
}
