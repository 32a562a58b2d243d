use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use studify_core::settings::Settings;

use crate::common;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Print counters, totals and the current streak
    Show,
    /// Print per-day session counts
    Calendar,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let services = common::open_services()?;
    let settings = Settings::new(services.store.clone());
    let today = Utc::now().date_naive();

    match action {
        StatsAction::Show => {
            let durations = settings.durations();
            common::print_json(&json!({
                "completedSessions": services.stats.completed_sessions(),
                "sessionsToday": services.stats.sessions_on(today),
                "currentStreak": services.stats.current_streak(today),
                "totalStudyMin": services.stats.total_study_minutes(durations.work_min),
                "totalBreakMin": services.stats.total_break_minutes(durations.short_break_min),
                "appUsageTodayMin": services.stats.app_usage_on(today),
                "coinBalance": services.ledger.balance(),
            }))?;
        }
        StatsAction::Calendar => {
            common::print_json(&services.stats.calendar())?;
        }
    }
    Ok(())
}
