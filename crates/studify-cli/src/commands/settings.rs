use clap::Subcommand;
use serde_json::json;
use studify_core::settings::{Settings, TimerDurations};

use crate::common;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current durations
    Show,
    /// Update durations (minutes)
    Set {
        #[arg(long)]
        work: Option<u32>,
        #[arg(long)]
        short_break: Option<u32>,
        #[arg(long)]
        long_break: Option<u32>,
    },
    /// Restore the default durations
    Reset,
    /// Delete every stored record (sessions, coins, homework, settings)
    ClearData {
        /// Required confirmation flag
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let services = common::open_services()?;
    let settings = Settings::new(services.store.clone());

    match action {
        SettingsAction::Show => {
            common::print_json(&settings.durations())?;
        }
        SettingsAction::Set {
            work,
            short_break,
            long_break,
        } => {
            let current = settings.durations();
            let updated = TimerDurations {
                work_min: work.unwrap_or(current.work_min),
                short_break_min: short_break.unwrap_or(current.short_break_min),
                long_break_min: long_break.unwrap_or(current.long_break_min),
            };
            settings.save(updated)?;
            common::print_json(&updated)?;
        }
        SettingsAction::Reset => {
            let defaults = settings.reset()?;
            common::print_json(&defaults)?;
        }
        SettingsAction::ClearData { yes } => {
            if !yes {
                eprintln!("this deletes all sessions, coins and homework; pass --yes to confirm");
                std::process::exit(1);
            }
            settings.clear_all_data()?;
            common::print_json(&json!({ "cleared": true }))?;
        }
    }
    Ok(())
}
