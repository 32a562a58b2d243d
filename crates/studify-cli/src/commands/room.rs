use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use serde_json::json;
use studify_core::config::AppConfig;
use studify_core::identity::Identity;
use studify_core::room::{HttpRealtimeDb, RoomService};

use crate::common;

#[derive(Subcommand)]
pub enum RoomAction {
    /// Create a room and print its shareable code
    Create,
    /// Join a room by code
    Join { code: String },
    /// Leave a room; the room is deleted when the last member leaves
    Leave { code: String },
    /// Print the room document
    Status { code: String },
    /// Record one focused minute and refresh the room aggregate
    Tick { code: String },
    /// Toggle your break flag
    Break { code: String },
    /// Toggle your pause flag
    Pause { code: String },
    /// Clear break and pause and get back to studying
    Study { code: String },
    /// Follow room changes for a while, printing each update
    Watch {
        code: String,
        /// How long to watch, in seconds
        #[arg(long, default_value = "60")]
        seconds: u64,
    },
}

fn open_service() -> Result<(RoomService, String), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default();
    if config.room.base_url.trim().is_empty() {
        return Err(
            "no realtime database configured; set [room] base_url in config.toml".into(),
        );
    }
    let db = Arc::new(HttpRealtimeDb::new(
        &config.room.base_url,
        Duration::from_secs(config.room.poll_interval_secs),
    )?);

    let services = common::open_services()?;
    let identity = Identity::new(services.store.clone());
    let user_id = identity.user_id()?;
    let user_name = identity.user_name();
    Ok((RoomService::new(db, user_id), user_name))
}

pub fn run(action: RoomAction) -> Result<(), Box<dyn std::error::Error>> {
    let (rooms, user_name) = open_service()?;

    match action {
        RoomAction::Create => {
            let room = rooms.create_room(&user_name)?;
            common::print_json(&room)?;
            eprintln!("share this code with your friends: {}", room.code);
        }
        RoomAction::Join { code } => {
            let room = rooms.join_room(&code, &user_name)?;
            common::print_json(&room)?;
        }
        RoomAction::Leave { code } => {
            rooms.leave_room(&code)?;
            common::print_json(&json!({ "left": code.to_uppercase() }))?;
        }
        RoomAction::Status { code } => {
            common::print_json(&rooms.room(&code)?)?;
        }
        RoomAction::Tick { code } => {
            common::print_json(&rooms.tick_study_minute(&code)?)?;
        }
        RoomAction::Break { code } => {
            common::print_json(&rooms.toggle_break(&code)?)?;
        }
        RoomAction::Pause { code } => {
            common::print_json(&rooms.toggle_pause(&code)?)?;
        }
        RoomAction::Study { code } => {
            common::print_json(&rooms.start_studying(&code)?)?;
        }
        RoomAction::Watch { code, seconds } => {
            let subscription = rooms.watch(&code, |state| match state {
                Some(room) => {
                    if let Ok(line) = serde_json::to_string(&room) {
                        println!("{line}");
                    }
                }
                None => println!("{}", json!({ "deleted": true })),
            })?;
            std::thread::sleep(Duration::from_secs(seconds));
            subscription.unsubscribe();
        }
    }
    Ok(())
}
