use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use serde_json::json;
use studify_core::homework::{days_until_due, HomeworkStore, NewHomework, Priority};
use studify_core::notify::NullNotifier;

use crate::common;

#[derive(Subcommand)]
pub enum HomeworkAction {
    /// Add a homework entry
    Add {
        title: String,
        #[arg(long)]
        subject: String,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List homework (pending by default)
    List {
        /// Show completed entries instead
        #[arg(long)]
        completed: bool,
        /// Show everything
        #[arg(long)]
        all: bool,
    },
    /// Entries due before today and not completed
    Overdue,
    /// Toggle an entry's completion state
    Done { id: String },
    /// Delete an entry
    Rm { id: String },
}

fn parse_priority(raw: &str) -> Result<Priority, Box<dyn std::error::Error>> {
    match raw.to_lowercase().as_str() {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        other => Err(format!("unknown priority '{other}' (use low, medium or high)").into()),
    }
}

fn open_store() -> Result<HomeworkStore, Box<dyn std::error::Error>> {
    let services = common::open_services()?;
    Ok(HomeworkStore::new(
        services.store.clone(),
        services.ledger.clone(),
        Arc::new(NullNotifier),
    ))
}

fn with_due_text(items: Vec<studify_core::HomeworkItem>, today: NaiveDate) -> serde_json::Value {
    let rows: Vec<_> = items
        .into_iter()
        .map(|hw| {
            let due_text = days_until_due(hw.due_date, today);
            json!({
                "id": hw.id,
                "title": hw.title,
                "subject": hw.subject,
                "dueDate": hw.due_date,
                "due": due_text,
                "priority": hw.priority,
                "completed": hw.completed,
                "notes": hw.notes,
            })
        })
        .collect();
    json!(rows)
}

pub fn run(action: HomeworkAction) -> Result<(), Box<dyn std::error::Error>> {
    let homework = open_store()?;
    let today = Utc::now().date_naive();

    match action {
        HomeworkAction::Add {
            title,
            subject,
            due,
            priority,
            notes,
        } => {
            let due_date = NaiveDate::parse_from_str(&due, "%Y-%m-%d")
                .map_err(|_| format!("invalid due date '{due}' (expected YYYY-MM-DD)"))?;
            let item = homework.add(NewHomework {
                title,
                subject,
                due_date,
                priority: parse_priority(&priority)?,
                notes,
            })?;
            common::print_json(&item)?;
        }
        HomeworkAction::List { completed, all } => {
            let items = if all {
                homework.all()
            } else if completed {
                homework.completed()
            } else {
                homework.pending()
            };
            common::print_json(&with_due_text(items, today))?;
        }
        HomeworkAction::Overdue => {
            common::print_json(&with_due_text(homework.overdue(today), today))?;
        }
        HomeworkAction::Done { id } => match homework.toggle_complete(&id)? {
            Some(result) => common::print_json(&result)?,
            None => {
                eprintln!("no homework with id {id}");
                std::process::exit(1);
            }
        },
        HomeworkAction::Rm { id } => {
            if !homework.remove(&id)? {
                eprintln!("no homework with id {id}");
                std::process::exit(1);
            }
            common::print_json(&json!({ "removed": id }))?;
        }
    }
    Ok(())
}
