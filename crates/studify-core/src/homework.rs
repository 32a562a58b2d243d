//! Homework tracker: task records with due dates, priority and
//! completion state, persisted as one JSON array.
//!
//! The collection is kept sorted ascending by due date after every
//! mutation. Completing an item (false -> true) credits the coin ledger
//! exactly once and cancels its reminders; un-completing pays nothing
//! back.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::ledger::{rewards, CoinLedger};
use crate::notify::Notifier;
use crate::store::{self, keys, KvStore};

/// Local hour on the due date at which the due notification fires.
const DUE_NOTIFICATION_HOUR: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeworkItem {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub completed: bool,
    #[serde(default)]
    pub notes: String,
}

/// Fields for a new homework entry; the id is assigned on insert.
#[derive(Debug, Clone)]
pub struct NewHomework {
    pub title: String,
    pub subject: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub notes: String,
}

/// Outcome of flipping an item's completion state.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleResult {
    pub item: HomeworkItem,
    pub coins_awarded: u64,
    pub balance: u64,
}

/// Homework collection over the durable store.
pub struct HomeworkStore {
    store: Arc<dyn KvStore>,
    ledger: Arc<CoinLedger>,
    notifier: Arc<dyn Notifier>,
    write_lock: Mutex<()>,
}

impl HomeworkStore {
    pub fn new(
        store: Arc<dyn KvStore>,
        ledger: Arc<CoinLedger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            ledger,
            notifier,
            write_lock: Mutex::new(()),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Every item, sorted ascending by due date.
    pub fn all(&self) -> Vec<HomeworkItem> {
        store::read_or_absent(self.store.as_ref(), keys::HOMEWORK_LIST)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<HomeworkItem> {
        self.all().into_iter().find(|hw| hw.id == id)
    }

    pub fn pending(&self) -> Vec<HomeworkItem> {
        self.all().into_iter().filter(|hw| !hw.completed).collect()
    }

    pub fn completed(&self) -> Vec<HomeworkItem> {
        self.all().into_iter().filter(|hw| hw.completed).collect()
    }

    pub fn overdue(&self, today: NaiveDate) -> Vec<HomeworkItem> {
        self.all()
            .into_iter()
            .filter(|hw| is_overdue(hw, today))
            .collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Insert a new item and schedule its reminders.
    ///
    /// # Errors
    /// Rejects empty title or subject before any persistence.
    pub fn add(&self, new: NewHomework) -> Result<HomeworkItem> {
        let title = new.title.trim().to_string();
        let subject = new.subject.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyField("Homework title").into());
        }
        if subject.is_empty() {
            return Err(ValidationError::EmptyField("Subject").into());
        }

        let item = HomeworkItem {
            id: Uuid::new_v4().to_string(),
            title,
            subject,
            due_date: new.due_date,
            priority: new.priority,
            completed: false,
            notes: new.notes.trim().to_string(),
        };

        let _guard = self.mutation_guard();
        let mut items = self.all();
        items.push(item.clone());
        self.persist(items)?;
        self.schedule_reminders(&item);
        Ok(item)
    }

    /// Replace the item matching `item.id`. Returns false when no item
    /// matches.
    pub fn update(&self, item: HomeworkItem) -> Result<bool> {
        if item.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("Homework title").into());
        }
        if item.subject.trim().is_empty() {
            return Err(ValidationError::EmptyField("Subject").into());
        }

        let _guard = self.mutation_guard();
        let mut items = self.all();
        let Some(slot) = items.iter_mut().find(|hw| hw.id == item.id) else {
            return Ok(false);
        };
        *slot = item.clone();
        self.persist(items)?;
        self.cancel_reminders(&item.id);
        if !item.completed {
            self.schedule_reminders(&item);
        }
        Ok(true)
    }

    /// Flip an item's completion state.
    ///
    /// On the false -> true transition only, credits the ledger and
    /// cancels the item's reminders. Unknown ids are a no-op.
    pub fn toggle_complete(&self, id: &str) -> Result<Option<ToggleResult>> {
        let _guard = self.mutation_guard();
        let mut items = self.all();
        let Some(slot) = items.iter_mut().find(|hw| hw.id == id) else {
            return Ok(None);
        };
        slot.completed = !slot.completed;
        let item = slot.clone();
        self.persist(items)?;

        let (coins_awarded, balance) = if item.completed {
            self.cancel_reminders(&item.id);
            let balance = self.ledger.credit(
                rewards::HOMEWORK_COMPLETE,
                &format!("Completed: {}", item.title),
            )?;
            (rewards::HOMEWORK_COMPLETE, balance)
        } else {
            // No claw-back when un-completing.
            (0, self.ledger.balance())
        };

        Ok(Some(ToggleResult {
            item,
            coins_awarded,
            balance,
        }))
    }

    /// Delete an item and cancel its reminders. Returns false when no
    /// item matches.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let _guard = self.mutation_guard();
        let mut items = self.all();
        let before = items.len();
        items.retain(|hw| hw.id != id);
        if items.len() == before {
            return Ok(false);
        }
        self.persist(items)?;
        self.cancel_reminders(id);
        Ok(true)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist(&self, mut items: Vec<HomeworkItem>) -> Result<()> {
        items.sort_by_key(|hw| hw.due_date);
        self.store
            .set(keys::HOMEWORK_LIST, &serde_json::to_string(&items)?)?;
        Ok(())
    }

    /// Two reminders per item, both only when still in the future: one at
    /// the fixed local hour on the due date, one 24 hours earlier.
    fn schedule_reminders(&self, item: &HomeworkItem) {
        let Some(due_at) = due_instant(item.due_date) else {
            return;
        };
        let now = Utc::now();
        let body = format!("{}: {}", item.subject, item.title);
        if due_at > now {
            if let Err(e) = self
                .notifier
                .schedule(&item.id, due_at, "Homework due today", &body)
            {
                tracing::warn!(id = %item.id, error = %e, "failed to schedule due notification");
            }
            let reminder_at = due_at - chrono::Duration::hours(24);
            if reminder_at > now {
                if let Err(e) = self.notifier.schedule(
                    &reminder_id(&item.id),
                    reminder_at,
                    "Homework due tomorrow",
                    &body,
                ) {
                    tracing::warn!(id = %item.id, error = %e, "failed to schedule reminder");
                }
            }
        }
    }

    fn cancel_reminders(&self, id: &str) {
        self.notifier.cancel(id);
        self.notifier.cancel(&reminder_id(id));
    }

    fn mutation_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn reminder_id(id: &str) -> String {
    format!("{id}_reminder")
}

/// The due notification instant: the fixed local hour on the due date.
fn due_instant(due: NaiveDate) -> Option<DateTime<Utc>> {
    let local = Local
        .from_local_datetime(&due.and_hms_opt(DUE_NOTIFICATION_HOUR, 0, 0)?)
        .earliest()?;
    Some(local.with_timezone(&Utc))
}

/// Not completed and due strictly before today.
pub fn is_overdue(item: &HomeworkItem, today: NaiveDate) -> bool {
    !item.completed && item.due_date < today
}

/// Calendar-day distance to the due date, as display text.
pub fn days_until_due(due: NaiveDate, today: NaiveDate) -> String {
    let diff = (due - today).num_days();
    if diff < 0 {
        format!("{} days overdue", -diff)
    } else if diff == 0 {
        "Due today".to_string()
    } else if diff == 1 {
        "Due tomorrow".to_string()
    } else {
        format!("{diff} days left")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;
    use crate::store::MemoryStore;

    struct Fixture {
        homework: HomeworkStore,
        ledger: Arc<CoinLedger>,
        notifier: Arc<MemoryNotifier>,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let ledger = Arc::new(CoinLedger::new(store.clone()));
        let notifier = Arc::new(MemoryNotifier::new());
        Fixture {
            homework: HomeworkStore::new(store, ledger.clone(), notifier.clone()),
            ledger,
            notifier,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_item(title: &str, due: &str) -> NewHomework {
        NewHomework {
            title: title.to_string(),
            subject: "Math".to_string(),
            due_date: date(due),
            priority: Priority::Medium,
            notes: String::new(),
        }
    }

    #[test]
    fn collection_stays_sorted_by_due_date() {
        let fx = fixture();
        fx.homework.add(new_item("second", "2099-04-02")).unwrap();
        fx.homework.add(new_item("first", "2099-04-01")).unwrap();
        fx.homework.add(new_item("third", "2099-04-03")).unwrap();

        let titles: Vec<_> = fx.homework.all().into_iter().map(|hw| hw.title).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[test]
    fn empty_fields_rejected_without_persisting() {
        let fx = fixture();
        assert!(fx.homework.add(new_item("  ", "2099-04-01")).is_err());
        let mut no_subject = new_item("Essay", "2099-04-01");
        no_subject.subject = String::new();
        assert!(fx.homework.add(no_subject).is_err());
        assert!(fx.homework.all().is_empty());
    }

    #[test]
    fn completing_credits_once_and_uncompleting_keeps_coins() {
        let fx = fixture();
        let item = fx.homework.add(new_item("Essay", "2099-04-01")).unwrap();

        let done = fx.homework.toggle_complete(&item.id).unwrap().unwrap();
        assert!(done.item.completed);
        assert_eq!(done.coins_awarded, 15);
        assert_eq!(fx.ledger.balance(), 15);

        let undone = fx.homework.toggle_complete(&item.id).unwrap().unwrap();
        assert!(!undone.item.completed);
        assert_eq!(undone.coins_awarded, 0);
        assert_eq!(fx.ledger.balance(), 15);
    }

    #[test]
    fn toggle_unknown_id_is_a_noop() {
        let fx = fixture();
        assert!(fx.homework.toggle_complete("missing").unwrap().is_none());
        assert_eq!(fx.ledger.balance(), 0);
    }

    #[test]
    fn add_schedules_two_reminders_for_future_due_dates() {
        let fx = fixture();
        let item = fx.homework.add(new_item("Essay", "2099-04-01")).unwrap();
        assert!(fx.notifier.get(&item.id).is_some());
        assert!(fx.notifier.get(&format!("{}_reminder", item.id)).is_some());
        let due = fx.notifier.get(&item.id).unwrap();
        let reminder = fx.notifier.get(&format!("{}_reminder", item.id)).unwrap();
        assert_eq!(due.fire_at - reminder.fire_at, chrono::Duration::hours(24));
    }

    #[test]
    fn past_due_dates_schedule_nothing() {
        let fx = fixture();
        let item = fx.homework.add(new_item("Old", "2001-01-01")).unwrap();
        assert!(fx.notifier.pending().is_empty());
        assert!(fx.homework.get(&item.id).is_some());
    }

    #[test]
    fn completing_cancels_reminders() {
        let fx = fixture();
        let item = fx.homework.add(new_item("Essay", "2099-04-01")).unwrap();
        fx.homework.toggle_complete(&item.id).unwrap();
        assert!(fx.notifier.get(&item.id).is_none());
        assert!(fx.notifier.get(&format!("{}_reminder", item.id)).is_none());
    }

    #[test]
    fn remove_deletes_item_and_reminders() {
        let fx = fixture();
        let item = fx.homework.add(new_item("Essay", "2099-04-01")).unwrap();
        assert!(fx.homework.remove(&item.id).unwrap());
        assert!(fx.homework.all().is_empty());
        assert!(fx.notifier.pending().is_empty());
        assert!(!fx.homework.remove(&item.id).unwrap());
    }

    #[test]
    fn update_replaces_and_reschedules() {
        let fx = fixture();
        let mut item = fx.homework.add(new_item("Essay", "2099-04-01")).unwrap();
        let original_due = fx.notifier.get(&item.id).unwrap().fire_at;

        item.due_date = date("2099-05-01");
        assert!(fx.homework.update(item.clone()).unwrap());
        let moved_due = fx.notifier.get(&item.id).unwrap().fire_at;
        assert!(moved_due > original_due);

        let mut unknown = item.clone();
        unknown.id = "missing".to_string();
        assert!(!fx.homework.update(unknown).unwrap());
    }

    #[test]
    fn overdue_and_pending_views() {
        let fx = fixture();
        let late = fx.homework.add(new_item("Late", "2020-01-01")).unwrap();
        fx.homework.add(new_item("Soon", "2099-04-01")).unwrap();
        let done = fx.homework.add(new_item("Done", "2020-02-01")).unwrap();
        fx.homework.toggle_complete(&done.id).unwrap();

        let today = date("2026-08-05");
        let overdue = fx.homework.overdue(today);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, late.id);
        assert_eq!(fx.homework.pending().len(), 2);
        assert_eq!(fx.homework.completed().len(), 1);
    }

    #[test]
    fn days_until_due_text_mapping() {
        let today = date("2026-08-05");
        assert_eq!(days_until_due(date("2026-08-03"), today), "2 days overdue");
        assert_eq!(days_until_due(date("2026-08-05"), today), "Due today");
        assert_eq!(days_until_due(date("2026-08-06"), today), "Due tomorrow");
        assert_eq!(days_until_due(date("2026-08-10"), today), "5 days left");
    }
}
