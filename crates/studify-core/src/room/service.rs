//! Study-room update rules.
//!
//! Rooms live at `rooms/<CODE>` in the realtime database. Every mutation
//! here is a full-document read followed by a write of the changed
//! fields; concurrent writers are serialized by the hosted service, not
//! by this client.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};

use super::db::{RealtimeDb, Subscription};
use super::types::{StudyMember, StudyRoom};
use crate::error::{Result, RoomError, ValidationError};

/// Room codes are short, human-shareable identifiers.
pub const ROOM_CODE_LEN: usize = 6;

const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_ALLOCATION_ATTEMPTS: u32 = 5;

/// Database path of a room document.
pub fn room_path(code: &str) -> String {
    format!("rooms/{}", code.to_uppercase())
}

pub struct RoomService {
    db: Arc<dyn RealtimeDb>,
    user_id: String,
}

impl RoomService {
    pub fn new(db: Arc<dyn RealtimeDb>, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Create a room hosted by the caller.
    ///
    /// Codes are allocated with a bounded retry: an existing document
    /// under a candidate code forces a fresh draw.
    pub fn create_room(&self, host_name: &str) -> Result<StudyRoom> {
        let host_name = host_name.trim();
        if host_name.is_empty() {
            return Err(ValidationError::EmptyField("Name").into());
        }

        let code = self.allocate_code()?;
        let room = StudyRoom {
            code: code.clone(),
            host_name: host_name.to_string(),
            members: vec![StudyMember::new(&self.user_id, host_name, Utc::now())],
            created_at: Utc::now(),
            total_study_time: 0,
        };
        self.db
            .write(&room_path(&code), &serde_json::to_value(&room)?)?;
        Ok(room)
    }

    /// Join an existing room. Rejoining (the caller's id is already a
    /// member) changes nothing and simply returns the current document.
    pub fn join_room(&self, code: &str, name: &str) -> Result<StudyRoom> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("Name").into());
        }
        if code.trim().is_empty() {
            return Err(ValidationError::EmptyField("Room code").into());
        }

        let path = room_path(code);
        let mut room = self.read_room(&path, code)?;
        if room.member(&self.user_id).is_some() {
            return Ok(room);
        }

        room.members
            .push(StudyMember::new(&self.user_id, name, Utc::now()));
        self.db
            .update(&path, &json!({ "members": room.members }))?;
        Ok(room)
    }

    /// Remove the caller; the room document is deleted once its member
    /// list empties.
    pub fn leave_room(&self, code: &str) -> Result<()> {
        let path = room_path(code);
        let Some(doc) = self.db.read(&path)? else {
            return Ok(()); // Already gone.
        };
        let mut room = parse_room(doc)?;
        room.members.retain(|m| m.id != self.user_id);

        if room.members.is_empty() {
            self.db.delete(&path)?;
        } else {
            self.db
                .update(&path, &json!({ "members": room.members }))?;
        }
        Ok(())
    }

    /// Per-minute update: one focused minute for the caller unless on
    /// break or paused, and the room aggregate recomputed as the member
    /// sum.
    pub fn tick_study_minute(&self, code: &str) -> Result<StudyRoom> {
        self.modify_members(code, |members, user_id| {
            for member in members.iter_mut() {
                if member.id == user_id && member.is_studying() {
                    member.study_time += 1;
                }
            }
        })
    }

    pub fn toggle_break(&self, code: &str) -> Result<StudyRoom> {
        self.modify_own_member(code, |member| {
            member.is_on_break = !member.is_on_break;
        })
    }

    pub fn toggle_pause(&self, code: &str) -> Result<StudyRoom> {
        self.modify_own_member(code, |member| {
            member.is_paused = !member.is_paused;
        })
    }

    /// Clear both break and pause flags.
    pub fn start_studying(&self, code: &str) -> Result<StudyRoom> {
        self.modify_own_member(code, |member| {
            member.is_on_break = false;
            member.is_paused = false;
        })
    }

    pub fn room(&self, code: &str) -> Result<StudyRoom> {
        let path = room_path(code);
        self.read_room(&path, code)
    }

    /// Watch a room; the callback receives `None` once the document is
    /// deleted. Dropping the guard tears the watch down.
    pub fn watch(
        &self,
        code: &str,
        on_change: impl Fn(Option<StudyRoom>) + Send + Sync + 'static,
    ) -> Result<Subscription> {
        let subscription = self.db.subscribe(
            &room_path(code),
            Box::new(move |value| {
                let room = value.and_then(|doc| serde_json::from_value(doc).ok());
                on_change(room);
            }),
        )?;
        Ok(subscription)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn allocate_code(&self) -> Result<String> {
        for _ in 0..CODE_ALLOCATION_ATTEMPTS {
            let code = generate_code();
            if self.db.read(&room_path(&code))?.is_none() {
                return Ok(code);
            }
        }
        Err(RoomError::CodeExhausted {
            attempts: CODE_ALLOCATION_ATTEMPTS,
        }
        .into())
    }

    fn read_room(&self, path: &str, code: &str) -> Result<StudyRoom> {
        let doc = self
            .db
            .read(path)?
            .ok_or_else(|| RoomError::NotFound(code.to_uppercase()))?;
        Ok(parse_room(doc)?)
    }

    fn modify_own_member(
        &self,
        code: &str,
        mutate: impl Fn(&mut StudyMember),
    ) -> Result<StudyRoom> {
        let path = room_path(code);
        let mut room = self.read_room(&path, code)?;
        let member = room
            .members
            .iter_mut()
            .find(|m| m.id == self.user_id)
            .ok_or_else(|| RoomError::NotAMember(code.to_uppercase()))?;
        mutate(member);
        self.db
            .update(&path, &json!({ "members": room.members }))?;
        Ok(room)
    }

    fn modify_members(
        &self,
        code: &str,
        mutate: impl Fn(&mut Vec<StudyMember>, &str),
    ) -> Result<StudyRoom> {
        let path = room_path(code);
        let mut room = self.read_room(&path, code)?;
        mutate(&mut room.members, &self.user_id);
        room.total_study_time = room.members.iter().map(|m| m.study_time).sum();
        self.db.update(
            &path,
            &json!({
                "members": room.members,
                "totalStudyTime": room.total_study_time,
            }),
        )?;
        Ok(room)
    }
}

fn parse_room(doc: Value) -> Result<StudyRoom, RoomError> {
    serde_json::from_value(doc).map_err(RoomError::from)
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..ROOM_CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}
