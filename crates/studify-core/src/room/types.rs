use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One participant in a study room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyMember {
    pub id: String,
    pub name: String,
    /// Accumulated focused minutes in this room.
    pub study_time: u64,
    pub is_on_break: bool,
    pub is_paused: bool,
    pub joined_at: DateTime<Utc>,
}

impl StudyMember {
    pub fn new(id: &str, name: &str, joined_at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            study_time: 0,
            is_on_break: false,
            is_paused: false,
            joined_at,
        }
    }

    /// Actively studying: neither on break nor paused.
    pub fn is_studying(&self) -> bool {
        !self.is_on_break && !self.is_paused
    }
}

/// The shared room document as stored in the realtime database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyRoom {
    pub code: String,
    pub host_name: String,
    pub members: Vec<StudyMember>,
    pub created_at: DateTime<Utc>,
    /// Sum of every member's study minutes, recomputed on update.
    pub total_study_time: u64,
}

impl StudyRoom {
    pub fn member(&self, id: &str) -> Option<&StudyMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn members_studying(&self) -> usize {
        self.members.iter().filter(|m| m.is_studying()).count()
    }

    pub fn members_on_break(&self) -> usize {
        self.members.iter().filter(|m| m.is_on_break).count()
    }
}

/// `1h 5m` / `45m` rendering of a minute count.
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_uses_camel_case() {
        let room = StudyRoom {
            code: "ABC123".into(),
            host_name: "Alex".into(),
            members: vec![StudyMember::new("u1", "Alex", Utc::now())],
            created_at: Utc::now(),
            total_study_time: 0,
        };
        let json = serde_json::to_value(&room).unwrap();
        assert!(json.get("hostName").is_some());
        assert!(json.get("totalStudyTime").is_some());
        assert!(json["members"][0].get("isOnBreak").is_some());
        assert!(json["members"][0].get("joinedAt").is_some());
    }

    #[test]
    fn minute_formatting() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(65), "1h 5m");
        assert_eq!(format_minutes(120), "2h 0m");
    }
}
