//! Study pet progression.
//!
//! The pet earns 10 XP per completed focus session and levels up every
//! 100 XP. Progress is derived from the completed-session counter so the
//! pet catches up no matter where the sessions were finished.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stats::Statistics;
use crate::store::{self, keys, KvStore};

const XP_PER_SESSION: u64 = 10;
const XP_PER_LEVEL: u64 = 100;
const DEFAULT_PET_NAME: &str = "Mochi";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetMood {
    Happy,
    Idle,
    Excited,
    Sleeping,
    Sad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetProfile {
    pub name: String,
    pub level: u32,
    pub xp: u64,
    pub mood: PetMood,
    pub last_fed: DateTime<Utc>,
    /// Completed-session count already converted into XP.
    pub total_sessions: u64,
}

impl Default for PetProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PET_NAME.to_string(),
            level: 1,
            xp: 0,
            mood: PetMood::Idle,
            last_fed: Utc::now(),
            total_sessions: 0,
        }
    }
}

/// What changed during a sync against the session counter.
#[derive(Debug, Clone, Serialize)]
pub struct PetProgress {
    pub sessions_gained: u64,
    pub xp_gained: u64,
    pub levels_gained: u32,
    pub profile: PetProfile,
}

pub struct PetTracker {
    store: Arc<dyn KvStore>,
    stats: Arc<Statistics>,
}

impl PetTracker {
    pub fn new(store: Arc<dyn KvStore>, stats: Arc<Statistics>) -> Self {
        Self { store, stats }
    }

    pub fn profile(&self) -> PetProfile {
        store::read_or_absent(self.store.as_ref(), keys::PET_PROFILE)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Convert any sessions completed since the last sync into XP and
    /// levels. Returns `None` when nothing changed.
    pub fn sync(&self) -> Result<Option<PetProgress>> {
        let mut profile = self.profile();
        let sessions = self.stats.completed_sessions();
        if sessions <= profile.total_sessions {
            return Ok(None);
        }

        let sessions_gained = sessions - profile.total_sessions;
        let xp_gained = sessions_gained * XP_PER_SESSION;
        let mut xp = profile.xp + xp_gained;
        let mut levels_gained = 0;
        while xp >= XP_PER_LEVEL {
            xp -= XP_PER_LEVEL;
            levels_gained += 1;
        }

        profile.total_sessions = sessions;
        profile.xp = xp;
        profile.level += levels_gained;
        profile.mood = PetMood::Excited;
        self.save(&profile)?;

        Ok(Some(PetProgress {
            sessions_gained,
            xp_gained,
            levels_gained,
            profile,
        }))
    }

    pub fn set_mood(&self, mood: PetMood) -> Result<PetProfile> {
        let mut profile = self.profile();
        profile.mood = mood;
        self.save(&profile)?;
        Ok(profile)
    }

    pub fn feed(&self, at: DateTime<Utc>) -> Result<PetProfile> {
        let mut profile = self.profile();
        profile.last_fed = at;
        profile.mood = PetMood::Happy;
        self.save(&profile)?;
        Ok(profile)
    }

    fn save(&self, profile: &PetProfile) -> Result<()> {
        self.store
            .set(keys::PET_PROFILE, &serde_json::to_string(profile)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct Fixture {
        pet: PetTracker,
        stats: Arc<Statistics>,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let stats = Arc::new(Statistics::new(store.clone()));
        Fixture {
            pet: PetTracker::new(store, stats.clone()),
            stats,
        }
    }

    #[test]
    fn sync_without_sessions_changes_nothing() {
        let fx = fixture();
        assert!(fx.pet.sync().unwrap().is_none());
        assert_eq!(fx.pet.profile().level, 1);
    }

    #[test]
    fn sessions_convert_into_xp() {
        let fx = fixture();
        for _ in 0..3 {
            fx.stats.increment_completed_sessions().unwrap();
        }
        let progress = fx.pet.sync().unwrap().unwrap();
        assert_eq!(progress.sessions_gained, 3);
        assert_eq!(progress.xp_gained, 30);
        assert_eq!(progress.levels_gained, 0);
        assert_eq!(progress.profile.xp, 30);
        assert_eq!(progress.profile.mood, PetMood::Excited);

        // Already converted sessions do not pay twice.
        assert!(fx.pet.sync().unwrap().is_none());
    }

    #[test]
    fn level_up_carries_remainder() {
        let fx = fixture();
        for _ in 0..12 {
            fx.stats.increment_completed_sessions().unwrap();
        }
        let progress = fx.pet.sync().unwrap().unwrap();
        assert_eq!(progress.levels_gained, 1);
        assert_eq!(progress.profile.level, 2);
        assert_eq!(progress.profile.xp, 20);
    }

    #[test]
    fn feeding_updates_mood_and_timestamp() {
        let fx = fixture();
        let at = Utc::now();
        let profile = fx.pet.feed(at).unwrap();
        assert_eq!(profile.mood, PetMood::Happy);
        assert_eq!(profile.last_fed, at);
    }
}
