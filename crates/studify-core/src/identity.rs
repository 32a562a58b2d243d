//! Local identity: a generated persistent user id, the display name and
//! the first-launch flag. All cached in the durable store.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::Result;
use crate::store::{self, keys, KvStore};

const DEFAULT_USER_NAME: &str = "Student";

pub struct Identity {
    store: Arc<dyn KvStore>,
}

impl Identity {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// The device-local user id, generated once and cached.
    pub fn user_id(&self) -> Result<String> {
        if let Some(id) = self.store.get(keys::USER_ID)? {
            if !id.trim().is_empty() {
                return Ok(id);
            }
        }
        let id = Uuid::new_v4().to_string();
        self.store.set(keys::USER_ID, &id)?;
        Ok(id)
    }

    pub fn user_name(&self) -> String {
        store::read_or_absent(self.store.as_ref(), keys::USER_NAME)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string())
    }

    pub fn set_user_name(&self, name: &str) -> Result<()> {
        self.store.set(keys::USER_NAME, name.trim())?;
        Ok(())
    }

    pub fn has_seen_welcome(&self) -> bool {
        store::read_or_absent(self.store.as_ref(), keys::WELCOME_SEEN).as_deref() == Some("true")
    }

    pub fn mark_welcome_seen(&self) -> Result<()> {
        self.store.set(keys::WELCOME_SEEN, "true")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn identity() -> Identity {
        Identity::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn user_id_is_stable_across_reads() {
        let identity = identity();
        let first = identity.user_id().unwrap();
        let second = identity.user_id().unwrap();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn user_name_defaults_to_student() {
        let identity = identity();
        assert_eq!(identity.user_name(), "Student");
        identity.set_user_name("  Alex  ").unwrap();
        assert_eq!(identity.user_name(), "Alex");
    }

    #[test]
    fn welcome_flag_flips_once() {
        let identity = identity();
        assert!(!identity.has_seen_welcome());
        identity.mark_welcome_seen().unwrap();
        assert!(identity.has_seen_welcome());
    }
}
