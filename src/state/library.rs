use chrono::Utc;

use super::data::{seed_profiles, CatProfile, ProfileId};
use super::draft::CatDraft;
use super::persistence::{BlobStore, MemoryBlobStore};
use crate::error::{PersistenceError, StoreError};

/// Key the whole collection is stored under
pub const STORAGE_KEY: &str = "xmu_cats";

/// Where an unreadable blob is parked before falling back to seed data
pub const CORRUPT_BACKUP_KEY: &str = "xmu_cats.corrupt";

/// The Library owns the in-memory profile collection.
/// Profiles are kept newest first; every mutation mirrors the full
/// collection into the blob store.
pub struct Library {
    profiles: Vec<CatProfile>,
    store: Box<dyn BlobStore>,
}

impl Library {
    /// Load the collection from `store`.
    ///
    /// An absent key yields the seed profiles. An unreadable blob is copied
    /// to `CORRUPT_BACKUP_KEY` and the seed profiles are used instead.
    pub fn open(mut store: Box<dyn BlobStore>) -> Result<Self, PersistenceError> {
        let profiles = match store.get(STORAGE_KEY)? {
            None => {
                tracing::info!("No saved profiles, starting from seed data");
                seed_profiles(now_ms())
            }
            Some(blob) => match serde_json::from_str::<Vec<CatProfile>>(&blob) {
                Ok(profiles) => profiles,
                Err(e) => {
                    tracing::warn!(error = %e, "Saved profiles are unreadable, keeping a backup and using seed data");
                    store.set(CORRUPT_BACKUP_KEY, &blob)?;
                    seed_profiles(now_ms())
                }
            },
        };

        tracing::info!(count = profiles.len(), "Library loaded");
        Ok(Library { profiles, store })
    }

    /// Seed profiles over a store that lives only as long as the process
    pub fn in_memory() -> Self {
        let mut library = Library {
            profiles: seed_profiles(now_ms()),
            store: Box::new(MemoryBlobStore::new()),
        };
        library.persist();
        library
    }

    /// All profiles, newest first
    pub fn list(&self) -> &[CatProfile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn find(&self, id: &ProfileId) -> Option<&CatProfile> {
        self.profiles.iter().find(|p| &p.id == id)
    }

    /// Finalize `draft` into a new profile and put it at the front
    pub fn create(&mut self, draft: CatDraft) -> Result<CatProfile, StoreError> {
        let profile = draft.into_profile(ProfileId::generate(), now_ms())?;

        self.profiles.insert(0, profile.clone());
        tracing::info!(id = %profile.id, name = %profile.name, "Profile created");
        self.persist();

        Ok(profile)
    }

    /// Merge `patch` into an existing profile; absent fields are kept
    pub fn update(&mut self, id: &ProfileId, patch: CatDraft) -> Result<CatProfile, StoreError> {
        patch.validate_patch()?;

        let profile = self
            .profiles
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        patch.apply_to(profile);
        let updated = profile.clone();
        tracing::info!(id = %updated.id, "Profile updated");
        self.persist();

        Ok(updated)
    }

    /// Remove a profile. Deleting an unknown id is a no-op.
    /// Returns whether anything was removed.
    pub fn delete(&mut self, id: &ProfileId) -> bool {
        let before = self.profiles.len();
        self.profiles.retain(|p| &p.id != id);

        let removed = self.profiles.len() != before;
        if removed {
            tracing::info!(id = %id, "Profile deleted");
        }
        // Writes even when nothing changed; the blob ends up identical
        self.persist();
        removed
    }

    /// Case-sensitive substring match over name, location and breed.
    /// An empty term returns everything in store order.
    pub fn search(&self, term: &str) -> Vec<&CatProfile> {
        self.profiles
            .iter()
            .filter(|p| {
                term.is_empty()
                    || p.name.contains(term)
                    || p.location.contains(term)
                    || p.breed.contains(term)
            })
            .collect()
    }

    /// Mirror the collection into the store. Failures are logged, not returned.
    fn persist(&mut self) {
        let result = serde_json::to_string(&self.profiles)
            .map_err(PersistenceError::from)
            .and_then(|blob| self.store.set(STORAGE_KEY, &blob));

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to save profiles");
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("profiles", &self.profiles.len())
            .finish()
    }
}
