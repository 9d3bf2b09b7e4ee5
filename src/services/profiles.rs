use serde::Deserialize;

use crate::{
    db::{
        store::{load_json, save_json},
        SharedStore, StorageKey,
    },
    error::{AppError, AppResult},
    models::Profile,
};

/// Most profiles that may exist at once
pub const MAX_PROFILES: usize = 3;

/// Longest accepted profile name, in characters
pub const MAX_NAME_LENGTH: usize = 20;

/// Owns the profile collection and the active-profile pointer.
///
/// Every mutation rewrites the whole collection immediately. A failed
/// validation returns an error and leaves storage untouched.
#[derive(Clone)]
pub struct ProfileStore {
    store: SharedStore,
}

impl ProfileStore {
    /// Creates the store, seeding the kid profile when no usable collection is stored
    pub fn new(store: SharedStore) -> AppResult<Self> {
        let profiles = Self { store };
        // Surface an unreadable backend instead of seeding over it
        profiles.store.get(&StorageKey::Profiles.to_string())?;
        if profiles.stored().is_none() {
            tracing::info!("No usable stored profiles, seeding kid profile");
            profiles.save(&[Profile::seeded_kid()])?;
        }
        Ok(profiles)
    }

    /// The stored collection; missing, malformed and empty all read as `None`
    fn stored(&self) -> Option<Vec<Profile>> {
        load_json::<Vec<Profile>>(self.store.as_ref(), &StorageKey::Profiles)
            .filter(|profiles| !profiles.is_empty())
    }

    fn load(&self) -> Vec<Profile> {
        self.stored()
            .unwrap_or_else(|| vec![Profile::seeded_kid()])
    }

    fn save(&self, profiles: &[Profile]) -> AppResult<()> {
        save_json(self.store.as_ref(), &StorageKey::Profiles, profiles)
    }

    /// All profiles, adults first, kid profiles last
    pub fn list_profiles(&self) -> Vec<Profile> {
        let mut profiles = self.load();
        // sort_by_key is stable, so storage order survives within each group
        profiles.sort_by_key(|p| p.is_kid);
        profiles
    }

    pub fn get(&self, id: &str) -> Option<Profile> {
        self.load().into_iter().find(|p| p.id == id)
    }

    pub fn create_profile(&self, name: &str) -> AppResult<Profile> {
        let name = validate_name(name)?;
        let mut profiles = self.load();

        if profiles.len() >= MAX_PROFILES {
            return Err(AppError::ProfileLimit(MAX_PROFILES));
        }

        let avatar_index = profiles.iter().filter(|p| !p.is_kid).count() + 1;
        let profile = Profile::adult(name, format!("/adult-avatar {}.png", avatar_index));

        profiles.push(profile.clone());
        self.save(&profiles)?;

        tracing::info!(profile_id = %profile.id, "Profile created");
        Ok(profile)
    }

    /// Renames a profile and replaces its PIN; a blank PIN removes the lock
    pub fn update_profile(&self, id: &str, name: &str, pin: Option<&str>) -> AppResult<Profile> {
        let name = validate_name(name)?;
        let mut profiles = self.load();

        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", id)))?;

        profile.name = name;
        profile.pin = pin
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        let updated = profile.clone();

        self.save(&profiles)?;

        tracing::info!(profile_id = %id, locked = updated.is_locked(), "Profile updated");
        Ok(updated)
    }

    pub fn remove_profile(&self, id: &str) -> AppResult<()> {
        let mut profiles = self.load();

        if !profiles.iter().any(|p| p.id == id) {
            return Err(AppError::NotFound(format!("Profile {}", id)));
        }
        if profiles.len() <= 1 {
            return Err(AppError::LastProfile);
        }

        profiles.retain(|p| p.id != id);
        self.save(&profiles)?;

        if self.active_id().as_deref() == Some(id) {
            self.clear_active()?;
        }
        self.store
            .remove(&StorageKey::Watchlist(id.to_string()).to_string())?;

        tracing::info!(profile_id = %id, "Profile removed");
        Ok(())
    }

    fn active_id(&self) -> Option<String> {
        load_json::<ActivePointer>(self.store.as_ref(), &StorageKey::ActiveProfile)
            .map(ActivePointer::into_id)
    }

    /// The active profile.
    ///
    /// A pointer to a profile that no longer exists counts as no selection.
    pub fn get_active(&self) -> Option<Profile> {
        let id = self.active_id()?;
        let active = self.get(&id);
        if active.is_none() {
            tracing::warn!(profile_id = %id, "Active profile pointer is dangling, ignoring it");
        }
        active
    }

    /// Points the session at `profile`; any PIN check has already happened
    pub fn set_active(&self, profile: &Profile) -> AppResult<()> {
        save_json(self.store.as_ref(), &StorageKey::ActiveProfile, &profile.id)
    }

    pub fn clear_active(&self) -> AppResult<()> {
        self.store.remove(&StorageKey::ActiveProfile.to_string())
    }
}

/// Stored active-profile pointer: a bare id, or a whole profile object as
/// older blobs have it
#[derive(Deserialize)]
#[serde(untagged)]
enum ActivePointer {
    Id(String),
    Profile { id: String },
}

impl ActivePointer {
    fn into_id(self) -> String {
        match self {
            ActivePointer::Id(id) | ActivePointer::Profile { id } => id,
        }
    }
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "Profile name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Profile name cannot exceed {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_string())
}
