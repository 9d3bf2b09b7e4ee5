use crate::{
    error::{AppError, AppResult},
    models::Profile,
    services::{
        access::{AccessGate, PinPad},
        profiles::ProfileStore,
    },
};

/// Which profile the session is on.
///
/// `Pending` is a locked profile that was picked but not yet confirmed; the
/// previously committed profile, if any, stays active until confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    Committed {
        profile: Profile,
    },
    Pending {
        profile: Profile,
        previous: Option<Profile>,
    },
}

impl Selection {
    pub fn status(&self) -> &'static str {
        match self {
            Selection::None => "none",
            Selection::Committed { .. } => "committed",
            Selection::Pending { .. } => "pending",
        }
    }

    /// The profile to show in the header: the pending one while it awaits confirmation
    pub fn displayed(&self) -> Option<&Profile> {
        match self {
            Selection::None => None,
            Selection::Committed { profile } | Selection::Pending { profile, .. } => Some(profile),
        }
    }

    /// The profile content is actually served for
    pub fn committed(&self) -> Option<&Profile> {
        match self {
            Selection::None => None,
            Selection::Committed { profile } => Some(profile),
            Selection::Pending { previous, .. } => previous.as_ref(),
        }
    }
}

/// Profile selection flow on top of the profile store
pub struct ProfileSession {
    profiles: ProfileStore,
    gate: AccessGate,
    pending: Option<Profile>,
    pad: PinPad,
}

impl ProfileSession {
    pub fn new(profiles: ProfileStore, gate: AccessGate) -> Self {
        Self {
            profiles,
            gate,
            pending: None,
            pad: PinPad::new(),
        }
    }

    pub fn current(&self) -> Selection {
        let committed = self.profiles.get_active();
        match &self.pending {
            Some(profile) => Selection::Pending {
                profile: profile.clone(),
                previous: committed,
            },
            None => match committed {
                Some(profile) => Selection::Committed { profile },
                None => Selection::None,
            },
        }
    }

    /// The committed profile, or `NoActiveProfile`
    pub fn active(&self) -> AppResult<Profile> {
        self.profiles.get_active().ok_or(AppError::NoActiveProfile)
    }

    /// Picks a profile; unlocked profiles commit at once, locked ones go pending
    pub fn select(&mut self, profile_id: &str) -> AppResult<Selection> {
        let profile = self
            .profiles
            .get(profile_id)
            .ok_or_else(|| AppError::NotFound(format!("Profile {}", profile_id)))?;

        self.pad.clear();
        if profile.is_locked() {
            tracing::info!(profile_id = %profile.id, "Profile selection awaiting PIN");
            self.pending = Some(profile);
        } else {
            self.commit(&profile)?;
        }
        Ok(self.current())
    }

    /// Confirms the pending selection with a PIN or password
    pub fn confirm(&mut self, secret: &str) -> AppResult<Profile> {
        let pending_id = self
            .pending
            .as_ref()
            .map(|p| p.id.clone())
            .ok_or(AppError::NothingPending)?;

        // The PIN may have changed since the profile was picked
        let Some(profile) = self.profiles.get(&pending_id) else {
            self.pending = None;
            return Err(AppError::NotFound(format!("Profile {}", pending_id)));
        };

        self.gate.check(&profile, secret)?;
        self.commit(&profile)?;
        Ok(profile)
    }

    /// Feeds keypad input for the pending profile.
    ///
    /// Once four digits are in, the code is submitted as with [`Self::confirm`]
    /// and the confirmed profile is returned. A wrong code leaves the pad empty.
    pub fn key_in(&mut self, input: &str) -> AppResult<Option<Profile>> {
        if self.pending.is_none() {
            return Err(AppError::NothingPending);
        }
        match self.pad.push(input) {
            Some(code) => self.confirm(&code).map(Some),
            None => Ok(None),
        }
    }

    pub fn backspace(&mut self) {
        self.pad.backspace();
    }

    pub fn clear_pad(&mut self) {
        self.pad.clear();
    }

    /// Digits typed so far on the keypad
    pub fn pad_entered(&self) -> usize {
        self.pad.entered()
    }

    /// Consecutive wrong PINs for the pending profile
    pub fn pending_failures(&self) -> u32 {
        self.pending
            .as_ref()
            .map(|p| self.gate.failures(&p.id))
            .unwrap_or(0)
    }

    pub fn cancel(&mut self) -> Selection {
        self.pending = None;
        self.pad.clear();
        self.current()
    }

    /// Clears both the pending request and the committed profile
    pub fn sign_out(&mut self) -> AppResult<()> {
        self.pending = None;
        self.pad.clear();
        self.profiles.clear_active()?;
        tracing::info!("Signed out");
        Ok(())
    }

    fn commit(&mut self, profile: &Profile) -> AppResult<()> {
        self.profiles.set_active(profile)?;
        self.pending = None;
        tracing::info!(profile_id = %profile.id, kid = profile.is_kid, "Profile selected");
        Ok(())
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }
}
