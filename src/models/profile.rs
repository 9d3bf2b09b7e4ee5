use serde::{Deserialize, Serialize};

/// A viewing profile.
///
/// Serialized with the field names of the stored profile blob, so the PIN
/// lives under `password`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub avatar: String,
    #[serde(default)]
    pub is_kid: bool,
    #[serde(default, rename = "password", skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
}

impl Profile {
    pub const KID_PROFILE_ID: &'static str = "kid";

    /// The kid profile seeded on first run
    pub fn seeded_kid() -> Self {
        Self {
            id: Self::KID_PROFILE_ID.to_string(),
            name: "Kids".to_string(),
            avatar: "/kid-avatar.png".to_string(),
            is_kid: true,
            pin: None,
        }
    }

    /// Creates an adult profile with a fresh id
    pub fn adult(name: String, avatar: String) -> Self {
        Self {
            id: format!("profile-{}", uuid::Uuid::new_v4()),
            name,
            avatar,
            is_kid: false,
            pin: None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.pin.is_some()
    }
}
