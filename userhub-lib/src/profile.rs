use crate::error::ResourceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_USER_ID: u64 = 1;
pub const DEFAULT_NAME: &str = "Seppo Sutinen";
pub const DEFAULT_EMAIL: &str = "s.sutinen@cgi.com";
pub const DEFAULT_PHONE: &str = "+358407420894";
pub const DEFAULT_CITY: &str = "Helsinki";
pub const DEFAULT_ZIPCODE: &str = "Finland";
pub const DEFAULT_ROLE: &str = "IT-Architect";
pub const DEFAULT_BIO: &str = "Passionate with AI and any new technologies";

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub role: String,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: DEFAULT_USER_ID,
            name: DEFAULT_NAME.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            phone: DEFAULT_PHONE.to_string(),
            location: format!("{}, {}", DEFAULT_CITY, DEFAULT_ZIPCODE),
            role: DEFAULT_ROLE.to_string(),
            bio: DEFAULT_BIO.to_string(),
            avatar: None,
        }
    }
}

impl Profile {
    /// First letter of every word in the name, shown when there is no avatar.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect()
    }

    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Location => &self.location,
            ProfileField::Role => &self.role,
            ProfileField::Bio => &self.bio,
        }
    }

    pub fn set_field(&mut self, field: ProfileField, value: String) {
        let slot = match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
            ProfileField::Location => &mut self.location,
            ProfileField::Role => &mut self.role,
            ProfileField::Bio => &mut self.bio,
        };
        *slot = value;
    }

    /// Overwrites the fields present in `patch`. The id is never touched.
    pub fn merge(&mut self, patch: &ProfilePatch) {
        for field in ProfileField::ALL {
            if let Some(value) = patch.get(field) {
                self.set_field(field, value.to_string());
            }
        }
        if let Some(avatar) = &patch.avatar {
            self.avatar = Some(avatar.clone());
        }
    }

    /// The fields of `edited` that differ from `self`.
    pub fn diff(&self, edited: &Profile) -> ProfilePatch {
        let mut patch = ProfilePatch::default();
        for field in ProfileField::ALL {
            if self.field(field) != edited.field(field) {
                patch.set(field, edited.field(field).to_string());
            }
        }
        if self.avatar != edited.avatar {
            patch.avatar = edited.avatar.clone();
        }
        patch
    }
}

/// Partial profile, used as the body of an update and for the server echo.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfilePatch {
    pub fn get(&self, field: ProfileField) -> Option<&str> {
        let value = match field {
            ProfileField::Name => &self.name,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Location => &self.location,
            ProfileField::Role => &self.role,
            ProfileField::Bio => &self.bio,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: ProfileField, value: String) {
        let slot = match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
            ProfileField::Location => &mut self.location,
            ProfileField::Role => &mut self.role,
            ProfileField::Bio => &mut self.bio,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        ProfileField::ALL.iter().all(|f| self.get(*f).is_none()) && self.avatar.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
    Location,
    Role,
    Bio,
}

impl ProfileField {
    pub const ALL: [ProfileField; 6] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::Location,
        Self::Role,
        Self::Bio,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Location => "location",
            Self::Role => "role",
            Self::Bio => "bio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Full Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Location => "Location",
            Self::Role => "Role",
            Self::Bio => "Bio",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ResourceError::Validation(format!("unknown profile field `{}`", s)))
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub two_factor_auth: bool,
    pub dark_mode: bool,
}

/// What a fresh account starts with.
impl Default for Settings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: false,
            two_factor_auth: true,
            dark_mode: false,
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::EmailNotifications => self.email_notifications,
            SettingKey::PushNotifications => self.push_notifications,
            SettingKey::TwoFactorAuth => self.two_factor_auth,
            SettingKey::DarkMode => self.dark_mode,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        let slot = match key {
            SettingKey::EmailNotifications => &mut self.email_notifications,
            SettingKey::PushNotifications => &mut self.push_notifications,
            SettingKey::TwoFactorAuth => &mut self.two_factor_auth,
            SettingKey::DarkMode => &mut self.dark_mode,
        };
        *slot = value;
    }

    pub fn toggle(&mut self, key: SettingKey) {
        self.set(key, !self.get(key));
    }

    pub fn merge(&mut self, patch: &SettingsPatch) {
        for key in SettingKey::ALL {
            if let Some(value) = patch.get(key) {
                self.set(key, value);
            }
        }
    }

    pub fn diff(&self, edited: &Settings) -> SettingsPatch {
        let mut patch = SettingsPatch::default();
        for key in SettingKey::ALL {
            if self.get(key) != edited.get(key) {
                patch.set(key, edited.get(key));
            }
        }
        patch
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_factor_auth: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
}

impl SettingsPatch {
    pub fn get(&self, key: SettingKey) -> Option<bool> {
        match key {
            SettingKey::EmailNotifications => self.email_notifications,
            SettingKey::PushNotifications => self.push_notifications,
            SettingKey::TwoFactorAuth => self.two_factor_auth,
            SettingKey::DarkMode => self.dark_mode,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        let slot = match key {
            SettingKey::EmailNotifications => &mut self.email_notifications,
            SettingKey::PushNotifications => &mut self.push_notifications,
            SettingKey::TwoFactorAuth => &mut self.two_factor_auth,
            SettingKey::DarkMode => &mut self.dark_mode,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        SettingKey::ALL.iter().all(|key| self.get(*key).is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    EmailNotifications,
    PushNotifications,
    TwoFactorAuth,
    DarkMode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        Self::EmailNotifications,
        Self::PushNotifications,
        Self::TwoFactorAuth,
        Self::DarkMode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailNotifications => "emailNotifications",
            Self::PushNotifications => "pushNotifications",
            Self::TwoFactorAuth => "twoFactorAuth",
            Self::DarkMode => "darkMode",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EmailNotifications => "Email Notifications",
            Self::PushNotifications => "Push Notifications",
            Self::TwoFactorAuth => "Two-Factor Authentication",
            Self::DarkMode => "Dark Mode",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::EmailNotifications => "Receive notifications via email",
            Self::PushNotifications => "Receive push notifications on your device",
            Self::TwoFactorAuth => "Add an extra layer of security to your account",
            Self::DarkMode => "Use the dark color scheme",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the wire name (`twoFactorAuth`) or its kebab-case form (`two-factor-auth`).
impl FromStr for SettingKey {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.trim().chars().filter(|c| *c != '-' && *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ResourceError::Validation(format!("unknown setting `{}`", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_the_fallback_user() {
        let profile = Profile::default();
        assert_eq!(profile.id, 1);
        assert_eq!(profile.name, "Seppo Sutinen");
        assert_eq!(profile.email, "s.sutinen@cgi.com");
        assert_eq!(profile.location, "Helsinki, Finland");
        assert_eq!(profile.role, "IT-Architect");
        assert_eq!(profile.initials(), "SS");
    }

    #[test]
    fn initials_skip_extra_whitespace() {
        let profile = Profile {
            name: "  Leanne   Graham Jr ".to_string(),
            ..Profile::default()
        };
        assert_eq!(profile.initials(), "LGJ");
    }

    #[test]
    fn diff_then_merge_reproduces_edit() {
        let original = Profile::default();
        let mut edited = original.clone();
        edited.set_field(ProfileField::Name, "X".to_string());
        edited.set_field(ProfileField::Bio, "Rustacean".to_string());

        let patch = original.diff(&edited);
        assert_eq!(patch.name.as_deref(), Some("X"));
        assert_eq!(patch.bio.as_deref(), Some("Rustacean"));
        assert!(patch.email.is_none());

        let mut merged = original.clone();
        merged.merge(&patch);
        assert_eq!(merged, edited);
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let mut patch = ProfilePatch::default();
        patch.set(ProfileField::Role, "Architect".to_string());
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({ "role": "Architect" }));
    }

    #[test]
    fn field_names_parse_case_insensitively() {
        assert_eq!("Name".parse::<ProfileField>().unwrap(), ProfileField::Name);
        assert!(matches!(
            "nickname".parse::<ProfileField>(),
            Err(ResourceError::Validation(_))
        ));
    }

    #[test]
    fn setting_keys_accept_wire_and_kebab_names() {
        assert_eq!(
            "twoFactorAuth".parse::<SettingKey>().unwrap(),
            SettingKey::TwoFactorAuth
        );
        assert_eq!(
            "push-notifications".parse::<SettingKey>().unwrap(),
            SettingKey::PushNotifications
        );
        assert!("volume".parse::<SettingKey>().is_err());
    }

    #[test]
    fn settings_use_camel_case_on_the_wire() {
        let body = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "emailNotifications": true,
                "pushNotifications": false,
                "twoFactorAuth": true,
                "darkMode": false,
            })
        );
    }

    #[test]
    fn settings_diff_tracks_toggles() {
        let original = Settings::default();
        let mut edited = original;
        edited.toggle(SettingKey::DarkMode);
        edited.toggle(SettingKey::PushNotifications);
        edited.toggle(SettingKey::PushNotifications);

        let patch = original.diff(&edited);
        assert_eq!(patch.dark_mode, Some(true));
        assert!(patch.push_notifications.is_none());

        let mut merged = original;
        merged.merge(&patch);
        assert_eq!(merged, edited);
    }
}
