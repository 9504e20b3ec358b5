use std::fmt;
use userhub_lib::{LifecycleState, Notice, Profile, SettingKey, Settings, Snapshot};

const NOTIFICATION_KEYS: [SettingKey; 2] =
    [SettingKey::EmailNotifications, SettingKey::PushNotifications];
const SECURITY_KEYS: [SettingKey; 1] = [SettingKey::TwoFactorAuth];
const APPEARANCE_KEYS: [SettingKey; 1] = [SettingKey::DarkMode];

/// Text view of a controller snapshot.
struct UserPage<'a>(&'a Snapshot);

impl fmt::Display for UserPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(f, "User Profile")?;
        writeln!(f, "Manage your personal information and account settings")?;
        writeln!(f)?;

        if let Some(notice) = &snapshot.notice {
            writeln!(f, "{}", render_notice(notice))?;
            writeln!(f)?;
        }

        match (&snapshot.state, snapshot.displayed()) {
            (LifecycleState::Idle, _) => writeln!(f, "Nothing loaded yet."),
            (LifecycleState::Loading, _) => writeln!(f, "Loading user data..."),
            (LifecycleState::Failed(reason), _) => {
                writeln!(f, "Failed to load user data: {}", reason)?;
                writeln!(f, "Run the command again to retry.")
            }
            (LifecycleState::Ready { .. }, Some((profile, settings))) => {
                write_profile(f, profile, snapshot.is_editing())?;
                write_settings(f, settings)
            }
            (LifecycleState::Ready { .. }, None) => Ok(()),
        }
    }
}

pub fn render(snapshot: &Snapshot) -> String {
    UserPage(snapshot).to_string()
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Saved => "Profile updated successfully!".to_string(),
        Notice::Error(message) => format!("Error: {}", message),
    }
}

fn write_profile(f: &mut fmt::Formatter<'_>, profile: &Profile, editing: bool) -> fmt::Result {
    let avatar = profile
        .avatar
        .clone()
        .unwrap_or_else(|| format!("[{}]", profile.initials()));
    let marker = if editing { "  (editing)" } else { "" };

    writeln!(f, "{} {}{}", avatar, profile.name, marker)?;
    writeln!(f, "{}", profile.role)?;
    writeln!(f, "{}", profile.bio)?;
    writeln!(f)?;
    writeln!(f, "Contact Information")?;
    writeln!(f, "  {:<10}{}", "Email", profile.email)?;
    writeln!(f, "  {:<10}{}", "Phone", profile.phone)?;
    writeln!(f, "  {:<10}{}", "Location", profile.location)?;
    writeln!(f)
}

fn write_settings(f: &mut fmt::Formatter<'_>, settings: &Settings) -> fmt::Result {
    let sections: [(&str, &[SettingKey]); 3] = [
        ("Notification Preferences", &NOTIFICATION_KEYS),
        ("Security Settings", &SECURITY_KEYS),
        ("Appearance", &APPEARANCE_KEYS),
    ];

    for (title, keys) in sections {
        writeln!(f, "{}", title)?;
        for key in keys {
            let mark = if settings.get(*key) { "x" } else { " " };
            writeln!(f, "  [{}] {:<27}{}", mark, key.label(), key.description())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use userhub_lib::EditBuffer;

    fn ready() -> Snapshot {
        Snapshot {
            state: LifecycleState::Ready {
                profile: Profile::default(),
                settings: Settings::default(),
            },
            edit: None,
            notice: None,
        }
    }

    #[test]
    fn ready_state_shows_card_and_settings() {
        let text = render(&ready());
        assert!(text.contains("[SS] Seppo Sutinen"));
        assert!(text.contains("s.sutinen@cgi.com"));
        assert!(text.contains("[x] Email Notifications"));
        assert!(text.contains("[ ] Push Notifications"));
        assert!(!text.contains("(editing)"));
    }

    #[test]
    fn editing_shows_the_buffer() {
        let mut snapshot = ready();
        let mut profile = Profile::default();
        profile.name = "Ada Lovelace".to_string();
        snapshot.edit = Some(EditBuffer {
            profile,
            settings: Settings::default(),
        });

        let text = render(&snapshot);
        assert!(text.contains("[AL] Ada Lovelace  (editing)"));
    }

    #[test]
    fn failure_and_notice_are_reported() {
        let snapshot = Snapshot {
            state: LifecycleState::Failed("timed out".to_string()),
            edit: None,
            notice: Some(Notice::Error("save failed".to_string())),
        };

        let text = render(&snapshot);
        assert!(text.contains("Error: save failed"));
        assert!(text.contains("Failed to load user data: timed out"));
    }
}
