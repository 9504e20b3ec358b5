use crate::error::ResourceError;
use crate::profile::{Profile, ProfilePatch, Settings, SettingsPatch};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Remote operations behind the user page.
///
/// Every call is a single outbound request: no retry, no backoff.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn fetch_profile(&self, user_id: u64) -> Result<Profile, ResourceError>;
    async fn fetch_settings(&self) -> Result<Settings, ResourceError>;
    /// Returns the server's echo of the stored fields.
    async fn save_profile(
        &self,
        user_id: u64,
        patch: &ProfilePatch,
    ) -> Result<ProfilePatch, ResourceError>;
    async fn save_settings(&self, patch: &SettingsPatch) -> Result<SettingsPatch, ResourceError>;
}

#[async_trait]
impl<T: ResourceClient + ?Sized> ResourceClient for Arc<T> {
    async fn fetch_profile(&self, user_id: u64) -> Result<Profile, ResourceError> {
        (**self).fetch_profile(user_id).await
    }

    async fn fetch_settings(&self) -> Result<Settings, ResourceError> {
        (**self).fetch_settings().await
    }

    async fn save_profile(
        &self,
        user_id: u64,
        patch: &ProfilePatch,
    ) -> Result<ProfilePatch, ResourceError> {
        (**self).save_profile(user_id, patch).await
    }

    async fn save_settings(&self, patch: &SettingsPatch) -> Result<SettingsPatch, ResourceError> {
        (**self).save_settings(patch).await
    }
}

/// Fetches a profile, degrading to [`Profile::default`] on any failure.
#[instrument(skip(client))]
pub async fn fetch_profile_or_default<C: ResourceClient + ?Sized>(
    client: &C,
    user_id: u64,
) -> Profile {
    match client.fetch_profile(user_id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(error = %e, "Failed to fetch user data, using default profile");
            Profile::default()
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::network::NetError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    pub(crate) fn unavailable() -> ResourceError {
        ResourceError::Network(NetError::ServerResponse {
            status: 503,
            reason: "Service Unavailable".to_string(),
        })
    }

    /// In-memory client. A profile of `None` makes profile fetches fail.
    #[derive(Default)]
    pub(crate) struct FakeClient {
        pub(crate) profile: Option<Profile>,
        pub(crate) settings: Settings,
        pub(crate) fail_settings: AtomicBool,
        pub(crate) fail_saves: AtomicBool,
        pub(crate) echo_override: Mutex<Option<ProfilePatch>>,
        /// Held by the first settings fetch only.
        pub(crate) gate: Mutex<Option<Arc<Notify>>>,
        /// Held by the first profile save only.
        pub(crate) save_gate: Mutex<Option<Arc<Notify>>>,
        pub(crate) settings_fetches: AtomicUsize,
        pub(crate) saved_profiles: Mutex<Vec<ProfilePatch>>,
        pub(crate) saved_settings: Mutex<Vec<SettingsPatch>>,
    }

    impl FakeClient {
        pub(crate) fn with_profile(profile: Profile) -> Self {
            Self {
                profile: Some(profile),
                ..Self::default()
            }
        }

        pub(crate) fn gated(self) -> (Self, Arc<Notify>) {
            let notify = Arc::new(Notify::new());
            *self.gate.lock().unwrap() = Some(notify.clone());
            (self, notify)
        }

        pub(crate) fn gated_saves(self) -> (Self, Arc<Notify>) {
            let notify = Arc::new(Notify::new());
            *self.save_gate.lock().unwrap() = Some(notify.clone());
            (self, notify)
        }

        pub(crate) fn profile_saves(&self) -> usize {
            self.saved_profiles.lock().unwrap().len()
        }

        pub(crate) fn settings_fetches(&self) -> usize {
            self.settings_fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResourceClient for FakeClient {
        async fn fetch_profile(&self, user_id: u64) -> Result<Profile, ResourceError> {
            match &self.profile {
                Some(profile) => Ok(Profile {
                    id: user_id,
                    ..profile.clone()
                }),
                None => Err(unavailable()),
            }
        }

        async fn fetch_settings(&self) -> Result<Settings, ResourceError> {
            self.settings_fetches.fetch_add(1, Ordering::SeqCst);
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if self.fail_settings.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            Ok(self.settings)
        }

        async fn save_profile(
            &self,
            _user_id: u64,
            patch: &ProfilePatch,
        ) -> Result<ProfilePatch, ResourceError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(unavailable());
            }
            self.saved_profiles.lock().unwrap().push(patch.clone());
            let gate = self.save_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let echo = self.echo_override.lock().unwrap().clone();
            Ok(echo.unwrap_or_else(|| patch.clone()))
        }

        async fn save_settings(
            &self,
            patch: &SettingsPatch,
        ) -> Result<SettingsPatch, ResourceError> {
            self.saved_settings.lock().unwrap().push(*patch);
            Ok(*patch)
        }
    }
}
