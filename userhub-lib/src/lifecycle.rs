//! Load/edit lifecycle for a single user's profile and settings.
//!
//! The controller moves through `Idle -> Loading -> {Ready, Failed}`. While
//! `Ready` an [`EditBuffer`] may be opened; edits touch only the buffer until
//! they are committed through the [`ResourceClient`] or discarded.
//!
//! Every operation that awaits the client carries a [`CancellationToken`].
//! Results are written back only if that token is still live, so a torn down
//! controller or a superseded load never mutates state.

use crate::client::{fetch_profile_or_default, ResourceClient};
use crate::error::ResourceError;
use crate::profile::{Profile, ProfileField, SettingKey, Settings};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, event, info, instrument, warn, Level};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Loading,
    Ready {
        profile: Profile,
        settings: Settings,
    },
    Failed(String),
}

/// Uncommitted working copy, only present while the state is `Ready`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    pub profile: Profile,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub state: LifecycleState,
    pub edit: Option<EditBuffer>,
    pub notice: Option<Notice>,
}

impl Snapshot {
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LifecycleState::Loading)
    }

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LifecycleState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// The values a view should show: the buffer while editing, otherwise
    /// the committed payload.
    pub fn displayed(&self) -> Option<(&Profile, &Settings)> {
        if let Some(edit) = &self.edit {
            return Some((&edit.profile, &edit.settings));
        }
        match &self.state {
            LifecycleState::Ready { profile, settings } => Some((profile, settings)),
            _ => None,
        }
    }

    fn committed(&self) -> Result<(&Profile, &Settings), ResourceError> {
        match &self.state {
            LifecycleState::Ready { profile, settings } => Ok((profile, settings)),
            _ => Err(ResourceError::NotReady),
        }
    }

    fn edit_mut(&mut self) -> Result<&mut EditBuffer, ResourceError> {
        self.committed()?;
        self.edit.as_mut().ok_or(ResourceError::NotEditing)
    }
}

#[derive(Debug, Default)]
struct Inner {
    snapshot: Snapshot,
    load_token: Option<CancellationToken>,
    /// Belongs to the open edit buffer; cancelled when that buffer goes away.
    edit_token: Option<CancellationToken>,
}

impl Inner {
    fn close_edit(&mut self) {
        self.snapshot.edit = None;
        if let Some(token) = self.edit_token.take() {
            token.cancel();
        }
    }
}

pub struct ProfileController<C: ResourceClient + ?Sized> {
    client: Arc<C>,
    user_id: u64,
    inner: Arc<Mutex<Inner>>,
    token: CancellationToken,
}

impl<C: ResourceClient + ?Sized> Clone for ProfileController<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            user_id: self.user_id,
            inner: self.inner.clone(),
            token: self.token.clone(),
        }
    }
}

impl<C: ResourceClient + ?Sized> std::fmt::Debug for ProfileController<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileController")
            .field("user_id", &self.user_id)
            .field("torn_down", &self.token.is_cancelled())
            .finish()
    }
}

impl<C: ResourceClient + ?Sized> ProfileController<C> {
    pub fn new(client: Arc<C>, user_id: u64) -> Self {
        Self {
            client,
            user_id,
            inner: Arc::new(Mutex::new(Inner::default())),
            token: CancellationToken::new(),
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `update` unless `token` has been cancelled. The check happens
    /// under the lock so a concurrent refetch cannot slip in between.
    fn apply<F: FnOnce(&mut Inner)>(&self, token: &CancellationToken, update: F) -> bool {
        let mut inner = self.lock();
        if token.is_cancelled() {
            debug!(user_id = self.user_id, "Discarding stale result");
            return false;
        }
        update(&mut *inner);
        true
    }

    /// Enters `Loading`, superseding any load still in flight.
    fn start_loading(&self) -> Option<CancellationToken> {
        let mut inner = self.lock();
        if self.token.is_cancelled() {
            return None;
        }
        if let Some(previous) = inner.load_token.take() {
            previous.cancel();
        }
        inner.close_edit();
        let token = self.token.child_token();
        inner.load_token = Some(token.clone());
        inner.snapshot = Snapshot {
            state: LifecycleState::Loading,
            edit: None,
            notice: None,
        };
        Some(token)
    }

    /// Fetches profile and settings together. A failed profile fetch
    /// degrades to the default profile; a failed settings fetch ends in
    /// `Failed`.
    #[instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn load(&self) {
        let Some(token) = self.start_loading() else {
            warn!("Load requested after teardown");
            return;
        };

        let (profile, settings) = tokio::join!(
            fetch_profile_or_default(self.client.as_ref(), self.user_id),
            self.client.fetch_settings()
        );

        let state = match settings {
            Ok(settings) => LifecycleState::Ready { profile, settings },
            Err(e) => {
                warn!(error = %e, "Failed to fetch user settings");
                LifecycleState::Failed(e.to_string())
            }
        };

        if self.apply(&token, |inner| inner.snapshot.state = state) {
            event!(Level::DEBUG, "Load finished");
        }
    }

    /// The only way out of `Failed`; nothing retries on its own.
    pub async fn refetch(&self) {
        self.load().await
    }

    pub fn begin_edit(&self) -> Result<(), ResourceError> {
        let mut inner = self.lock();
        if inner.snapshot.edit.is_some() {
            return Ok(());
        }
        let (profile, settings) = inner.snapshot.committed()?;
        let buffer = EditBuffer {
            profile: profile.clone(),
            settings: *settings,
        };
        inner.snapshot.edit = Some(buffer);
        inner.snapshot.notice = None;
        inner.edit_token = Some(self.token.child_token());
        Ok(())
    }

    pub fn update_field(
        &self,
        field: ProfileField,
        value: impl Into<String>,
    ) -> Result<(), ResourceError> {
        let mut inner = self.lock();
        inner.snapshot.edit_mut()?.profile.set_field(field, value.into());
        Ok(())
    }

    pub fn toggle_setting(&self, key: SettingKey) -> Result<(), ResourceError> {
        let mut inner = self.lock();
        inner.snapshot.edit_mut()?.settings.toggle(key);
        Ok(())
    }

    /// Drops the buffer. The committed payload is left exactly as it was.
    pub fn cancel_edit(&self) -> Result<(), ResourceError> {
        let mut inner = self.lock();
        inner.snapshot.edit_mut()?;
        inner.close_edit();
        Ok(())
    }

    pub fn dismiss_notice(&self) {
        self.lock().snapshot.notice = None;
    }

    /// Saves the profile, then the settings. On success the server's echo,
    /// merged over the buffer, becomes the new `Ready` payload. On failure
    /// the buffer stays so the save can be retried.
    ///
    /// The result only lands on the buffer that was committed: if that buffer
    /// was cancelled or replaced while saving, the result is discarded.
    #[instrument(skip(self), fields(user_id = self.user_id))]
    pub async fn commit_edit(&self) -> Result<(), ResourceError> {
        let (token, profile_patch, settings_patch, edited) = {
            let mut inner = self.lock();
            let edited = inner.snapshot.edit_mut()?.clone();
            let token = inner
                .edit_token
                .clone()
                .unwrap_or_else(|| self.token.child_token());
            let (profile, settings) = inner.snapshot.committed()?;
            (
                token,
                profile.diff(&edited.profile),
                settings.diff(&edited.settings),
                edited,
            )
        };

        let saved = async {
            let profile_echo = self
                .client
                .save_profile(self.user_id, &profile_patch)
                .await?;
            let settings_echo = self.client.save_settings(&settings_patch).await?;
            Ok::<_, ResourceError>((profile_echo, settings_echo))
        }
        .await;

        match saved {
            Ok((profile_echo, settings_echo)) => {
                let mut profile = edited.profile;
                profile.merge(&profile_echo);
                let mut settings = edited.settings;
                settings.merge(&settings_echo);

                if self.apply(&token, |inner| {
                    inner.snapshot.state = LifecycleState::Ready { profile, settings };
                    inner.snapshot.notice = Some(Notice::Saved);
                    inner.close_edit();
                }) {
                    info!("Profile updated");
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to update user data");
                let message = e.to_string();
                self.apply(&token, |inner| {
                    inner.snapshot.notice = Some(Notice::Error(message));
                });
                Err(e)
            }
        }
    }

    /// Marks the controller as gone. Operations still in flight finish but
    /// their results are discarded.
    pub fn teardown(&self) {
        info!(user_id = self.user_id, "Tearing down profile controller");
        self.token.cancel();
    }
}
