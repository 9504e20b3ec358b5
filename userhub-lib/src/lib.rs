pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod profile;

pub use client::{fetch_profile_or_default, ResourceClient};
pub use config::ClientConfig;
pub use error::ResourceError;
pub use lifecycle::{EditBuffer, LifecycleState, Notice, ProfileController, Snapshot};
pub use network::{HttpClient, NetError};
pub use profile::{Profile, ProfileField, ProfilePatch, SettingKey, Settings, SettingsPatch};

use std::sync::Arc;

/// A controller for `user_id` backed by the HTTP user API.
pub fn connect(
    config: ClientConfig,
    user_id: u64,
) -> Result<ProfileController<HttpClient>, ResourceError> {
    let client = HttpClient::new(config)?;
    Ok(ProfileController::new(Arc::new(client), user_id))
}
