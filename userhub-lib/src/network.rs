use crate::client::ResourceClient;
use crate::config::ClientConfig;
use crate::error::ResourceError;
use crate::profile::{
    Profile, ProfilePatch, Settings, SettingsPatch, DEFAULT_BIO, DEFAULT_CITY, DEFAULT_EMAIL,
    DEFAULT_NAME, DEFAULT_PHONE, DEFAULT_ROLE, DEFAULT_ZIPCODE,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, event, info, instrument, Level};

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Error in reqwest transport layer: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },
    #[error("Server responded with status {status} => {reason}")]
    ServerResponse { status: u16, reason: String },
}

/// User API over HTTP. Profiles live at `{base}/users/{id}`; settings have
/// no endpoint yet and are answered locally after a fixed delay.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Result<Self, ResourceError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        info!(base_url = %config.base_url, "Creating user API client");

        Ok(Self { http, config })
    }
}

fn check_status(response: Response) -> Result<Response, NetError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(NetError::ServerResponse {
        status: status.as_u16(),
        reason: status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
    })
}

#[async_trait]
impl ResourceClient for HttpClient {
    #[instrument(skip(self))]
    async fn fetch_profile(&self, user_id: u64) -> Result<Profile, ResourceError> {
        let response = self.http.get(self.config.user_url(user_id)).send().await?;
        let user: RemoteUser = check_status(response)?.json().await?;

        event!(Level::DEBUG, "Fetched user data");
        Ok(user.into_profile(user_id))
    }

    #[instrument(skip(self))]
    async fn fetch_settings(&self) -> Result<Settings, ResourceError> {
        tokio::time::sleep(self.config.settings_fetch_delay).await;
        Ok(Settings::default())
    }

    #[instrument(skip(self, patch))]
    async fn save_profile(
        &self,
        user_id: u64,
        patch: &ProfilePatch,
    ) -> Result<ProfilePatch, ResourceError> {
        let response = self
            .http
            .put(self.config.user_url(user_id))
            .json(patch)
            .send()
            .await?;
        let echo: ProfilePatch = check_status(response)?.json().await?;

        event!(Level::DEBUG, "Updated user data");
        Ok(echo)
    }

    #[instrument(skip(self, patch))]
    async fn save_settings(&self, patch: &SettingsPatch) -> Result<SettingsPatch, ResourceError> {
        tokio::time::sleep(self.config.settings_save_delay).await;
        Ok(*patch)
    }
}

/// The user document served by the placeholder API. Anything missing or
/// empty falls back to the default profile values.
#[derive(Deserialize, Debug, Default)]
struct RemoteUser {
    id: Option<u64>,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<RemoteAddress>,
    company: Option<RemoteCompany>,
}

#[derive(Deserialize, Debug, Default)]
struct RemoteAddress {
    city: Option<String>,
    zipcode: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct RemoteCompany {
    bs: Option<String>,
    catch_phrase: Option<String>,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl RemoteUser {
    fn into_profile(self, user_id: u64) -> Profile {
        if let Some(id) = self.id.filter(|id| *id != user_id) {
            debug!(requested = user_id, returned = id, "Server returned a different user id");
        }

        let address = self.address.unwrap_or_default();
        let company = self.company.unwrap_or_default();

        Profile {
            id: user_id,
            name: or_default(self.name, DEFAULT_NAME),
            email: or_default(self.email, DEFAULT_EMAIL),
            phone: or_default(self.phone, DEFAULT_PHONE),
            location: format!(
                "{}, {}",
                or_default(address.city, DEFAULT_CITY),
                or_default(address.zipcode, DEFAULT_ZIPCODE)
            ),
            role: or_default(company.bs, DEFAULT_ROLE),
            bio: or_default(company.catch_phrase, DEFAULT_BIO),
            avatar: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn placeholder_user_maps_onto_profile() {
        let user: RemoteUser = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "city": "Gwenborough",
                "zipcode": "92998-3874"
            },
            "phone": "1-770-736-8031 x56442",
            "company": {
                "name": "Romaguera-Crona",
                "catchPhrase": "Multi-layered client-server neural-net",
                "bs": "harness real-time e-markets"
            }
        }))
        .unwrap();

        let profile = user.into_profile(1);
        assert_eq!(profile.name, "Leanne Graham");
        assert_eq!(profile.email, "Sincere@april.biz");
        assert_eq!(profile.location, "Gwenborough, 92998-3874");
        assert_eq!(profile.role, "harness real-time e-markets");
        assert_eq!(profile.bio, "Multi-layered client-server neural-net");
    }

    #[test]
    fn missing_and_empty_fields_take_defaults() {
        let user: RemoteUser = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "",
            "address": { "city": "Tampere" }
        }))
        .unwrap();

        let profile = user.into_profile(5);
        assert_eq!(profile.id, 5);
        assert_eq!(profile.name, DEFAULT_NAME);
        assert_eq!(profile.phone, DEFAULT_PHONE);
        assert_eq!(profile.location, "Tampere, Finland");
        assert_eq!(profile.role, DEFAULT_ROLE);
        assert_eq!(profile.bio, DEFAULT_BIO);
    }

    #[test]
    fn requested_id_wins_over_returned_id() {
        let user = RemoteUser {
            id: Some(9),
            ..RemoteUser::default()
        };
        assert_eq!(user.into_profile(3).id, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn settings_are_answered_after_the_configured_delay() {
        let client = HttpClient::new(ClientConfig::default()).unwrap();
        let started = tokio::time::Instant::now();

        let settings = client.fetch_settings().await.unwrap();

        assert_eq!(settings, Settings::default());
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn saved_settings_are_echoed() {
        let client = HttpClient::new(ClientConfig::default()).unwrap();
        let patch = SettingsPatch {
            dark_mode: Some(true),
            ..SettingsPatch::default()
        };

        let echo = client.save_settings(&patch).await.unwrap();

        assert_eq!(echo, patch);
    }
}
