use crate::network::NetError;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Network error => {0}")]
    Network(#[from] NetError),
    #[error("Invalid input => {0}")]
    Validation(String),
    #[error("User data has not been loaded")]
    NotReady,
    #[error("No edit in progress")]
    NotEditing,
}

impl ResourceError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for ResourceError {
    fn from(source: reqwest::Error) -> Self {
        Self::Network(NetError::from(source))
    }
}
