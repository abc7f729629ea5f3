//! Profile service over the `users` collection.

use std::sync::Arc;

use grocer_store::DocumentStore;
use serde::Serialize;

use crate::customer::{NewProfile, UserProfile, DEFAULT_CITY};
use crate::error::CommerceError;
use crate::ids::UserId;

/// Collection holding customer profiles, keyed by user id.
pub const USERS: &str = "users";

#[derive(Serialize)]
struct ProfileBody<'a> {
    username: String,
    #[serde(flatten)]
    profile: &'a NewProfile,
}

/// Reads and writes customer profiles.
pub struct ProfileService<D: DocumentStore> {
    store: Arc<D>,
    default_city: String,
}

impl<D: DocumentStore> Clone for ProfileService<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            default_city: self.default_city.clone(),
        }
    }
}

impl<D: DocumentStore> ProfileService<D> {
    /// Create a profile service on a shared store.
    pub fn new(store: Arc<D>) -> Self {
        Self {
            store,
            default_city: DEFAULT_CITY.to_string(),
        }
    }

    /// Use a different city for addresses that leave it blank.
    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    /// Validate and save a profile for `user_id`, replacing any earlier one.
    pub async fn create_profile(
        &self,
        user_id: &UserId,
        profile: NewProfile,
    ) -> Result<UserProfile, CommerceError> {
        let profile = profile.normalized(&self.default_city);
        profile.validate()?;

        let body = ProfileBody {
            username: profile.username(),
            profile: &profile,
        };
        let doc = self
            .store
            .put(USERS, user_id.as_str(), serde_json::to_value(&body)?)
            .await?;
        tracing::info!(user_id = %user_id, user_type = profile.residence.user_type(), "saved profile");
        Ok(doc.decode()?)
    }

    /// Fetch the profile for `user_id`, if one was created.
    pub async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, CommerceError> {
        match self.store.get(USERS, user_id.as_str()).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Fetch the profile for `user_id`, failing if there is none.
    pub async fn require_profile(&self, user_id: &UserId) -> Result<UserProfile, CommerceError> {
        self.get_profile(user_id)
            .await?
            .ok_or_else(|| CommerceError::ProfileNotFound(user_id.to_string()))
    }

    /// All profiles, newest first.
    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>, CommerceError> {
        let docs = self.store.list(USERS).await?;
        docs.iter()
            .map(|doc| doc.decode().map_err(CommerceError::from))
            .collect()
    }
}
