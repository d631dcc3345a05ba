use std::sync::Arc;
use tracing::info;

use crate::db::entities::user;
use crate::db::store::BacklogStore;
use crate::services::line_client::LineProfile;
use crate::web::error::AppError;

/// Maps LINE identities onto local users.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn BacklogStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn BacklogStore>) -> Self {
        Self { store }
    }

    /// Get-or-create keyed on the LINE user id. The display name is only
    /// used when the user is first created.
    pub async fn resolve_or_create(&self, profile: &LineProfile) -> Result<user::Model, AppError> {
        if profile.user_id.trim().is_empty() {
            return Err(AppError::BadUpstreamResponse("LINE profile has no user id".to_string()));
        }
        let user = self
            .store
            .find_or_create_user(&profile.user_id, &profile.display_name)
            .await?;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i32) -> Result<user::Model, AppError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
    }

    /// Deletes the account and everything it owns.
    pub async fn delete_user(&self, user_id: i32) -> Result<(), AppError> {
        if self.store.delete_user(user_id).await? {
            info!(user_id, "User deleted with all tsundokus and tags.");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User {user_id} not found")))
        }
    }
}
