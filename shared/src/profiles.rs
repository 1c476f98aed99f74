use crate::error::AppError;
use crate::password::hash_password;
use crate::types::{Library, StreamAccount, UpdateProfileRequest, UserAccount, UserProfile};
use crate::users::Users;

impl Users {
    /// New profiles always start with an empty library.
    pub async fn create_profile(
        &self,
        id: &str,
        name: &str,
        email: &str,
        stream_accounts: Vec<StreamAccount>,
    ) -> Result<(), AppError> {
        let profile = UserProfile {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            stream_accounts,
            library: Library::default(),
        };
        self.store.create_profile(&profile).await
    }

    pub async fn get_profile(&self, id: &str) -> Result<UserProfile, AppError> {
        self.store
            .find_profile(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    pub async fn delete_profile(&self, id: &str) -> Result<(), AppError> {
        self.store.delete_profile(id).await
    }

    /// Replace the caller's profile and account with merged values.
    ///
    /// Runs as delete-then-recreate. Unset or empty fields keep their old
    /// values, the library and email carry over, and the account is recreated
    /// with the same session token. A failure after the deletes leaves the
    /// user partially removed; it is logged and not repaired.
    pub async fn update_profile(
        &self,
        token: &str,
        req: UpdateProfileRequest,
    ) -> Result<(), AppError> {
        let account = self.authenticate(token).await?;
        let profile = self.get_profile(&account.id).await?;

        let name = req
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| profile.name.clone());
        let password = match req.password.filter(|p| !p.is_empty()) {
            Some(p) => hash_password(&p)?,
            None => account.password.clone(),
        };
        let stream_accounts = req
            .stream_accounts
            .unwrap_or_else(|| profile.stream_accounts.clone());

        let new_profile = UserProfile {
            id: account.id.clone(),
            name,
            email: account.email.clone(),
            stream_accounts,
            library: profile.library,
        };
        let new_account = UserAccount {
            password,
            token: token.to_string(),
            ..account
        };

        self.store.delete_profile(&new_profile.id).await?;
        self.store.delete_account(&new_account.id).await?;

        let recreated = async {
            self.store.create_profile(&new_profile).await?;
            self.store.create_account(&new_account).await
        };
        if let Err(e) = recreated.await {
            tracing::error!(user_id = %new_account.id, "Profile update failed after delete: {}", e);
            return Err(e);
        }

        tracing::info!(user_id = %new_account.id, "Updated profile");
        Ok(())
    }
}
