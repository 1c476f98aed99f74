use crate::error::AppError;
use crate::password::{hash_password, verify_password};
use crate::store::AccountIndex;
use crate::types::{SignupRequest, SignupResponse, UserAccount};
use crate::users::{generate_id, Users};

const BAD_CREDENTIALS: &str = "Incorrect email or password";

impl Users {
    /// Create profile then account, then open a session for the new user.
    ///
    /// The two writes are not atomic: if the account write fails the profile
    /// stays behind under the new id.
    pub async fn sign_up(&self, req: SignupRequest) -> Result<SignupResponse, AppError> {
        if req.email.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        if req.password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }
        if req.name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        if self
            .store
            .find_account_by(AccountIndex::Email, &req.email)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(
                "Account already created with email".to_string(),
            ));
        }

        let id = generate_id();
        let password = hash_password(&req.password)?;

        self.create_profile(&id, &req.name, &req.email, req.stream_accounts)
            .await?;

        let account = UserAccount {
            id: id.clone(),
            email: req.email,
            password,
            token: String::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            last_login: None,
        };
        if let Err(e) = self.store.create_account(&account).await {
            tracing::error!(user_id = %id, "Account write failed after profile write, profile orphaned: {}", e);
            return Err(e);
        }

        let token = self.start_session(&id).await?;
        tracing::info!(user_id = %id, "Signed up new user");

        Ok(SignupResponse { user_id: id, token })
    }

    /// Verify credentials and issue a fresh session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        if email.is_empty() {
            return Err(AppError::Validation("Email is required".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }

        let account = self
            .store
            .find_account_by(AccountIndex::Email, email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

        if !verify_password(password, &account.password)? {
            tracing::info!(user_id = %account.id, "Rejected login with wrong password");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        self.start_session(&account.id).await
    }

    /// Clear the session token. Any token issued before stops authenticating.
    pub async fn logout(&self, account_id: &str) -> Result<(), AppError> {
        self.store.update_account_token(account_id, "").await?;
        tracing::info!(user_id = %account_id, "Logged out");
        Ok(())
    }

    pub async fn authenticate(&self, token: &str) -> Result<UserAccount, AppError> {
        if token.is_empty() {
            return Err(AppError::Unauthorized(
                "Authorization token is required".to_string(),
            ));
        }

        self.store
            .find_account_by(AccountIndex::Token, token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Failed to authorize request".to_string()))
    }

    async fn start_session(&self, account_id: &str) -> Result<String, AppError> {
        let token = generate_id();
        self.store.update_account_token(account_id, &token).await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, UserStore};
    use crate::types::StreamAccount;
    use std::sync::Arc;

    fn signup(email: &str, password: &str, name: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            stream_accounts: vec![StreamAccount { id: 8 }],
        }
    }

    fn users() -> (Users, MemoryStore) {
        let store = MemoryStore::new();
        (Users::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_sign_up_persists_profile_and_account() {
        let (users, store) = users();

        let resp = users.sign_up(signup("a@b.com", "x", "A")).await.unwrap();
        assert!(!resp.token.is_empty());

        let profile = store.find_profile(&resp.user_id).await.unwrap().unwrap();
        assert_eq!(profile.name, "A");
        assert_eq!(profile.stream_accounts, vec![StreamAccount { id: 8 }]);
        assert!(profile.library.content_list.is_empty());

        let account = store.find_account_by_id(&resp.user_id).await.unwrap().unwrap();
        assert_eq!(account.email, "a@b.com");
        assert_ne!(account.password, "x");
        assert_eq!(account.token, resp.token);
    }

    #[tokio::test]
    async fn test_sign_up_then_authenticate() {
        let (users, _) = users();
        let resp = users.sign_up(signup("a@b.com", "x", "A")).await.unwrap();

        let account = users.authenticate(&resp.token).await.unwrap();
        assert_eq!(account.email, "a@b.com");
        assert_eq!(account.id, resp.user_id);
    }

    #[tokio::test]
    async fn test_sign_up_rejects_taken_email() {
        let (users, store) = users();
        users.sign_up(signup("a@b.com", "x", "A")).await.unwrap();

        let err = users.sign_up(signup("a@b.com", "y", "B")).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
        assert_eq!(store.account_count().await, 1);
        assert_eq!(store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn test_sign_up_requires_fields() {
        let (users, store) = users();
        for req in [
            signup("", "x", "A"),
            signup("a@b.com", "", "A"),
            signup("a@b.com", "x", ""),
        ] {
            let err = users.sign_up(req).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(store.profile_count().await, 0);
    }

    #[tokio::test]
    async fn test_authenticate_empty_token() {
        let (users, _) = users();
        users.sign_up(signup("a@b.com", "x", "A")).await.unwrap();

        let err = users.authenticate("").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let (users, _) = users();
        let err = users.authenticate("not-a-token").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let (users, _) = users();
        let resp = users.sign_up(signup("a@b.com", "x", "A")).await.unwrap();

        users.logout(&resp.user_id).await.unwrap();

        let err = users.authenticate(&resp.token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_login_issues_new_token_each_time() {
        let (users, _) = users();
        let resp = users.sign_up(signup("a@b.com", "x", "A")).await.unwrap();

        let first = users.login("a@b.com", "x").await.unwrap();
        let second = users.login("a@b.com", "x").await.unwrap();
        assert_ne!(first, resp.token);
        assert_ne!(first, second);

        // Only the latest token is live
        assert!(users.authenticate(&first).await.is_err());
        assert!(users.authenticate(&second).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (users, _) = users();
        users.sign_up(signup("a@b.com", "x", "A")).await.unwrap();

        let err = users.login("a@b.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let err = users.login("nobody@b.com", "x").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(err.client_message(), BAD_CREDENTIALS);
    }
}
