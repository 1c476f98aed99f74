use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AccountIndex, UserStore};
use crate::error::AppError;
use crate::types::{UserAccount, UserProfile};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<String, UserAccount>,
    profiles: HashMap<String, UserProfile>,
}

/// HashMap-backed store. Data lives as long as the value and its clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn account_count(&self) -> usize {
        self.tables.read().await.accounts.len()
    }

    pub async fn profile_count(&self) -> usize {
        self.tables.read().await.profiles.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_account(&self, account: &UserAccount) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&account.id) {
            return Err(AppError::Conflict(format!("{} in accounts", account.id)));
        }
        tables.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn find_account_by_id(&self, id: &str) -> Result<Option<UserAccount>, AppError> {
        Ok(self.tables.read().await.accounts.get(id).cloned())
    }

    async fn find_account_by(
        &self,
        index: AccountIndex,
        value: &str,
    ) -> Result<Option<UserAccount>, AppError> {
        // Mirrors the DynamoDB index: logged-out accounts have no token entry.
        if value.is_empty() {
            return Ok(None);
        }
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|a| match index {
                AccountIndex::Email => a.email == value,
                AccountIndex::Token => a.token == value,
            })
            .cloned())
    }

    async fn update_account_token(&self, id: &str, token: &str) -> Result<UserAccount, AppError> {
        let mut tables = self.tables.write().await;
        let account = tables
            .accounts
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;
        account.token = token.to_string();
        if !token.is_empty() {
            account.last_login = Some(chrono::Utc::now().to_rfc3339());
        }
        Ok(account.clone())
    }

    async fn delete_account(&self, id: &str) -> Result<(), AppError> {
        self.tables.write().await.accounts.remove(id);
        Ok(())
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&profile.id) {
            return Err(AppError::Conflict(format!("{} in profiles", profile.id)));
        }
        tables.profiles.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.tables.read().await.profiles.get(id).cloned())
    }

    async fn delete_profile(&self, id: &str) -> Result<(), AppError> {
        self.tables.write().await.profiles.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, email: &str, token: &str) -> UserAccount {
        UserAccount {
            id: id.to_string(),
            email: email.to_string(),
            password: String::new(),
            token: token.to_string(),
            created_at: String::new(),
            last_login: None,
        }
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let store = MemoryStore::new();
        store.create_account(&account("1", "a@b.com", "")).await.unwrap();
        let err = store.create_account(&account("1", "c@d.com", "")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_indexed_lookup() {
        let store = MemoryStore::new();
        store.create_account(&account("1", "a@b.com", "tok")).await.unwrap();

        let by_email = store.find_account_by(AccountIndex::Email, "a@b.com").await.unwrap();
        assert_eq!(by_email.map(|a| a.id), Some("1".to_string()));

        let by_token = store.find_account_by(AccountIndex::Token, "tok").await.unwrap();
        assert_eq!(by_token.map(|a| a.id), Some("1".to_string()));

        assert!(store.find_account_by(AccountIndex::Token, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_token_never_matches() {
        let store = MemoryStore::new();
        store.create_account(&account("1", "a@b.com", "")).await.unwrap();
        assert!(store.find_account_by(AccountIndex::Token, "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_token_stamps_last_login() {
        let store = MemoryStore::new();
        store.create_account(&account("1", "a@b.com", "")).await.unwrap();

        let updated = store.update_account_token("1", "tok").await.unwrap();
        assert_eq!(updated.token, "tok");
        assert!(updated.last_login.is_some());

        let err = store.update_account_token("missing", "tok").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
