//! Persistence for accounts and profiles.
//!
//! [`UserStore`] is the capability the services depend on. [`DynamoStore`]
//! backs it in production; [`MemoryStore`] stands in for tests and local runs.

pub mod dynamo;
pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::types::{UserAccount, UserProfile};

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

/// Secondary lookups on the accounts table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountIndex {
    Email,
    Token,
}

impl AccountIndex {
    /// Item attribute holding the indexed value
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Token => "tkn",
        }
    }

    /// Global secondary index queried for this lookup
    pub fn index_name(&self) -> &'static str {
        match self {
            Self::Email => "email-index",
            Self::Token => "token-index",
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`AppError::Conflict`] if the id is already taken.
    async fn create_account(&self, account: &UserAccount) -> Result<(), AppError>;

    async fn find_account_by_id(&self, id: &str) -> Result<Option<UserAccount>, AppError>;

    /// Look up an account through one of its secondary indexes. When several
    /// records share a value the first one returned wins.
    async fn find_account_by(
        &self,
        index: AccountIndex,
        value: &str,
    ) -> Result<Option<UserAccount>, AppError>;

    /// Replace the session token and return the updated record. An empty
    /// token logs the account out.
    async fn update_account_token(&self, id: &str, token: &str) -> Result<UserAccount, AppError>;

    async fn delete_account(&self, id: &str) -> Result<(), AppError>;

    /// Fails with [`AppError::Conflict`] if the id is already taken.
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError>;

    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, AppError>;

    async fn delete_profile(&self, id: &str) -> Result<(), AppError>;
}
