use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client as DynamoClient;

use super::{AccountIndex, UserStore};
use crate::config::Config;
use crate::error::AppError;
use crate::types::{Library, LibraryEntry, StreamAccount, UserAccount, UserProfile};

type Item = HashMap<String, AttributeValue>;

/// Accounts and profiles live in two tables keyed by `id`. The accounts table
/// carries `email-index` and `token-index` global secondary indexes
/// (projection ALL) so both can be queried directly.
#[derive(Clone)]
pub struct DynamoStore {
    client: DynamoClient,
    accounts_table: String,
    profiles_table: String,
}

impl DynamoStore {
    pub fn new(client: DynamoClient, accounts_table: &str, profiles_table: &str) -> Self {
        Self {
            client,
            accounts_table: accounts_table.to_string(),
            profiles_table: profiles_table.to_string(),
        }
    }

    /// Build the DynamoDB client from the configured region and optional endpoint.
    pub async fn from_config(config: &Config) -> Self {
        let sdk_config = aws_config::from_env()
            .region(aws_sdk_dynamodb::config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.dynamo_endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self::new(
            DynamoClient::from_conf(builder.build()),
            &config.accounts_table,
            &config.profiles_table,
        )
    }

    async fn put_new(&self, table: &str, item: Item) -> Result<(), AppError> {
        let id = item
            .get("id")
            .and_then(|v| v.as_s().ok())
            .cloned()
            .unwrap_or_default();

        let result = self
            .client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e
                    .as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(AppError::Conflict(format!("{} in {}", id, table)))
            }
            Err(e) => Err(AppError::Storage(format!("Failed to write to {}: {:?}", table, e))),
        }
    }

    async fn get_by_id(&self, table: &str, id: &str) -> Result<Option<Item>, AppError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read from {}: {:?}", table, e)))?;

        Ok(output.item().cloned())
    }

    async fn delete_by_id(&self, table: &str, id: &str) -> Result<(), AppError> {
        self.client
            .delete_item()
            .table_name(table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete from {}: {:?}", table, e)))?;

        Ok(())
    }
}

#[async_trait]
impl UserStore for DynamoStore {
    async fn create_account(&self, account: &UserAccount) -> Result<(), AppError> {
        self.put_new(&self.accounts_table, account_to_item(account)).await
    }

    async fn find_account_by_id(&self, id: &str) -> Result<Option<UserAccount>, AppError> {
        self.get_by_id(&self.accounts_table, id)
            .await?
            .map(|item| account_from_item(&item))
            .transpose()
    }

    async fn find_account_by(
        &self,
        index: AccountIndex,
        value: &str,
    ) -> Result<Option<UserAccount>, AppError> {
        let output = self
            .client
            .query()
            .table_name(&self.accounts_table)
            .index_name(index.index_name())
            .key_condition_expression("#attr = :value")
            .expression_attribute_names("#attr", index.attribute())
            .expression_attribute_values(":value", AttributeValue::S(value.to_string()))
            .limit(1)
            .send()
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to query {} on {}: {:?}",
                    index.index_name(),
                    self.accounts_table,
                    e
                ))
            })?;

        output.items().first().map(account_from_item).transpose()
    }

    async fn update_account_token(&self, id: &str, token: &str) -> Result<UserAccount, AppError> {
        let mut request = self
            .client
            .update_item()
            .table_name(&self.accounts_table)
            .key("id", AttributeValue::S(id.to_string()))
            .condition_expression("attribute_exists(id)")
            .return_values(ReturnValue::AllNew);

        // GSI key attributes cannot hold empty strings, so logging out drops
        // the attribute instead of blanking it.
        request = if token.is_empty() {
            request.update_expression("REMOVE tkn")
        } else {
            request
                .update_expression("SET tkn = :t, last_login = :now")
                .expression_attribute_values(":t", AttributeValue::S(token.to_string()))
                .expression_attribute_values(
                    ":now",
                    AttributeValue::S(chrono::Utc::now().to_rfc3339()),
                )
        };

        let output = match request.send().await {
            Ok(output) => output,
            Err(e)
                if e
                    .as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                return Err(AppError::NotFound("Account not found".to_string()));
            }
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to update token in {}: {:?}",
                    self.accounts_table, e
                )))
            }
        };

        let attributes = output
            .attributes()
            .ok_or_else(|| AppError::Storage("UpdateItem returned no attributes".to_string()))?;
        account_from_item(attributes)
    }

    async fn delete_account(&self, id: &str) -> Result<(), AppError> {
        self.delete_by_id(&self.accounts_table, id).await
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.put_new(&self.profiles_table, profile_to_item(profile)).await
    }

    async fn find_profile(&self, id: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_by_id(&self.profiles_table, id)
            .await?
            .map(|item| profile_from_item(&item))
            .transpose()
    }

    async fn delete_profile(&self, id: &str) -> Result<(), AppError> {
        self.delete_by_id(&self.profiles_table, id).await
    }
}

// ========== ITEM MAPPING ==========

fn get_s(item: &Item, key: &str) -> Option<String> {
    item.get(key).and_then(|v| v.as_s().ok()).map(|s| s.to_string())
}

fn require_s(item: &Item, key: &str) -> Result<String, AppError> {
    get_s(item, key).ok_or_else(|| AppError::Storage(format!("Item is missing '{}'", key)))
}

fn get_n(item: &Item, key: &str) -> Option<i64> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
}

fn id_map(id: i64) -> AttributeValue {
    AttributeValue::M(HashMap::from([("id".to_string(), AttributeValue::N(id.to_string()))]))
}

fn ids_from_list(value: Option<&AttributeValue>) -> Vec<i64> {
    value
        .and_then(|v| v.as_l().ok())
        .map(|list| {
            list.iter()
                .filter_map(|entry| entry.as_m().ok())
                .filter_map(|m| get_n(m, "id"))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn account_to_item(account: &UserAccount) -> Item {
    let mut item = HashMap::from([
        ("id".to_string(), AttributeValue::S(account.id.clone())),
        ("email".to_string(), AttributeValue::S(account.email.clone())),
        ("password".to_string(), AttributeValue::S(account.password.clone())),
        ("created_at".to_string(), AttributeValue::S(account.created_at.clone())),
    ]);
    if !account.token.is_empty() {
        item.insert("tkn".to_string(), AttributeValue::S(account.token.clone()));
    }
    if let Some(last_login) = &account.last_login {
        item.insert("last_login".to_string(), AttributeValue::S(last_login.clone()));
    }
    item
}

pub(crate) fn account_from_item(item: &Item) -> Result<UserAccount, AppError> {
    Ok(UserAccount {
        id: require_s(item, "id")?,
        email: require_s(item, "email")?,
        password: get_s(item, "password").unwrap_or_default(),
        token: get_s(item, "tkn").unwrap_or_default(),
        created_at: get_s(item, "created_at").unwrap_or_default(),
        last_login: get_s(item, "last_login"),
    })
}

pub(crate) fn profile_to_item(profile: &UserProfile) -> Item {
    let stream_accounts = profile
        .stream_accounts
        .iter()
        .map(|a| id_map(a.id))
        .collect();
    let content_list = profile
        .library
        .content_list
        .iter()
        .map(|c| id_map(c.id))
        .collect();

    HashMap::from([
        ("id".to_string(), AttributeValue::S(profile.id.clone())),
        ("name".to_string(), AttributeValue::S(profile.name.clone())),
        ("email".to_string(), AttributeValue::S(profile.email.clone())),
        ("stream_accounts".to_string(), AttributeValue::L(stream_accounts)),
        (
            "library".to_string(),
            AttributeValue::M(HashMap::from([(
                "content_list".to_string(),
                AttributeValue::L(content_list),
            )])),
        ),
    ])
}

pub(crate) fn profile_from_item(item: &Item) -> Result<UserProfile, AppError> {
    let content_list = item
        .get("library")
        .and_then(|v| v.as_m().ok())
        .map(|library| ids_from_list(library.get("content_list")))
        .unwrap_or_default();

    Ok(UserProfile {
        id: require_s(item, "id")?,
        name: get_s(item, "name").unwrap_or_default(),
        email: get_s(item, "email").unwrap_or_default(),
        stream_accounts: ids_from_list(item.get("stream_accounts"))
            .into_iter()
            .map(|id| StreamAccount { id })
            .collect(),
        library: Library {
            content_list: content_list.into_iter().map(|id| LibraryEntry { id }).collect(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(token: &str) -> UserAccount {
        UserAccount {
            id: "acct-1".to_string(),
            email: "a@b.com".to_string(),
            password: "$argon2id$v=19$stub".to_string(),
            token: token.to_string(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            last_login: None,
        }
    }

    #[test]
    fn test_account_item_roundtrip_keeps_token() {
        let item = account_to_item(&account("tok-1"));
        assert_eq!(item.get("tkn").and_then(|v| v.as_s().ok()).map(String::as_str), Some("tok-1"));
        assert!(!item.contains_key("last_login"));

        let back = account_from_item(&item).unwrap();
        assert_eq!(back, account("tok-1"));
    }

    #[test]
    fn test_logged_out_account_has_no_token_attribute() {
        let item = account_to_item(&account(""));
        assert!(!item.contains_key("tkn"));

        let back = account_from_item(&item).unwrap();
        assert_eq!(back.token, "");
        assert!(!back.is_logged_in());
    }

    #[test]
    fn test_account_missing_email_is_storage_error() {
        let mut item = account_to_item(&account("t"));
        item.remove("email");
        assert!(matches!(account_from_item(&item), Err(AppError::Storage(_))));
    }

    #[test]
    fn test_profile_item_lists() {
        let profile = UserProfile {
            id: "acct-1".to_string(),
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            stream_accounts: vec![StreamAccount { id: 8 }, StreamAccount { id: 337 }],
            library: Library {
                content_list: vec![LibraryEntry { id: 603 }],
            },
        };

        let item = profile_to_item(&profile);
        let streams = item.get("stream_accounts").unwrap().as_l().unwrap();
        assert_eq!(streams.len(), 2);

        assert_eq!(profile_from_item(&item).unwrap(), profile);
    }

    #[test]
    fn test_profile_without_library_reads_empty() {
        let item = HashMap::from([
            ("id".to_string(), AttributeValue::S("acct-1".to_string())),
            ("name".to_string(), AttributeValue::S("A".to_string())),
        ]);
        let profile = profile_from_item(&item).unwrap();
        assert!(profile.library.content_list.is_empty());
        assert!(profile.stream_accounts.is_empty());
    }
}
