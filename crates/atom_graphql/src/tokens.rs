//! `user_tokens` persistence over Hasura.

use atom_common::services::{BoxFuture, TokenStore, UserToken};
use atom_common::AtomError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::client::HasuraClient;
use crate::error::GraphqlError;

const UPSERT_USER_TOKEN: &str = r#"
mutation UpsertUserToken($objects: [user_tokens_insert_input!]!) {
  insert_user_tokens(
    objects: $objects,
    on_conflict: {
      constraint: user_tokens_user_id_service_name_key,
      update_columns: [access_token, refresh_token, expiry_date, scope, token_type, id_token, meta, updated_at]
    }
  ) {
    affected_rows
  }
}
"#;

const GET_USER_TOKEN: &str = r#"
query GetUserToken($userId: String!, $serviceName: String!) {
  user_tokens(
    where: {user_id: {_eq: $userId}, service_name: {_eq: $serviceName}},
    order_by: {updated_at: desc},
    limit: 1
  ) {
    user_id
    service_name
    access_token
    refresh_token
    expiry_date
    scope
    token_type
    id_token
    meta
    updated_at
  }
}
"#;

const DELETE_USER_TOKENS: &str = r#"
mutation DeleteUserTokens($userId: String!, $serviceName: String!) {
  delete_user_tokens(where: {user_id: {_eq: $userId}, service_name: {_eq: $serviceName}}) {
    affected_rows
  }
}
"#;

/// Wire shape of a `user_tokens` row.
#[derive(Debug, Serialize, Deserialize)]
struct TokenRow {
    user_id: String,
    service_name: String,
    access_token: String,
    refresh_token: Option<String>,
    expiry_date: Option<DateTime<Utc>>,
    scope: Option<String>,
    token_type: Option<String>,
    id_token: Option<String>,
    meta: Option<serde_json::Value>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<UserToken> for TokenRow {
    fn from(token: UserToken) -> Self {
        Self {
            user_id: token.user_id,
            service_name: token.service_name,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expiry_date: token.expiry_date,
            scope: token.scope,
            token_type: token.token_type,
            id_token: token.id_token,
            meta: token.meta,
            updated_at: Some(token.updated_at.unwrap_or_else(Utc::now)),
        }
    }
}

impl From<TokenRow> for UserToken {
    fn from(row: TokenRow) -> Self {
        Self {
            user_id: row.user_id,
            service_name: row.service_name,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expiry_date: row.expiry_date,
            scope: row.scope,
            token_type: row.token_type,
            id_token: row.id_token,
            meta: row.meta,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AffectedRows {
    affected_rows: u64,
}

#[derive(Debug, Deserialize)]
struct UpsertData {
    insert_user_tokens: Option<AffectedRows>,
}

#[derive(Debug, Deserialize)]
struct DeleteData {
    delete_user_tokens: Option<AffectedRows>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    user_tokens: Vec<TokenRow>,
}

/// [`TokenStore`] backed by the `user_tokens` table.
#[derive(Debug, Clone)]
pub struct HasuraTokenStore {
    client: HasuraClient,
}

impl HasuraTokenStore {
    pub fn new(client: HasuraClient) -> Self {
        Self { client }
    }

    pub async fn upsert(&self, token: UserToken) -> Result<(), GraphqlError> {
        let user_id = token.user_id.clone();
        let service_name = token.service_name.clone();
        let variables = json!({ "objects": [TokenRow::from(token)] });

        let data: UpsertData = self
            .client
            .execute_mutation(UPSERT_USER_TOKEN, variables, "UpsertUserToken", Some(&user_id))
            .await?;

        let affected = data.insert_user_tokens.map_or(0, |r| r.affected_rows);
        if affected == 0 {
            warn!(user_id = %user_id, service = %service_name, "Token save reported 0 affected rows");
            return Err(GraphqlError::NoRowsAffected(
                "Token save did not affect any rows.".to_string(),
            ));
        }
        info!(user_id = %user_id, service = %service_name, "Token saved");
        Ok(())
    }

    pub async fn latest(
        &self,
        user_id: &str,
        service_name: &str,
    ) -> Result<Option<UserToken>, GraphqlError> {
        let data: QueryData = self
            .client
            .execute(
                GET_USER_TOKEN,
                json!({ "userId": user_id, "serviceName": service_name }),
                "GetUserToken",
                Some(user_id),
            )
            .await?;
        Ok(data.user_tokens.into_iter().next().map(UserToken::from))
    }

    pub async fn delete(&self, user_id: &str, service_name: &str) -> Result<u64, GraphqlError> {
        let data: DeleteData = self
            .client
            .execute_mutation(
                DELETE_USER_TOKENS,
                json!({ "userId": user_id, "serviceName": service_name }),
                "DeleteUserTokens",
                Some(user_id),
            )
            .await?;
        let affected = data.delete_user_tokens.map_or(0, |r| r.affected_rows);
        info!(user_id, service = service_name, affected, "Tokens deleted");
        Ok(affected)
    }
}

impl TokenStore for HasuraTokenStore {
    fn save_token(&self, token: UserToken) -> BoxFuture<'_, (), AtomError> {
        Box::pin(async move { self.upsert(token).await.map_err(AtomError::from) })
    }

    fn latest_token(
        &self,
        user_id: &str,
        service_name: &str,
    ) -> BoxFuture<'_, Option<UserToken>, AtomError> {
        let user_id = user_id.to_string();
        let service_name = service_name.to_string();
        Box::pin(async move {
            self.latest(&user_id, &service_name)
                .await
                .map_err(AtomError::from)
        })
    }

    fn delete_tokens(&self, user_id: &str, service_name: &str) -> BoxFuture<'_, u64, AtomError> {
        let user_id = user_id.to_string();
        let service_name = service_name.to_string();
        Box::pin(async move {
            self.delete(&user_id, &service_name)
                .await
                .map_err(AtomError::from)
        })
    }
}
