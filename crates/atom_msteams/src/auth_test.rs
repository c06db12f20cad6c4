#[cfg(test)]
mod tests {
    use crate::auth::{account_meta, decode_id_token_claims, MsTeamsOAuthProvider};
    use atom_common::oauth::{OAuthProvider, TokenSet};
    use atom_config::MsTeamsConfig;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::Utc;
    use serde_json::json;

    fn id_token(claims: serde_json::Value) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        )
    }

    fn config() -> MsTeamsConfig {
        MsTeamsConfig {
            client_id: Some("app-id".to_string()),
            client_secret: Some("app-secret".to_string()),
            redirect_uri: "http://localhost:3000/api/atom/auth/msteams/callback".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn claims_are_read_from_the_payload() {
        let token = id_token(json!({"oid": "o-1", "tid": "t-9", "preferred_username": "ada@contoso.com"}));
        let claims = decode_id_token_claims(&token).unwrap();
        assert_eq!(claims.oid.as_deref(), Some("o-1"));
        assert_eq!(claims.tid.as_deref(), Some("t-9"));
        assert!(decode_id_token_claims("not-a-jwt").is_none());
    }

    #[test]
    fn meta_combines_oid_and_tid() {
        let token = id_token(json!({"oid": "o-1", "tid": "t-9"}));
        let meta = account_meta(&decode_id_token_claims(&token).unwrap());
        assert_eq!(
            meta,
            json!({
                "accountHomeAccountId": "o-1.t-9",
                "accountEnvironment": "login.microsoftonline.com",
                "accountTenantId": "t-9"
            })
        );
    }

    #[test]
    fn token_meta_keeps_previous_without_id_token() {
        let provider = MsTeamsOAuthProvider::from_config(&config()).unwrap();
        let previous = json!({"accountTenantId": "t-1"});
        let tokens = TokenSet {
            access_token: "at".to_string(),
            ..Default::default()
        };
        assert_eq!(
            provider.token_meta(&tokens, Some(&previous), Utc::now()),
            Some(previous)
        );
    }

    #[test]
    fn auth_url_targets_common_tenant() {
        let provider = MsTeamsOAuthProvider::from_config(&config()).unwrap();
        let url = url::Url::parse(&provider.auth_url("user-7").unwrap()).unwrap();
        assert_eq!(url.host_str(), Some("login.microsoftonline.com"));
        assert_eq!(url.path(), "/common/oauth2/v2.0/authorize");
        let scope = url
            .query_pairs()
            .find(|(k, _)| k == "scope")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(scope, "Chat.Read ChannelMessage.Read.All User.Read offline_access");
    }

    #[test]
    fn placeholder_secret_is_not_configured() {
        let mut cfg = config();
        cfg.client_secret = None;
        assert!(MsTeamsOAuthProvider::from_config(&cfg).is_err());
    }
}
