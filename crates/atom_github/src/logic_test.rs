#[cfg(test)]
mod tests {
    use crate::logic::GithubSkills;
    use crate::models::{NewIssue, PageOptions, StateOptions};
    use atom_common::mock::InMemoryCredentialStore;
    use atom_common::services::service_names::GITHUB_API_KEY;
    use atom_common::services::CredentialStore;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn skills(server: &MockServer) -> GithubSkills {
        let credentials =
            InMemoryCredentialStore::new().with_secret("user-1", GITHUB_API_KEY, "ghp_abc");
        GithubSkills::new(
            Some(Arc::new(credentials) as Arc<dyn CredentialStore>),
            Some(server.uri()),
            Some("atom-test".to_string()),
        )
    }

    fn repo_json(id: u64, name: &str) -> serde_json::Value {
        json!({
            "id": id, "name": name, "full_name": format!("octo/{}", name),
            "private": false, "html_url": format!("https://github.com/octo/{}", name),
            "description": null, "default_branch": "main",
            "updated_at": "2026-03-01T10:00:00Z", "owner": {"login": "octo"}
        })
    }

    fn issue_json(number: u64, pull: bool) -> serde_json::Value {
        let mut issue = json!({
            "id": 1000 + number, "number": number, "title": format!("Issue {}", number),
            "state": "open", "html_url": format!("https://github.com/octo/app/issues/{}", number),
            "body": null, "user": {"login": "ada"}, "labels": [{"name": "bug"}]
        });
        if pull {
            issue["pull_request"] = json!({"url": "https://api.github.com/repos/octo/app/pulls/1"});
        }
        issue
    }

    #[tokio::test]
    async fn repositories_use_defaults_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/repos"))
            .and(header("authorization", "Bearer ghp_abc"))
            .and(header("accept", "application/vnd.github+json"))
            .and(header("user-agent", "atom-test"))
            .and(query_param("per_page", "30"))
            .and(query_param("page", "1"))
            .and(query_param("sort", "updated"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([repo_json(1, "app")])))
            .expect(1)
            .mount(&server)
            .await;

        let response = skills(&server)
            .list_repositories("user-1", &PageOptions::default())
            .await;
        assert!(response.ok);
        let repos = response.data.unwrap();
        assert_eq!(repos[0].full_name, "octo/app");
        assert_eq!(repos[0].owner.login, "octo");
    }

    #[tokio::test]
    async fn issues_exclude_pull_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/issues"))
            .and(query_param("state", "open"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([issue_json(1, true), issue_json(2, false)])),
            )
            .mount(&server)
            .await;

        let issues = skills(&server)
            .list_issues("user-1", "octo", "app", &StateOptions::default())
            .await
            .data
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].number, 2);
        assert_eq!(issues[0].labels[0].name, "bug");
    }

    #[tokio::test]
    async fn pull_requests_pass_state_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/pulls"))
            .and(query_param("state", "closed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 7, "number": 3, "title": "Fix build", "state": "closed",
                "html_url": "https://github.com/octo/app/pull/3", "user": {"login": "ada"},
                "draft": false, "head": {"ref": "fix-build"}, "base": {"ref": "main"}
            }])))
            .mount(&server)
            .await;

        let options = StateOptions {
            state: Some("closed".to_string()),
            ..Default::default()
        };
        let pulls = skills(&server)
            .list_pull_requests("user-1", "octo", "app", &options)
            .await
            .data
            .unwrap();
        assert_eq!(pulls[0].head.ref_name, "fix-build");
        assert_eq!(pulls[0].base.ref_name, "main");
    }

    #[tokio::test]
    async fn create_issue_posts_title_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octo/app/issues"))
            .and(body_json(json!({"title": "Crash on start", "body": "Steps..."})))
            .respond_with(ResponseTemplate::new(201).set_body_json(issue_json(9, false)))
            .expect(1)
            .mount(&server)
            .await;

        let issue = NewIssue {
            title: "Crash on start".to_string(),
            body: Some("Steps...".to_string()),
        };
        let created = skills(&server)
            .create_issue("user-1", "octo", "app", &issue)
            .await;
        assert_eq!(created.data.unwrap().number, 9);
    }

    #[tokio::test]
    async fn blank_title_is_rejected_before_calling_github() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let issue = NewIssue {
            title: "  ".to_string(),
            body: None,
        };
        let response = skills(&server)
            .create_issue("user-1", "octo", "app", &issue)
            .await;
        assert_eq!(response.error_code(), Some("VALIDATION_ERROR"));
        assert_eq!(response.error.unwrap().status, 400);
    }

    #[tokio::test]
    async fn status_codes_map_to_error_codes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/missing/issues"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/repos"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/app/pulls"))
            .respond_with(ResponseTemplate::new(403).set_body_json(
                json!({"message": "API rate limit exceeded"}),
            ))
            .mount(&server)
            .await;

        let skills = skills(&server);
        let missing = skills
            .list_issues("user-1", "octo", "missing", &StateOptions::default())
            .await;
        assert_eq!(missing.error_code(), Some("GITHUB_NOT_FOUND"));

        let unauthorized = skills
            .list_repositories("user-1", &PageOptions::default())
            .await;
        assert_eq!(unauthorized.error_code(), Some("GITHUB_AUTH_ERROR"));

        let limited = skills
            .list_pull_requests("user-1", "octo", "app", &StateOptions::default())
            .await;
        assert_eq!(limited.error_code(), Some("GITHUB_API_ERROR"));
        assert!(limited.error.unwrap().message.contains("rate limit"));
    }

    #[tokio::test]
    async fn missing_key_is_config_error() {
        let skills = GithubSkills::new(
            Some(Arc::new(InMemoryCredentialStore::new()) as Arc<dyn CredentialStore>),
            None,
            None,
        );
        let response = skills
            .list_repositories("user-1", &PageOptions::default())
            .await;
        assert_eq!(response.error_code(), Some("GITHUB_CONFIG_ERROR"));

        let unconfigured = GithubSkills::new(None, None, None);
        let response = unconfigured
            .list_repositories("user-1", &PageOptions::default())
            .await;
        assert_eq!(response.error_code(), Some("GITHUB_CONFIG_ERROR"));
    }
}
