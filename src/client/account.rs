use reqwest::Method;
use serde_json::Value;

use super::{PublerClient, RequestOptions, Result};

impl PublerClient {
    /// Profile of the user owning the API key.
    pub async fn me(&self) -> Result<Value> {
        self.request(Method::GET, "/users/me", RequestOptions::new())
            .await
    }

    pub async fn list_workspaces(&self) -> Result<Value> {
        self.request(Method::GET, "/workspaces", RequestOptions::new())
            .await
    }

    /// Social accounts connected to the current workspace.
    pub async fn list_accounts(&self) -> Result<Value> {
        self.request(Method::GET, "/accounts", RequestOptions::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::client::{PublerClient, WORKSPACE_HEADER};

    #[tokio::test]
    async fn list_workspaces_returns_body() {
        let server = MockServer::start().await;
        let body = json!([{"id": "w1", "name": "Agency"}]);

        Mock::given(method("GET"))
            .and(path("/workspaces"))
            .and(header("Authorization", "Bearer-API key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = PublerClient::with_base_url("key", &server.uri()).unwrap();
        assert_eq!(client.list_workspaces().await.unwrap(), body);
    }

    #[tokio::test]
    async fn list_accounts_uses_context_workspace() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/accounts"))
            .and(header(WORKSPACE_HEADER, "ws-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = PublerClient::with_base_url("key", &server.uri())
            .unwrap()
            .with_workspace(Some("ws-9".to_string()));
        assert_eq!(client.list_accounts().await.unwrap(), json!([{"id": "a1"}]));
    }
}
