use anyhow::{anyhow, Result};
use futures::Future;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

pub use crate::client::*;

pub struct TestUser {
    pub user_id: String,
    pub email: String,
    pub api_key: String,
    pub client: TestClient,
}

impl std::fmt::Debug for TestUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestUser")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

pub struct TestApp {
    /// A client set to the base url of the server, with no API key.
    pub client: TestClient,
    pub address: String,
    pub base_url: String,
}

async fn start_app() -> Result<TestApp> {
    let config = ideaboard_api::config::Config {
        port: 0, // Bind to random port
        host: "127.0.0.1".to_string(),
        honeycomb_team: None,
        honeycomb_dataset: String::new(),
        env: "test".to_string(),
        bootstrap: None,
    };
    Lazy::force(&ideaboard_test::TRACING);
    let server = ideaboard_api::create_server(config).await?;
    let host = server.host.clone();
    let port = server.port;

    tokio::task::spawn(server.run());

    let base_url = format!("http://{}:{}/api", host, port);
    Ok(TestApp {
        client: TestClient::new(base_url.clone()),
        address: format!("{}:{}", host, port),
        base_url,
    })
}

pub async fn run_app_test<F, R>(f: F)
where
    F: FnOnce(TestApp) -> R,
    R: Future<Output = Result<(), anyhow::Error>>,
{
    let app = start_app().await.expect("Starting app");
    f(app).await.unwrap();
}

impl TestApp {
    /// Register a user through the API and return a client that acts as them.
    pub async fn add_user(&self, name: &str) -> Result<TestUser> {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        let response = self
            .client
            .post("users")
            .json(&json!({ "name": name, "email": email }))
            .send()
            .await?;

        if response.status().as_u16() != 201 {
            return Err(anyhow!("registering {name}: {}", response.status()));
        }

        let body: Value = response.json().await?;
        let user_id = body["user"]["id"]
            .as_str()
            .ok_or_else(|| anyhow!("no user id in {body}"))?
            .to_string();
        let api_key = body["api_key"]
            .as_str()
            .ok_or_else(|| anyhow!("no api key in {body}"))?
            .to_string();

        Ok(TestUser {
            user_id,
            email,
            client: self.client.clone_with_api_key(api_key.clone()),
            api_key,
        })
    }
}

impl TestUser {
    /// Create an idea or project and return its id.
    pub async fn create(&self, kind: &str, title: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{kind}s"))
            .json(&json!({ "title": title, "description": "" }))
            .send()
            .await?;
        if response.status().as_u16() != 201 {
            return Err(anyhow!("creating {kind}: {}", response.status()));
        }

        let body: Value = response.json().await?;
        Ok(body["id"]
            .as_str()
            .ok_or_else(|| anyhow!("no id in {body}"))?
            .to_string())
    }

    pub async fn add_member(&self, resource: &str, user: &TestUser, role: &str) -> Result<u16> {
        let response = self
            .client
            .post(format!("resources/{resource}/members"))
            .json(&json!({ "user_id": user.user_id, "role": role }))
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}

/// The `error.kind` field of an error response.
pub async fn error_kind(response: reqwest::Response) -> Result<String> {
    let body: Value = response.json().await?;
    Ok(body["error"]["kind"].as_str().unwrap_or_default().to_string())
}
