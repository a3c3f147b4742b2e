#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{redirect, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;

use blog_api::config::AppConfig;
use blog_api::AppState;

/// An in-process server on an ephemeral port, backed by its own in-memory database
pub struct TestServer {
    pub base_url: String,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let state = AppState::connect(AppConfig::for_tests())
            .await
            .context("failed to open test database")?;
        let app = blog_api::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url: format!("http://{}", addr) })
    }

    /// A fresh browser-like client: own cookie jar, redirects not followed
    pub fn client(&self) -> Result<TestClient> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(TestClient {
            client,
            jar,
            base_url: Url::parse(&self.base_url)?,
        })
    }

    /// A client that has signed up and signed in as `username`
    pub async fn signed_in(&self, username: &str, password: &str) -> Result<TestClient> {
        let client = self.client()?;
        client.fetch_token().await?;

        let res = client.signup(username, password).await?;
        assert_eq!(res.status(), StatusCode::CREATED, "signup of {} failed", username);

        let res = client.signin(username, password).await?;
        assert_eq!(res.status(), StatusCode::NO_CONTENT, "signin of {} failed", username);
        Ok(client)
    }
}

pub struct TestClient {
    pub client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
}

impl TestClient {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Current value of a cookie in the jar
    pub fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?.to_string();
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }

    /// GET /api/token, leaving the anti-forgery cookie in the jar
    pub async fn fetch_token(&self) -> Result<String> {
        let res = self.client.get(self.url("/api/token")).send().await?;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        self.cookie("csrftoken").context("no csrftoken cookie after GET /api/token")
    }

    /// Echo the jar's anti-forgery token in the request header
    fn guarded(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.cookie("csrftoken") {
            Some(token) => builder.header("X-CSRFToken", token),
            None => builder,
        }
    }

    /// Any method, with the anti-forgery header attached when the jar has a token
    pub async fn send(&self, method: Method, path: &str) -> Result<Response> {
        Ok(self.guarded(self.client.request(method, self.url(path))).send().await?)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.guarded(self.client.post(self.url(path))).json(body).send().await?)
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.guarded(self.client.put(self.url(path))).json(body).send().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self.guarded(self.client.delete(self.url(path))).send().await?)
    }

    pub async fn signup(&self, username: &str, password: &str) -> Result<Response> {
        self.post("/api/signup", &serde_json::json!({ "username": username, "password": password }))
            .await
    }

    pub async fn signin(&self, username: &str, password: &str) -> Result<Response> {
        self.post("/api/signin", &serde_json::json!({ "username": username, "password": password }))
            .await
    }
}

/// Body of an error response
pub async fn error_message(res: Response) -> Result<String> {
    let body = res.json::<Value>().await?;
    body["error"]
        .as_str()
        .map(str::to_string)
        .context("response has no error field")
}
