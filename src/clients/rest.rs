// src/clients/rest.rs
use crate::error::{Result, ScenarioError};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Token-authenticated JSON client rooted at one service endpoint.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base: Url,
    token: String,
}

impl RestClient {
    pub fn new(http: Client, base: Url, token: impl Into<String>) -> Self {
        Self {
            http,
            base: with_trailing_slash(base),
            token: token.into(),
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTH_HEADER, &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// GET `path` and take the value stored under `key`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T> {
        self.get_query(path, &[], key).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        key: &str,
    ) -> Result<T> {
        let url = self.url(path)?;
        let response = self.request(Method::GET, url.clone()).query(query).send().await?;
        let value: Value = check(Method::GET, &url, response).await?.json().await?;
        take_key(value, key)
    }

    /// POST `{key: body}` and take the value stored under `key` in the reply.
    pub async fn post<B, T>(&self, path: &str, key: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_wrapped(Method::POST, path, key, body).await
    }

    /// POST without reading a reply body.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, key: &str, body: &B) -> Result<()> {
        let url = self.url(path)?;
        let response = self
            .request(Method::POST, url.clone())
            .json(&wrap(key, body)?)
            .send()
            .await?;
        check(Method::POST, &url, response).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let response = self.request(Method::DELETE, url.clone()).send().await?;
        check(Method::DELETE, &url, response).await?;
        debug!("Deleted {}", url);
        Ok(())
    }

    async fn send_wrapped<B, T>(&self, method: Method, path: &str, key: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self
            .request(method.clone(), url.clone())
            .json(&wrap(key, body)?)
            .send()
            .await?;
        let value: Value = check(method, &url, response).await?.json().await?;
        take_key(value, key)
    }
}

pub fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn wrap<B: Serialize + ?Sized>(key: &str, body: &B) -> Result<Value> {
    let mut envelope = serde_json::Map::new();
    envelope.insert(key.to_string(), serde_json::to_value(body)?);
    Ok(Value::Object(envelope))
}

fn take_key<T: DeserializeOwned>(mut value: Value, key: &str) -> Result<T> {
    let inner = value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ScenarioError::missing(key))?;
    Ok(serde_json::from_value(inner)?)
}

async fn check(method: Method, url: &Url, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ScenarioError::Api {
        method: method.to_string(),
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}
