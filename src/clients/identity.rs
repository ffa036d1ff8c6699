// src/clients/identity.rs
use super::rest::with_trailing_slash;
use crate::config::IdentityConfig;
use crate::error::{Result, ScenarioError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Token and tenant the scenario acts as.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub tenant_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    tenant_name: &'a str,
    password_credentials: PasswordCredentials<'a>,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AccessReply {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: Token,
}

#[derive(Deserialize)]
struct Token {
    id: String,
    tenant: Option<Tenant>,
}

#[derive(Deserialize)]
struct Tenant {
    id: String,
}

/// Resolve credentials, issuing a Keystone v2 token unless one is configured.
pub async fn authenticate(http: &Client, identity: &IdentityConfig) -> Result<Credentials> {
    if let (Some(token), Some(tenant_id)) = (&identity.token, &identity.tenant_id) {
        return Ok(Credentials {
            token: token.clone(),
            tenant_id: tenant_id.clone(),
        });
    }

    let url = with_trailing_slash(identity.auth_url.clone()).join("tokens")?;
    let body = serde_json::json!({
        "auth": AuthRequest {
            tenant_name: &identity.tenant_name,
            password_credentials: PasswordCredentials {
                username: &identity.username,
                password: &identity.password,
            },
        }
    });

    let response = http.post(url.clone()).json(&body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScenarioError::Api {
            method: "POST".to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }

    let reply: AccessReply = response.json().await?;
    let tenant_id = reply
        .access
        .token
        .tenant
        .map(|t| t.id)
        .ok_or_else(|| ScenarioError::missing("access.token.tenant"))?;

    info!("Authenticated as {} in tenant {}", identity.username, tenant_id);
    Ok(Credentials {
        token: reply.access.token.id,
        tenant_id,
    })
}
