// src/clients/compute.rs
use super::rest::RestClient;
use super::types::{Keypair, Server, ServerCreate};
use super::ComputeApi;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

/// Compute API client (servers and keypairs).
#[derive(Debug, Clone)]
pub struct ComputeClient {
    rest: RestClient,
}

#[derive(Serialize)]
struct KeypairCreate<'a> {
    name: &'a str,
}

impl ComputeClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl ComputeApi for ComputeClient {
    async fn create_keypair(&self, name: &str) -> Result<Keypair> {
        let keypair: Keypair = self
            .rest
            .post("os-keypairs", "keypair", &KeypairCreate { name })
            .await?;
        info!("Created keypair {}", keypair.name);
        Ok(keypair)
    }

    async fn delete_keypair(&self, name: &str) -> Result<()> {
        self.rest.delete(&format!("os-keypairs/{}", name)).await
    }

    async fn create_server(&self, request: &ServerCreate) -> Result<Server> {
        let server: Server = self.rest.post("servers", "server", request).await?;
        info!("Created server {} ({})", request.name, server.id);
        Ok(server)
    }

    async fn get_server(&self, id: &str) -> Result<Server> {
        self.rest.get(&format!("servers/{}", id), "server").await
    }

    async fn delete_server(&self, id: &str) -> Result<()> {
        self.rest.delete(&format!("servers/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::types::{NetworkRef, SecurityGroupRef};
    use crate::clients::types::ResourceStatus;
    use mockito::Matcher;
    use url::Url;

    fn client(server: &mockito::Server) -> ComputeClient {
        let base = Url::parse(&format!("{}/v2/t-1", server.url())).unwrap();
        ComputeClient::new(RestClient::new(reqwest::Client::new(), base, "tok"))
    }

    #[tokio::test]
    async fn test_create_server_sends_boot_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/t-1/servers")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "server": {
                    "name": "smoke_server-1",
                    "imageRef": "img",
                    "flavorRef": "1",
                    "key_name": "kp",
                    "security_groups": [{"name": "sg"}],
                    "networks": [{"uuid": "net-1"}]
                }
            })))
            .with_status(202)
            .with_header("content-type", "application/json")
            .with_body(r#"{"server": {"id": "srv-1"}}"#)
            .create_async()
            .await;

        let created = client(&server)
            .create_server(&ServerCreate {
                name: "smoke_server-1".to_string(),
                image_ref: "img".to_string(),
                flavor_ref: "1".to_string(),
                key_name: "kp".to_string(),
                security_groups: vec![SecurityGroupRef { name: "sg".to_string() }],
                networks: vec![NetworkRef { uuid: "net-1".to_string() }],
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, "srv-1");
        assert!(created.addresses.is_empty());
    }

    #[tokio::test]
    async fn test_get_server() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/t-1/servers/srv-1")
            .match_header("x-auth-token", "tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"server": {"id": "srv-1", "name": "s", "status": "ACTIVE",
                    "addresses": {"private": [{"addr": "10.0.0.5", "version": 4}]}}}"#,
            )
            .create_async()
            .await;

        let fetched = client(&server).get_server("srv-1").await.unwrap();
        assert_eq!(fetched.status, ResourceStatus::Active);
        assert_eq!(fetched.address_on("private"), Some("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_keypair_lifecycle() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/t-1/os-keypairs")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"keypair": {"name": "kp", "public_key": "ssh-rsa AAA", "private_key": "-----BEGIN"}}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/v2/t-1/os-keypairs/kp")
            .with_status(202)
            .create_async()
            .await;

        let client = client(&server);
        let keypair = client.create_keypair("kp").await.unwrap();
        assert_eq!(keypair.private_key.as_deref(), Some("-----BEGIN"));

        client.delete_keypair("kp").await.unwrap();
        delete.assert_async().await;
    }
}
