use revassign_server::{ServerConfig, run_server_with_handle};
use serde::Serialize;

pub struct TestServer {
    port: u16,
    http_url: String,
    client: reqwest::Client,
    handle: actix_web::dev::ServerHandle,
}

impl TestServer {
    /// # Errors
    ///
    /// Returns an error if the server fails to start or no ports are available
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(ServerConfig::new("127.0.0.1".to_string(), 0)).await
    }

    /// # Errors
    ///
    /// Returns an error if the server fails to start or no ports are available
    pub async fn start_with(config: ServerConfig) -> anyhow::Result<Self> {
        let response = run_server_with_handle(&config.with_port(0))?;
        let port = response
            .addrs
            .first()
            .expect("Expected at least one address")
            .port();
        let http_url = format!("http://127.0.0.1:{port}");

        wait_for_server_ready(&http_url).await?;

        Ok(Self {
            port,
            http_url,
            client: reqwest::Client::new(),
            handle: response.handle,
        })
    }

    #[must_use]
    pub fn http_url(&self) -> &str {
        &self.http_url
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// # Errors
    ///
    /// Returns an error if the request cannot be sent
    pub async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> anyhow::Result<(reqwest::StatusCode, serde_json::Value)> {
        let response = self
            .client
            .post(format!("{}{path}", self.http_url))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    /// # Errors
    ///
    /// Returns an error if the request cannot be sent
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> anyhow::Result<(reqwest::StatusCode, serde_json::Value)> {
        let response = self
            .client
            .get(format!("{}{path}", self.http_url))
            .query(query)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let handle = self.handle.clone();
        tokio::spawn(async move {
            handle.stop(true).await;
        });
    }
}

async fn wait_for_server_ready(url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let health_url = format!("{url}/health");

    for _ in 0..30 {
        if let Ok(response) = client.get(&health_url).send().await
            && response.status().is_success()
        {
            return Ok(());
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    anyhow::bail!("Server failed to start within timeout")
}
