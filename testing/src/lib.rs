//! Integration testing infrastructure using testcontainers-rs
//!
//! Starts ephemeral ArangoDB and Redis containers for the duration of a
//! test. Containers stop and are removed when the [`TestEnvironment`] is
//! dropped.

use anyhow::{Context, Result};
use std::time::Duration;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, GenericImage, ImageExt};

pub const ARANGO_USER: &str = "root";
pub const ARANGO_PASSWORD: &str = "test_password";

/// Either containers owned by the test, or services the caller already runs
enum Services {
    Containers {
        _arangodb: ContainerAsync<GenericImage>,
        _redis: ContainerAsync<GenericImage>,
    },
    External,
}

pub struct TestEnvironment {
    arangodb_url: String,
    redis_url: String,
    _services: Services,
}

impl TestEnvironment {
    /// Starts ArangoDB 3.12 and Redis 7 containers.
    ///
    /// With `USE_TESTCONTAINERS=false` the environment points at `ARANGO_URL`
    /// and `REDIS_URL` instead (useful in CI with service containers).
    pub async fn new() -> Result<Self> {
        let use_testcontainers = std::env::var("USE_TESTCONTAINERS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        if !use_testcontainers {
            return Ok(Self::from_env_vars());
        }

        let arangodb = GenericImage::new("arangodb", "3.12.5")
            .with_env_var("ARANGO_ROOT_PASSWORD", ARANGO_PASSWORD)
            .start()
            .await
            .context("Failed to start ArangoDB container")?;
        let arangodb_port = arangodb
            .get_host_port_ipv4(8529.tcp())
            .await
            .context("Failed to get ArangoDB container port")?;

        let redis = GenericImage::new("redis", "7-alpine")
            .start()
            .await
            .context("Failed to start Redis container")?;
        let redis_port = redis
            .get_host_port_ipv4(6379.tcp())
            .await
            .context("Failed to get Redis container port")?;

        let env = Self {
            arangodb_url: format!("http://localhost:{}", arangodb_port),
            redis_url: format!("redis://localhost:{}/", redis_port),
            _services: Services::Containers {
                _arangodb: arangodb,
                _redis: redis,
            },
        };
        log::info!("Started ArangoDB at {} and Redis at {}", env.arangodb_url, env.redis_url);
        Ok(env)
    }

    fn from_env_vars() -> Self {
        let arangodb_url = std::env::var("ARANGO_URL").unwrap_or_else(|_| "http://localhost:8529".to_string());
        let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379/".to_string());
        log::info!("Using external services: ArangoDB {}, Redis {}", arangodb_url, redis_url);
        Self {
            arangodb_url,
            redis_url,
            _services: Services::External,
        }
    }

    pub fn arangodb_url(&self) -> &str {
        &self.arangodb_url
    }

    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    /// Polls the ArangoDB version endpoint until the server answers
    pub async fn wait_for_ready(&self) -> Result<()> {
        let http = reqwest::Client::new();
        let url = format!("{}/_api/version", self.arangodb_url);
        for attempt in 1..=30 {
            match http
                .get(&url)
                .basic_auth(ARANGO_USER, Some(ARANGO_PASSWORD))
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                Ok(resp) => log::debug!("ArangoDB not ready (attempt {}): {}", attempt, resp.status()),
                Err(e) => log::debug!("ArangoDB not ready (attempt {}): {}", attempt, e),
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        Err(anyhow::anyhow!("ArangoDB at {} did not become ready", self.arangodb_url))
    }
}

pub mod app_setup;
