//! Prepares a fresh, fully indexed database for each integration test.

use anyhow::{Context, Result};
use arangors::client::reqwest::ReqwestClient;
use arangors::{Connection, Database};
use serde_json::json;

use super::{TestEnvironment, ARANGO_PASSWORD, ARANGO_USER};

/// Same collections and indexes the migrations create
const COLLECTIONS: &[&str] = &["user", "tournament", "tournament_registration"];

fn indexes() -> Vec<(&'static str, serde_json::Value)> {
    vec![
        ("user", json!({ "type": "persistent", "fields": ["email"], "unique": true })),
        ("user", json!({ "type": "persistent", "fields": ["googleId"], "unique": true, "sparse": true })),
        (
            "tournament_registration",
            json!({ "type": "persistent", "fields": ["userId", "tournamentId"], "unique": true }),
        ),
        (
            "tournament_registration",
            json!({ "type": "persistent", "fields": ["tournamentId", "status"] }),
        ),
    ]
}

async fn connect(env: &TestEnvironment) -> Result<Connection> {
    let mut last_error = None;
    for attempt in 0..5u64 {
        match Connection::establish_basic_auth(env.arangodb_url(), ARANGO_USER, ARANGO_PASSWORD).await {
            Ok(conn) => return Ok(conn),
            Err(e) => {
                log::warn!("Failed to connect to ArangoDB (attempt {}): {}", attempt + 1, e);
                last_error = Some(e);
                tokio::time::sleep(tokio::time::Duration::from_millis(500 * (attempt + 1))).await;
            }
        }
    }
    Err(anyhow::anyhow!("Failed to connect to ArangoDB after retries: {:?}", last_error))
}

/// Creates a uniquely named database with the platform's collections and
/// unique indexes, so tests never share state.
pub async fn fresh_database(env: &TestEnvironment) -> Result<Database<ReqwestClient>> {
    env.wait_for_ready().await?;
    let conn = connect(env).await?;

    let name = format!("arena_test_{}", uuid::Uuid::new_v4().simple());
    let db = conn
        .create_database(&name)
        .await
        .with_context(|| format!("Failed to create database {}", name))?;

    for collection in COLLECTIONS {
        db.create_collection(collection)
            .await
            .with_context(|| format!("Failed to create collection {}", collection))?;
    }

    let http = reqwest::Client::new();
    for (collection, body) in indexes() {
        let url = format!("{}/_db/{}/_api/index?collection={}", env.arangodb_url(), name, collection);
        let resp = http
            .post(&url)
            .basic_auth(ARANGO_USER, Some(ARANGO_PASSWORD))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to create index on {}", collection))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Index on {} failed: {} - {}", collection, status, text));
        }
    }

    log::info!("Prepared test database {}", name);
    Ok(db)
}

pub fn redis_client(env: &TestEnvironment) -> Result<redis::Client> {
    redis::Client::open(env.redis_url()).context("Failed to create Redis client")
}
