use anyhow::{anyhow, Context, Result};
use clap::Parser;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

const MIGRATIONS_COLLECTION: &str = "schema_migrations";
const LOCK_COLLECTION: &str = "migration_lock";

/// Collections the API server expects once every migration has run
const REQUIRED_COLLECTIONS: &[&str] = &["user", "tournament", "tournament_registration"];

/// (collection, fields) of the unique indexes registration and signup rely on
const REQUIRED_UNIQUE_INDEXES: &[(&str, &[&str])] = &[
    ("user", &["email"]),
    ("tournament_registration", &["userId", "tournamentId"]),
];

#[derive(Parser, Debug)]
#[command(name = "arena-migrations")]
#[command(about = "Apply ArangoDB migrations (collections, indexes, AQL) for the tournament platform")]
struct Args {
    /// Base endpoint, e.g. http://127.0.0.1:8529
    #[arg(long, env = "ARANGO_URL")]
    endpoint: String,
    #[arg(long, env = "ARANGO_DB")]
    database: String,
    #[arg(long, env = "ARANGO_USERNAME")]
    username: String,
    #[arg(long, env = "ARANGO_PASSWORD")]
    password: String,
    /// Directory containing ordered migration files
    #[arg(long, env = "MIGRATIONS_DIR", default_value = "migrations/db")]
    migrations_dir: PathBuf,
    /// Print what would be done without changing the database
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Clone)]
struct Arango {
    base: Url,
    db: String,
    jwt: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct IndexInfo {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    unique: bool,
}

impl Arango {
    async fn authenticate(endpoint: &str, db: &str, username: &str, password: &str) -> Result<Self> {
        let base = Url::parse(endpoint).context("Invalid endpoint URL")?;
        let http = reqwest::Client::builder().build()?;
        #[derive(Deserialize)]
        struct AuthResp {
            jwt: String,
        }
        let resp = http
            .post(base.join("/_open/auth")?)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Auth failed: {} - {}", status, txt));
        }
        let AuthResp { jwt } = resp.json().await?;
        Ok(Self {
            base,
            db: db.to_string(),
            jwt,
            http,
        })
    }

    fn db_url(&self, path: &str) -> Url {
        let mut u = self.base.clone();
        u.set_path(&format!("/_db/{}/{}", self.db, path.trim_start_matches('/')));
        u
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.jwt)
    }

    async fn collection_exists(&self, name: &str) -> Result<bool> {
        let resp = self
            .auth(self.http.get(self.db_url(&format!("/_api/collection/{name}"))))
            .send()
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(anyhow!("Checking collection {} failed: {}", name, s)),
        }
    }

    async fn create_collection(
        &self,
        name: &str,
        kind: Option<&str>,
        options: Option<&serde_json::Value>,
        dry: bool,
    ) -> Result<()> {
        if self.collection_exists(name).await? {
            println!("Collection {} already exists", name);
            return Ok(());
        }
        let body = collection_body(name, kind, options);
        if dry {
            println!("[dry-run] create collection {}", body);
            return Ok(());
        }

        let resp = self
            .auth(self.http.post(self.db_url("/_api/collection")))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Create collection {} failed: {} - {}", name, status, txt));
        }
        println!("Created collection {}", name);
        Ok(())
    }

    async fn ensure_index(&self, collection: &str, index_body: &serde_json::Value, dry: bool) -> Result<()> {
        if dry {
            println!("[dry-run] ensure index on {} -> {}", collection, index_body);
            return Ok(());
        }

        let mut url = self.db_url("/_api/index");
        url.query_pairs_mut().append_pair("collection", collection);
        // An identical existing index is returned as-is; an incompatible one is an error
        let resp = self.auth(self.http.post(url)).json(index_body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Ensure index on {} failed: {} - {}", collection, status, txt));
        }
        println!("Index ready on {}: {}", collection, index_body);
        Ok(())
    }

    async fn indexes(&self, collection: &str) -> Result<Vec<IndexInfo>> {
        #[derive(Deserialize)]
        struct IndexList {
            indexes: Vec<IndexInfo>,
        }
        let mut url = self.db_url("/_api/index");
        url.query_pairs_mut().append_pair("collection", collection);
        let resp = self.auth(self.http.get(url)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("Listing indexes of {} failed: {}", collection, status));
        }
        let IndexList { indexes } = resp.json().await?;
        Ok(indexes)
    }

    async fn run_aql<T: for<'de> Deserialize<'de>>(
        &self,
        query: &str,
        bind_vars: Option<&serde_json::Value>,
    ) -> Result<T> {
        let body = json!({
            "query": query,
            "bindVars": bind_vars.cloned().unwrap_or_else(|| json!({}))
        });
        let resp = self
            .auth(self.http.post(self.db_url("/_api/cursor")))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("AQL failed: {} - {}", status, txt));
        }
        let v: serde_json::Value = resp.json().await?;
        let result = v.get("result").cloned().unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(result)?)
    }

    async fn insert_doc(&self, collection: &str, doc: &serde_json::Value, dry: bool) -> Result<()> {
        if dry {
            println!("[dry-run] insert into {} -> {}", collection, doc);
            return Ok(());
        }
        let resp = self
            .auth(self.http.post(self.db_url(&format!("/_api/document/{collection}"))))
            .json(doc)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Insert into {} failed: {} - {}", collection, status, txt));
        }
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, key: &str) -> Result<()> {
        let resp = self
            .auth(self.http.delete(self.db_url(&format!("/_api/document/{collection}/{key}"))))
            .send()
            .await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND || status.is_success() {
            return Ok(());
        }
        let txt = resp.text().await.unwrap_or_default();
        Err(anyhow!("Delete {}/{} failed: {} - {}", collection, key, status, txt))
    }
}

fn collection_body(name: &str, kind: Option<&str>, options: Option<&serde_json::Value>) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("name".into(), json!(name));
    // 3 = edge, 2 = document
    let ctype = if kind == Some("edge") { 3 } else { 2 };
    body.insert("type".into(), json!(ctype));
    if let Some(map) = options.and_then(|o| o.as_object()) {
        for (k, v) in map {
            body.insert(k.clone(), v.clone());
        }
    }
    serde_json::Value::Object(body)
}

fn now_rfc3339() -> String {
    let dt: time::OffsetDateTime = std::time::SystemTime::now().into();
    dt.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into())
}

async fn ensure_meta(client: &Arango, dry: bool) -> Result<()> {
    client.create_collection(MIGRATIONS_COLLECTION, None, None, dry).await?;
    client.create_collection(LOCK_COLLECTION, None, None, dry).await
}

async fn acquire_lock(client: &Arango, dry: bool) -> Result<()> {
    if dry {
        println!("[dry-run] acquire lock");
        return Ok(());
    }
    client
        .insert_doc(LOCK_COLLECTION, &json!({ "_key": "lock", "acquiredAt": now_rfc3339() }), false)
        .await
        .map_err(|e| anyhow!("Lock already held or failed: {}", e))
}

async fn release_lock(client: &Arango, dry: bool) -> Result<()> {
    if dry {
        return Ok(());
    }
    client.delete_doc(LOCK_COLLECTION, "lock").await
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Step {
    CreateCollection {
        name: String,
        /// "document" (default) or "edge"
        #[serde(default)]
        collection_type: Option<String>,
        #[serde(default)]
        options: Option<serde_json::Value>,
    },
    EnsureIndex {
        collection: String,
        /// Passed through as the ArangoDB index body
        index: serde_json::Value,
    },
    Aql {
        query: String,
        #[serde(default)]
        bind_vars: Option<serde_json::Value>,
    },
}

#[derive(Debug, Deserialize)]
struct MigrationFile {
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct AppliedMigration {
    #[serde(rename = "_key")]
    key: String,
    #[serde(default)]
    checksum: String,
}

fn checksum(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

fn list_migration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("read migrations dir {:?}", dir))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| matches!(p.extension().and_then(|s| s.to_str()), Some("json") | Some("aql")))
        .collect();
    // Numeric filename prefixes give the order
    entries.sort();
    Ok(entries)
}

async fn applied_migrations(client: &Arango) -> Result<HashMap<String, String>> {
    if !client.collection_exists(MIGRATIONS_COLLECTION).await? {
        return Ok(HashMap::new());
    }
    let query = format!("FOR m IN {} RETURN {{ _key: m._key, checksum: m.checksum }}", MIGRATIONS_COLLECTION);
    let rows: Vec<AppliedMigration> = client.run_aql(&query, None).await?;
    Ok(rows.into_iter().map(|m| (m.key, m.checksum)).collect())
}

async fn record_applied(client: &Arango, key: &str, checksum: &str, duration_ms: i64, dry: bool) -> Result<()> {
    let doc = json!({
        "_key": key,
        "appliedAt": now_rfc3339(),
        "checksum": checksum,
        "durationMs": duration_ms
    });
    client.insert_doc(MIGRATIONS_COLLECTION, &doc, dry).await
}

async fn apply_steps(client: &Arango, steps: &[Step], dry: bool) -> Result<()> {
    for step in steps {
        match step {
            Step::CreateCollection {
                name,
                collection_type,
                options,
            } => {
                client
                    .create_collection(name, collection_type.as_deref(), options.as_ref(), dry)
                    .await?;
            }
            Step::EnsureIndex { collection, index } => {
                client.ensure_index(collection, index, dry).await?;
            }
            Step::Aql { query, bind_vars } => {
                if dry {
                    println!("[dry-run] AQL: {}", query);
                } else {
                    let _: Vec<serde_json::Value> = client.run_aql(query, bind_vars.as_ref()).await?;
                }
            }
        }
    }
    Ok(())
}

async fn apply_pending(client: &Arango, dir: &Path, dry: bool) -> Result<usize> {
    let applied = applied_migrations(client).await?;
    let mut count = 0;

    for path in list_migration_files(dir)? {
        let fname = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Migration path {:?} has no usable file name", path))?
            .to_string();
        let content = fs::read(&path).with_context(|| format!("read {:?}", path))?;
        let sum = checksum(&content);

        if let Some(recorded) = applied.get(&fname) {
            if !recorded.is_empty() && *recorded != sum {
                println!("WARNING: {} changed after it was applied (checksum mismatch)", fname);
            }
            continue;
        }

        let start = Instant::now();
        match path.extension().and_then(|s| s.to_str()).unwrap_or_default() {
            "json" => {
                let mig: MigrationFile = serde_json::from_slice(&content)
                    .with_context(|| format!("parse JSON migration {}", fname))?;
                apply_steps(client, &mig.steps, dry)
                    .await
                    .with_context(|| format!("apply {}", fname))?;
            }
            "aql" => {
                let query = String::from_utf8(content)?;
                if dry {
                    println!("[dry-run] run AQL from {}", fname);
                } else {
                    let _: Vec<serde_json::Value> = client
                        .run_aql(&query, None)
                        .await
                        .with_context(|| format!("AQL {}", fname))?;
                }
            }
            other => return Err(anyhow!("Unsupported migration file extension: {} ({})", other, fname)),
        }

        record_applied(client, &fname, &sum, start.elapsed().as_millis() as i64, dry).await?;
        println!("Applied {}", fname);
        count += 1;
    }
    Ok(count)
}

fn has_unique_index(indexes: &[IndexInfo], fields: &[&str]) -> bool {
    indexes
        .iter()
        .any(|i| i.unique && i.kind != "primary" && i.fields.iter().map(String::as_str).eq(fields.iter().copied()))
}

/// Fails unless the collections and unique indexes the server relies on exist
async fn verify_schema(client: &Arango) -> Result<()> {
    for name in REQUIRED_COLLECTIONS {
        if !client.collection_exists(name).await? {
            return Err(anyhow!("Required collection '{}' is missing after migrations", name));
        }
    }
    for (collection, fields) in REQUIRED_UNIQUE_INDEXES {
        let indexes = client.indexes(collection).await?;
        if !has_unique_index(&indexes, fields) {
            return Err(anyhow!("Unique index on {}{:?} is missing after migrations", collection, fields));
        }
    }
    println!("Schema verified");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let client = Arango::authenticate(&args.endpoint, &args.database, &args.username, &args.password).await?;

    ensure_meta(&client, args.dry_run).await?;
    acquire_lock(&client, args.dry_run).await?;

    let outcome = apply_pending(&client, &args.migrations_dir, args.dry_run).await;
    release_lock(&client, args.dry_run).await?;
    let count = outcome?;

    if !args.dry_run {
        verify_schema(&client).await?;
    }
    println!("Migrations complete ({} applied).", count);
    Ok(())
}
