use actix_web::{get, web, HttpResponse, Responder};
use arangors::client::reqwest::ReqwestClient;
use arangors::Database;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::time::timeout;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ServiceHealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
}

impl ServiceHealthStatus {
    fn healthy(started: Instant) -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
            response_time_ms: Some(started.elapsed().as_millis() as u64),
        }
    }

    fn unhealthy(message: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message),
            response_time_ms: None,
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ServicesHealth {
    pub database: ServiceHealthStatus,
    pub redis: ServiceHealthStatus,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub version: &'static str,
    pub services: ServicesHealth,
}

impl DetailedHealthResponse {
    fn from_checks(database: ServiceHealthStatus, redis: ServiceHealthStatus) -> Self {
        let status = if database.is_healthy() && redis.is_healthy() { "ok" } else { "degraded" };
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
            version: env!("CARGO_PKG_VERSION"),
            services: ServicesHealth { database, redis },
        }
    }
}

async fn check_database(db: &Database<ReqwestClient>) -> ServiceHealthStatus {
    let started = Instant::now();
    match timeout(CHECK_TIMEOUT, db.info()).await {
        Ok(Ok(_)) => ServiceHealthStatus::healthy(started),
        Ok(Err(e)) => ServiceHealthStatus::unhealthy(format!("Database query failed: {}", e)),
        Err(_) => ServiceHealthStatus::unhealthy("Database connection timeout".to_string()),
    }
}

async fn check_redis(redis_client: &redis::Client) -> ServiceHealthStatus {
    let started = Instant::now();
    let ping = async {
        let mut conn = redis_client.get_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await
    };
    match timeout(CHECK_TIMEOUT, ping).await {
        Ok(Ok(_)) => ServiceHealthStatus::healthy(started),
        Ok(Err(e)) => ServiceHealthStatus::unhealthy(format!("Redis connection failed: {}", e)),
        Err(_) => ServiceHealthStatus::unhealthy("Redis connection timeout".to_string()),
    }
}

#[utoipa::path(
    get,
    path = "/health/detailed",
    tag = "health",
    responses(
        (status = 200, description = "Database and Redis reachable", body = DetailedHealthResponse),
        (status = 503, description = "A dependency is unreachable", body = DetailedHealthResponse)
    )
)]
#[get("/health/detailed")]
pub async fn detailed_health_check(
    db: web::Data<Database<ReqwestClient>>,
    redis_client: web::Data<redis::Client>,
) -> impl Responder {
    let (database, redis) = tokio::join!(check_database(db.get_ref()), check_redis(redis_client.get_ref()));
    let response = DetailedHealthResponse::from_checks(database, redis);

    if response.status == "ok" {
        HttpResponse::Ok().json(response)
    } else {
        log::warn!("Health check degraded");
        HttpResponse::ServiceUnavailable().json(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use pretty_assertions::assert_eq;

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn test_degraded_when_any_dependency_fails() {
        let ok = || ServiceHealthStatus::healthy(Instant::now());
        assert_eq!(DetailedHealthResponse::from_checks(ok(), ok()).status, "ok");

        let response = DetailedHealthResponse::from_checks(ok(), ServiceHealthStatus::unhealthy("down".to_string()));
        assert_eq!(response.status, "degraded");
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["services"]["redis"]["message"], "down");
    }

    #[actix_web::test]
    async fn test_redis_check_reports_unreachable_server() {
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let status = check_redis(&client).await;
        assert!(!status.is_healthy());
    }
}
