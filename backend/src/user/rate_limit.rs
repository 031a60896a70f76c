use async_trait::async_trait;

pub const LOGIN_MAX_ATTEMPTS: i64 = 10;
pub const LOGIN_WINDOW_SECS: i64 = 300;

#[async_trait]
pub trait LoginRateLimiter: Send + Sync {
    /// Counts one attempt against `key`; false once the window's budget is spent
    async fn allow(&self, key: &str) -> bool;
}

pub fn login_key(ip: &str, email: &str) -> String {
    format!("login:{}:{}", ip, email.trim().to_lowercase())
}

/// Fixed window counter in Redis. Fails open when Redis is unreachable.
#[derive(Clone)]
pub struct RedisLoginRateLimiter {
    pub client: redis::Client,
}

impl RedisLoginRateLimiter {
    async fn count_attempt(&self, key: &str) -> Result<i64, redis::RedisError> {
        let mut conn = self.client.get_async_connection().await?;
        let count: i64 = redis::cmd("INCR").arg(key).query_async(&mut conn).await?;
        let ttl: i64 = redis::cmd("TTL").arg(key).query_async(&mut conn).await?;
        if ttl < 0 {
            let _: () = redis::cmd("EXPIRE")
                .arg(key)
                .arg(LOGIN_WINDOW_SECS)
                .query_async(&mut conn)
                .await?;
        }
        Ok(count)
    }
}

#[async_trait]
impl LoginRateLimiter for RedisLoginRateLimiter {
    async fn allow(&self, key: &str) -> bool {
        match self.count_attempt(key).await {
            Ok(count) => count <= LOGIN_MAX_ATTEMPTS,
            Err(e) => {
                log::warn!("Login rate limiter unavailable: {}", e);
                true
            }
        }
    }
}
