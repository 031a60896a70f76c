use async_trait::async_trait;
use rand::Rng;

/// Codes expire ten minutes after they are issued
pub const OTP_TTL_SECS: u64 = 600;

#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Upserts the code for `phone_number`, restarting its expiry
    async fn put(&self, phone_number: &str, code: &str) -> Result<(), String>;
    async fn get(&self, phone_number: &str) -> Result<Option<String>, String>;
    async fn remove(&self, phone_number: &str) -> Result<(), String>;
}

pub fn otp_key(phone_number: &str) -> String {
    format!("otp:{}", phone_number)
}

/// Six digit numeric code
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

#[derive(Clone)]
pub struct RedisOtpStore {
    pub client: redis::Client,
}

#[async_trait]
impl OtpStore for RedisOtpStore {
    async fn put(&self, phone_number: &str, code: &str) -> Result<(), String> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| e.to_string())?;
        redis::cmd("SETEX")
            .arg(otp_key(phone_number))
            .arg(OTP_TTL_SECS)
            .arg(code)
            .query_async(&mut conn)
            .await
            .map_err(|e| e.to_string())
    }

    async fn get(&self, phone_number: &str) -> Result<Option<String>, String> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| e.to_string())?;
        redis::cmd("GET")
            .arg(otp_key(phone_number))
            .query_async(&mut conn)
            .await
            .map_err(|e| e.to_string())
    }

    async fn remove(&self, phone_number: &str) -> Result<(), String> {
        let mut conn = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| e.to_string())?;
        redis::cmd("DEL")
            .arg(otp_key(phone_number))
            .query_async(&mut conn)
            .await
            .map_err(|e| e.to_string())
    }
}
