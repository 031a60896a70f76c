use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::third_party::SmsSender;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_STEP_MS: u64 = 1000;

#[derive(Debug, Serialize)]
struct OtpRequest<'a> {
    route: &'a str,
    variables_values: &'a str,
    numbers: &'a str,
}

#[derive(Debug, Deserialize)]
struct OtpResponse {
    #[serde(rename = "return")]
    accepted: bool,
    #[serde(default)]
    message: serde_json::Value,
}

#[derive(Clone)]
pub struct Fast2SmsService {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

/// Normalises to a 10 digit Indian mobile number.
///
/// Strips everything but digits, then drops a `91` country prefix (12 digits)
/// or a trunk `0` (11 digits). The result must start with 6-9.
pub fn clean_indian_phone(phone: &str) -> Result<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = match digits.len() {
        12 if digits.starts_with("91") => &digits[2..],
        11 if digits.starts_with('0') => &digits[1..],
        _ => digits.as_str(),
    };

    let valid = local.len() == 10 && matches!(local.chars().next(), Some('6'..='9'));
    if !valid {
        return Err(anyhow::anyhow!("'{}' is not a valid Indian mobile number", phone));
    }
    Ok(local.to_string())
}

enum Attempt {
    Done,
    Retry(anyhow::Error),
    Fail(anyhow::Error),
}

impl Fast2SmsService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            api_url,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    async fn attempt(&self, numbers: &str, otp: &str) -> Attempt {
        let body = OtpRequest {
            route: "otp",
            variables_values: otp,
            numbers,
        };

        let response = match self
            .client
            .post(&self.api_url)
            .header("authorization", &self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(e.into()),
        };

        let status = response.status();
        if status.is_server_error() {
            return Attempt::Retry(anyhow::anyhow!("Fast2SMS answered {}", status));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Attempt::Fail(anyhow::anyhow!("Fast2SMS rejected the request ({}): {}", status, text));
        }

        match response.json::<OtpResponse>().await {
            Ok(parsed) if parsed.accepted => Attempt::Done,
            Ok(parsed) => Attempt::Fail(anyhow::anyhow!("Fast2SMS refused the OTP: {}", parsed.message)),
            Err(e) => Attempt::Retry(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl SmsSender for Fast2SmsService {
    async fn send_otp(&self, phone_number: &str, otp: &str) -> Result<()> {
        let numbers = clean_indian_phone(phone_number)?;

        let mut attempt_no = 1;
        loop {
            match self.attempt(&numbers, otp).await {
                Attempt::Done => {
                    log::info!("OTP sent to ******{}", &numbers[numbers.len() - 4..]);
                    return Ok(());
                }
                Attempt::Fail(e) => return Err(e),
                Attempt::Retry(e) if attempt_no >= MAX_ATTEMPTS => {
                    log::error!("Giving up on OTP delivery after {} attempts: {}", attempt_no, e);
                    return Err(e);
                }
                Attempt::Retry(e) => {
                    log::warn!("OTP delivery attempt {} failed: {}", attempt_no, e);
                    tokio::time::sleep(Duration::from_millis(BACKOFF_STEP_MS * attempt_no as u64)).await;
                    attempt_no += 1;
                }
            }
        }
    }
}
