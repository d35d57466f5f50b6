use serde_json::Value;
use std::time::Duration;

use super::BotCheck;

const VERIFY_URL: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";
const TIMEOUT: Duration = Duration::from_secs(5);

/// Cloudflare Turnstile verifier.
/// https://developers.cloudflare.com/turnstile/get-started/server-side-validation/
pub struct Turnstile {
    secret_key: String,
}

impl Turnstile {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Turnstile {
            secret_key: secret_key.into(),
        }
    }

    fn siteverify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, String> {
        let mut params = vec![("secret", self.secret_key.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            params.push(("remoteip", ip));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;

        let resp = client
            .post(VERIFY_URL)
            .form(&params)
            .send()
            .map_err(|e| format!("Turnstile request failed: {}", e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(format!("Turnstile returned {}: {}", status, text));
        }

        let json: Value = resp
            .json()
            .map_err(|e| format!("Turnstile JSON parse error: {}", e))?;

        let success = json.get("success").and_then(|v| v.as_bool()).unwrap_or(false);

        if !success {
            let errors = json
                .get("error-codes")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            log::warn!("Turnstile verification failed: {}", errors);
        }

        Ok(success)
    }
}

impl BotCheck for Turnstile {
    fn verify(&self, token: &str, remote_ip: Option<&str>) -> bool {
        if token.is_empty() || self.secret_key.is_empty() {
            return false;
        }

        match self.siteverify(token, remote_ip) {
            Ok(success) => success,
            Err(e) => {
                log::warn!("Turnstile error (rejecting): {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_fails_without_network() {
        assert!(!Turnstile::new("secret").verify("", None));
    }

    #[test]
    fn empty_secret_fails_without_network() {
        assert!(!Turnstile::new("").verify("token", Some("127.0.0.1")));
    }
}
