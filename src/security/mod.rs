pub mod turnstile;

pub use turnstile::Turnstile;

/// Challenge-response verification of a public form submission.
///
/// Implementations must treat every failure (missing token, bad
/// configuration, network error, timeout) as "not verified".
pub trait BotCheck: Send + Sync {
    fn verify(&self, token: &str, remote_ip: Option<&str>) -> bool;
}
