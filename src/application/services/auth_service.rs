//! Authorization of telemetry resets via the admin token.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Gate for destructive operator actions.
///
/// The configured token and every presented token are MACed with a key drawn
/// at startup, and the MACs are compared in constant time, so the comparison
/// leaks nothing about the token through timing.
pub struct AuthService {
    key: [u8; 32],
    expected_mac: Option<Vec<u8>>,
    allow_insecure: bool,
}

impl AuthService {
    /// Creates the gate.
    ///
    /// # Arguments
    ///
    /// - `admin_token` - secret that authorizes resets; `None` disables token auth
    /// - `allow_insecure` - operator opt-in that authorizes every reset
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the OS random source fails.
    pub fn new(admin_token: Option<&str>, allow_insecure: bool) -> Result<Self, AppError> {
        let mut key = [0u8; 32];
        getrandom::fill(&mut key)
            .map_err(|e| AppError::internal(format!("random source failed: {e}")))?;

        let expected_mac = match admin_token {
            Some(token) => Some(mac_for(&key, token)?.finalize().into_bytes().to_vec()),
            None => None,
        };

        Ok(Self {
            key,
            expected_mac,
            allow_insecure,
        })
    }

    /// Checks a presented `X-Admin-Token` value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] if:
    /// - no token is configured and the insecure opt-in is off
    /// - the token is missing or does not match
    pub fn authorize_reset(&self, presented: Option<&str>) -> Result<(), AppError> {
        if self.allow_insecure {
            tracing::warn!("Telemetry reset authorized by insecure opt-in");
            return Ok(());
        }

        let Some(expected) = self.expected_mac.as_deref() else {
            return Err(AppError::forbidden(
                "Telemetry reset is disabled",
                json!({ "hint": "configure ADMIN_TOKEN to enable resets" }),
            ));
        };

        let Some(presented) = presented else {
            return Err(AppError::forbidden(
                "Admin token required",
                json!({ "header": "X-Admin-Token" }),
            ));
        };

        mac_for(&self.key, presented)?
            .verify_slice(expected)
            .map_err(|_| {
                tracing::warn!("Telemetry reset rejected: invalid admin token");
                AppError::forbidden("Invalid admin token", json!({}))
            })
    }
}

fn mac_for(key: &[u8], token: &str) -> Result<HmacSha256, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::internal(format!("HMAC key rejected: {e}")))?;
    mac.update(token.as_bytes());
    Ok(mac)
}
