use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{debug, warn};

/// Google's id-token introspection endpoint.
/// https://developers.google.com/identity/sign-in/web/backend-auth
const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider unreachable: {0}")]
    Unreachable(String),
    #[error("invalid or expired id token")]
    Rejected,
    #[error("token audience mismatch")]
    AudienceMismatch,
    #[error("token has expired")]
    Expired,
    #[error("token missing required fields")]
    MissingFields,
}

/// Normalized identity claim extracted from a verified id token.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleClaim {
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

/// Verifies Google id tokens against the tokeninfo endpoint.
#[derive(Clone)]
pub struct GoogleVerifier {
    http: reqwest::Client,
    audience: String,
    endpoint: String,
}

impl GoogleVerifier {
    pub fn new(audience: String) -> Self {
        // a slow provider must not stall the login pipeline
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            audience,
            endpoint: TOKENINFO_URL.to_string(),
        }
    }

    /// Exchange an opaque id token for a normalized claim, validating
    /// signature (delegated to the provider), audience and expiry.
    pub async fn verify(&self, id_token: &str) -> Result<GoogleClaim, IdentityError> {
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "tokeninfo endpoint unreachable");
                IdentityError::Unreachable(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "tokeninfo rejected id token");
            return Err(IdentityError::Rejected);
        }

        let body: Value = resp.json().await.map_err(|_| IdentityError::Rejected)?;
        debug!("tokeninfo response parsed");
        claim_from_tokeninfo(
            &body,
            &self.audience,
            OffsetDateTime::now_utc().unix_timestamp(),
        )
    }
}

/// Validate a tokeninfo payload and extract the normalized claim.
/// tokeninfo serializes numbers as strings, so `exp` is probed both ways.
pub fn claim_from_tokeninfo(
    body: &Value,
    audience: &str,
    now: i64,
) -> Result<GoogleClaim, IdentityError> {
    match int_field(body, "exp") {
        Some(exp) if exp < now => return Err(IdentityError::Expired),
        Some(_) => {}
        None => return Err(IdentityError::MissingFields),
    }

    match body.get("aud").and_then(Value::as_str) {
        Some(aud) if aud == audience => {}
        Some(_) => return Err(IdentityError::AudienceMismatch),
        None => return Err(IdentityError::MissingFields),
    }

    let email = body
        .get("email")
        .and_then(Value::as_str)
        .ok_or(IdentityError::MissingFields)?
        .to_string();
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(&email)
        .to_string();
    let picture = body
        .get("picture")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(GoogleClaim {
        name,
        email,
        picture,
    })
}

fn int_field(body: &Value, key: &str) -> Option<i64> {
    match body.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const AUD: &str = "cafeboard-client-id";
    const NOW: i64 = 1_700_000_000;

    fn tokeninfo(overrides: impl FnOnce(&mut Value)) -> Value {
        let mut body = json!({
            "aud": AUD,
            "exp": (NOW + 3600).to_string(),
            "email": "guest@example.com",
            "email_verified": "true",
            "name": "Guest",
            "picture": "https://lh3.example/photo.jpg",
        });
        overrides(&mut body);
        body
    }

    #[test]
    fn valid_payload_yields_normalized_claim() {
        let claim = claim_from_tokeninfo(&tokeninfo(|_| {}), AUD, NOW).unwrap();
        assert_eq!(
            claim,
            GoogleClaim {
                name: "Guest".into(),
                email: "guest@example.com".into(),
                picture: Some("https://lh3.example/photo.jpg".into()),
            }
        );
    }

    #[test]
    fn numeric_exp_is_accepted_too() {
        let body = tokeninfo(|b| b["exp"] = json!(NOW + 60));
        assert!(claim_from_tokeninfo(&body, AUD, NOW).is_ok());
    }

    #[test]
    fn audience_mismatch_is_rejected() {
        let body = tokeninfo(|b| b["aud"] = json!("someone-else"));
        assert!(matches!(
            claim_from_tokeninfo(&body, AUD, NOW),
            Err(IdentityError::AudienceMismatch)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let body = tokeninfo(|b| b["exp"] = json!((NOW - 10).to_string()));
        assert!(matches!(
            claim_from_tokeninfo(&body, AUD, NOW),
            Err(IdentityError::Expired)
        ));
    }

    #[test]
    fn missing_email_is_rejected() {
        let body = tokeninfo(|b| {
            b.as_object_mut().unwrap().remove("email");
        });
        assert!(matches!(
            claim_from_tokeninfo(&body, AUD, NOW),
            Err(IdentityError::MissingFields)
        ));
    }

    #[test]
    fn missing_name_falls_back_to_email() {
        let body = tokeninfo(|b| {
            b.as_object_mut().unwrap().remove("name");
        });
        let claim = claim_from_tokeninfo(&body, AUD, NOW).unwrap();
        assert_eq!(claim.name, "guest@example.com");
    }
}
