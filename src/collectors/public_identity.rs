//! Public IP, ISP and geolocation lookup
//!
//! Issues one GET to a JSON geolocation service. Every failure (timeout,
//! non-success status, unreachable network, malformed body) is reported the
//! same way to the caller.

use log::{debug, info};
use serde::Deserialize;
use std::time::Duration;

use crate::collectors::errors::{ProbeError, ProbeResult};
use crate::models::{ProbeOutcome, PublicInfo};

/// Subset of the geolocation response this tool reads
#[derive(Debug, Deserialize)]
struct GeolocationResponse {
    query: Option<String>,
    isp: Option<String>,
    city: Option<String>,
    country: Option<String>,
    timezone: Option<String>,
}

impl From<GeolocationResponse> for PublicInfo {
    fn from(response: GeolocationResponse) -> Self {
        PublicInfo {
            ip: response.query,
            isp: response.isp,
            city: response.city,
            country: response.country,
            timezone: response.timezone,
        }
    }
}

/// Parses a geolocation response body
///
/// Missing keys become `None`; values are passed through untouched.
pub fn parse_public_info(body: &str) -> ProbeResult<PublicInfo> {
    let response: GeolocationResponse = serde_json::from_str(body)?;
    Ok(response.into())
}

/// Fetches public identity, returning the error cause
pub async fn try_fetch_public_info(url: &str, timeout: Duration) -> ProbeResult<PublicInfo> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    debug!("Requesting public identity from {} (timeout={:?})", url, timeout);
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::BadStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    let info = parse_public_info(&body)?;
    info!(
        "Public identity resolved: ip={:?}, isp={:?}",
        info.ip, info.isp
    );
    Ok(info)
}

/// Fetches public identity, collapsing any failure into `Unavailable`
pub async fn fetch_public_info(url: &str, timeout: Duration) -> ProbeOutcome<PublicInfo> {
    ProbeOutcome::from_result("public identity", try_fetch_public_info(url, timeout).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_response() {
        let body = r#"{
            "status": "success",
            "country": "New Zealand",
            "countryCode": "NZ",
            "city": "Auckland",
            "timezone": "Pacific/Auckland",
            "isp": "Spark New Zealand",
            "query": "203.0.113.42"
        }"#;

        let info = parse_public_info(body).expect("valid body should parse");
        assert_eq!(info.ip.as_deref(), Some("203.0.113.42"));
        assert_eq!(info.isp.as_deref(), Some("Spark New Zealand"));
        assert_eq!(info.city.as_deref(), Some("Auckland"));
        assert_eq!(info.country.as_deref(), Some("New Zealand"));
        assert_eq!(info.timezone.as_deref(), Some("Pacific/Auckland"));
    }

    #[test]
    fn test_parse_missing_fields_become_none() {
        let info = parse_public_info(r#"{"query": "198.51.100.7"}"#).expect("should parse");
        assert_eq!(info.ip.as_deref(), Some("198.51.100.7"));
        assert_eq!(info.isp, None);
        assert_eq!(info.city, None);
        assert_eq!(info.country, None);
        assert_eq!(info.timezone, None);
    }

    #[test]
    fn test_parse_null_fields_become_none() {
        let info = parse_public_info(r#"{"query": null, "isp": "Example ISP"}"#)
            .expect("should parse");
        assert_eq!(info.ip, None);
        assert_eq!(info.isp.as_deref(), Some("Example ISP"));
    }

    #[test]
    fn test_parse_malformed_body_fails() {
        assert!(parse_public_info("<html>rate limited</html>").is_err());
        assert!(parse_public_info("").is_err());
    }

    #[test]
    fn test_unreachable_endpoint_is_unavailable() {
        let outcome = tokio_test::block_on(fetch_public_info(
            "http://127.0.0.1:9/json",
            Duration::from_millis(500),
        ));
        assert_eq!(outcome, ProbeOutcome::Unavailable);
    }
}
