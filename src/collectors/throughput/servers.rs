//! Speed-test server list handling
//!
//! The provider returns its servers as JSON, each entry pointing at an
//! `upload.php` endpoint. Latency, download and upload URLs are derived from
//! the directory containing that endpoint.

use serde::Deserialize;

use crate::collectors::errors::{ProbeError, ProbeResult};

/// One entry of the provider's server list
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeedTestServer {
    /// Upload endpoint, e.g. `http://host:8080/speedtest/upload.php`
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sponsor: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub host: String,
    /// Distance from the caller in kilometres, as estimated by the provider
    #[serde(default)]
    pub distance: Option<f64>,
}

impl SpeedTestServer {
    /// Directory URL that holds the test files, with a trailing slash
    pub fn base_url(&self) -> &str {
        match self.url.rfind('/') {
            Some(index) => &self.url[..=index],
            None => &self.url,
        }
    }

    pub fn latency_url(&self, cache_buster: &str) -> String {
        format!("{}latency.txt?x={}", self.base_url(), cache_buster)
    }

    pub fn download_url(&self, size: u32) -> String {
        format!("{}random{}x{}.jpg", self.base_url(), size, size)
    }

    pub fn upload_url(&self) -> &str {
        &self.url
    }

    pub fn describe(&self) -> String {
        format!("{} ({}, {})", self.sponsor, self.name, self.country)
    }
}

/// A server chosen for the test, with its measured latency
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedServer {
    pub server: SpeedTestServer,
    /// Average latency in milliseconds, rounded to 3 decimals
    pub latency_ms: f64,
}

/// Parses the provider's JSON server list
pub fn parse_server_list(body: &str) -> ProbeResult<Vec<SpeedTestServer>> {
    let servers: Vec<SpeedTestServer> = serde_json::from_str(body)?;
    if servers.is_empty() {
        return Err(ProbeError::ServerDiscovery(
            "provider returned an empty server list".to_string(),
        ));
    }
    Ok(servers)
}

/// Keeps the `count` nearest servers; entries without a distance sort last
pub fn nearest(mut servers: Vec<SpeedTestServer>, count: usize) -> Vec<SpeedTestServer> {
    servers.sort_by(|a, b| {
        let a = a.distance.unwrap_or(f64::MAX);
        let b = b.distance.unwrap_or(f64::MAX);
        a.total_cmp(&b)
    });
    servers.truncate(count);
    servers
}

/// Picks the server with the lowest measured latency
///
/// Servers whose latency is at or above `unreachable_ms` are never chosen.
pub fn lowest_latency(
    measured: Vec<(SpeedTestServer, f64)>,
    unreachable_ms: f64,
) -> ProbeResult<SelectedServer> {
    measured
        .into_iter()
        .filter(|(_, latency_ms)| *latency_ms < unreachable_ms)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(server, latency_ms)| SelectedServer { server, latency_ms })
        .ok_or_else(|| ProbeError::ServerDiscovery("no candidate server responded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(url: &str, distance: Option<f64>) -> SpeedTestServer {
        SpeedTestServer {
            url: url.to_string(),
            name: "Auckland".to_string(),
            sponsor: "Example Net".to_string(),
            country: "New Zealand".to_string(),
            host: "speedtest.example.net:8080".to_string(),
            distance,
        }
    }

    #[test]
    fn test_derived_urls() {
        let s = server("http://speedtest.example.net:8080/speedtest/upload.php", None);
        assert_eq!(s.base_url(), "http://speedtest.example.net:8080/speedtest/");
        assert_eq!(
            s.latency_url("123"),
            "http://speedtest.example.net:8080/speedtest/latency.txt?x=123"
        );
        assert_eq!(
            s.download_url(350),
            "http://speedtest.example.net:8080/speedtest/random350x350.jpg"
        );
        assert_eq!(
            s.upload_url(),
            "http://speedtest.example.net:8080/speedtest/upload.php"
        );
        assert_eq!(s.describe(), "Example Net (Auckland, New Zealand)");
    }

    #[test]
    fn test_parse_server_list() {
        let body = r#"[
            {"url": "http://a.example:8080/speedtest/upload.php", "lat": "-36.8", "lon": "174.7",
             "distance": 12, "name": "Auckland", "country": "New Zealand", "cc": "NZ",
             "sponsor": "Alpha", "id": "1001", "host": "a.example:8080"},
            {"url": "http://b.example:8080/speedtest/upload.php", "name": "Wellington",
             "sponsor": "Beta", "id": "1002"}
        ]"#;

        let servers = parse_server_list(body).expect("server list should parse");
        assert_eq!(servers.len(), 2);
        assert_eq!(servers[0].sponsor, "Alpha");
        assert_eq!(servers[0].distance, Some(12.0));
        assert_eq!(servers[1].distance, None);
        assert_eq!(servers[1].country, "");
    }

    #[test]
    fn test_parse_empty_or_malformed_list_fails() {
        assert!(parse_server_list("[]").is_err());
        assert!(parse_server_list("{\"error\": true}").is_err());
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let servers = vec![
            server("http://far/upload.php", Some(900.0)),
            server("http://unknown/upload.php", None),
            server("http://near/upload.php", Some(5.0)),
            server("http://mid/upload.php", Some(120.0)),
        ];

        let picked = nearest(servers, 3);
        let urls: Vec<&str> = picked.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["http://near/upload.php", "http://mid/upload.php", "http://far/upload.php"]
        );
    }

    #[test]
    fn test_lowest_latency_skips_unreachable() {
        let measured = vec![
            (server("http://a/upload.php", Some(1.0)), 3_600_000.0),
            (server("http://b/upload.php", Some(2.0)), 24.125),
            (server("http://c/upload.php", Some(3.0)), 18.5),
        ];

        let selected = lowest_latency(measured, 3_600_000.0).expect("a server should be chosen");
        assert_eq!(selected.server.url, "http://c/upload.php");
        assert_eq!(selected.latency_ms, 18.5);
    }

    #[test]
    fn test_lowest_latency_all_unreachable_fails() {
        let measured = vec![(server("http://a/upload.php", None), 3_600_000.0)];
        assert!(lowest_latency(measured, 3_600_000.0).is_err());
        assert!(lowest_latency(Vec::new(), 3_600_000.0).is_err());
    }
}
