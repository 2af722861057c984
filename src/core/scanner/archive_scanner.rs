// src/core/scanner/archive_scanner.rs

use crate::config::ReconConfig;
use crate::core::error::SourceError;
use crate::core::models::{ArchiveHarvest, ArchiveOrigin, ArchiveToolSummary};
use crate::core::scanner::external_tool::{parse_url_lines, run_external_tool};
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Collects historical URLs for a domain from a local archive tool or the
/// Wayback Machine CDX index.
pub struct ArchiveScanner {
    client: reqwest::Client,
    endpoint: String,
    tool: String,
    tool_timeout: Duration,
}

impl ArchiveScanner {
    pub fn new(config: &ReconConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.cdx_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.cdx_endpoint.clone(),
            tool: config.archive_tool.clone(),
            tool_timeout: config.archive_tool_timeout,
        })
    }

    /// Returns at most `max` unique URLs in first-seen order.
    ///
    /// The local tool is only tried when `use_tool` is set; if it fails or
    /// prints nothing, the CDX index is queried instead. A failing CDX query
    /// yields an empty list, so "nothing archived" and "archive unreachable"
    /// look the same to the caller.
    ///
    /// # Arguments
    /// * `domain` - The domain whose archived URLs are wanted.
    /// * `max` - Upper bound on the number of URLs returned.
    /// * `use_tool` - Whether to try the local archive tool first.
    pub async fn harvest(&self, domain: &str, max: usize, use_tool: bool) -> ArchiveHarvest {
        if use_tool {
            info!(tool = %self.tool, target = %domain, "Trying local archive tool.");
            let run = run_external_tool(&[self.tool.as_str(), domain], self.tool_timeout).await;
            if run.has_output() {
                let urls = parse_url_lines(&run.stdout);
                let summary = ArchiveToolSummary { rc: run.status.rc(), count: urls.len() };
                let urls = dedupe_capped(urls, max);
                info!(count = %urls.len(), "Archive tool produced URLs.");
                return ArchiveHarvest { urls, origin: ArchiveOrigin::Tool, tool_summary: Some(summary) };
            }
            warn!(tool = %self.tool, rc = run.status.rc(), "Archive tool not found or failed, falling back to the CDX API.");
        }

        info!(target = %domain, "Querying Wayback CDX API.");
        let urls = match self.query_cdx(domain, max).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!(target = %domain, error = %e, "CDX query failed, continuing without archive URLs.");
                Vec::new()
            }
        };

        ArchiveHarvest { urls: dedupe_capped(urls, max), origin: ArchiveOrigin::CdxApi, tool_summary: None }
    }

    /// Queries the CDX index for up to `limit` original URLs.
    pub async fn query_cdx(&self, domain: &str, limit: usize) -> Result<Vec<String>, SourceError> {
        let query = [
            ("url", format!("{domain}/*")),
            ("output", "json".to_string()),
            ("fl", "original".to_string()),
            ("collapse", "urlkey".to_string()),
            ("limit", limit.to_string()),
        ];

        let response = self.client.get(&self.endpoint).query(&query).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SourceError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.text().await?;
        // The index answers with an empty body when nothing is archived.
        if body.trim().is_empty() {
            debug!(target = %domain, "CDX returned an empty body.");
            return Ok(Vec::new());
        }

        let records: Vec<Value> = serde_json::from_str(&body).map_err(|_| SourceError::Decode)?;
        let urls = parse_cdx_records(&records);
        debug!(records = records.len(), urls = urls.len(), "Parsed CDX records.");
        Ok(dedupe_capped(urls, limit))
    }
}

/// Extracts one URL per CDX record.
///
/// Records may be bare strings or arrays whose first element is the URL. A
/// leading array containing the field name `"original"` is a header and is
/// skipped. Anything else is ignored.
pub fn parse_cdx_records(records: &[Value]) -> Vec<String> {
    records
        .iter()
        .enumerate()
        .filter(|(i, record)| !(*i == 0 && is_header(record)))
        .filter_map(|(_, record)| match record {
            Value::String(url) => Some(url.clone()),
            Value::Array(fields) => fields.first().and_then(Value::as_str).map(String::from),
            _ => None,
        })
        .collect()
}

fn is_header(record: &Value) -> bool {
    record
        .as_array()
        .is_some_and(|fields| fields.iter().any(|f| f.as_str() == Some("original")))
}

/// Drops exact duplicates, keeping first-seen order, and stops at `max`.
pub fn dedupe_capped<I>(urls: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for url in urls {
        if out.len() >= max {
            break;
        }
        if seen.insert(url.clone()) {
            out.push(url);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scanner_for(server: &MockServer) -> ArchiveScanner {
        let config = ReconConfig::default().with_cdx_endpoint(format!("{}/cdx/search/cdx", server.uri()));
        ArchiveScanner::new(&config).unwrap()
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let urls = strings(&["http://a/", "http://a/", "http://b/"]);
        assert_eq!(dedupe_capped(urls, 10), strings(&["http://a/", "http://b/"]));
    }

    #[test]
    fn dedupe_stops_at_max_unique() {
        let urls = strings(&["http://a/", "http://a/", "http://b/", "http://c/", "http://d/"]);
        assert_eq!(dedupe_capped(urls, 2), strings(&["http://a/", "http://b/"]));
        assert!(dedupe_capped(strings(&["http://a/"]), 0).is_empty());
    }

    #[test]
    fn header_record_is_skipped_and_shapes_are_tolerated() {
        let records = vec![
            json!(["original"]),
            json!(["http://example.com/x"]),
            json!("http://example.com/y"),
            json!([]),
            json!(42),
            json!([7]),
        ];
        assert_eq!(
            parse_cdx_records(&records),
            strings(&["http://example.com/x", "http://example.com/y"])
        );
    }

    #[test]
    fn header_is_only_recognised_in_first_position() {
        let records = vec![json!(["http://example.com/a"]), json!(["original"])];
        assert_eq!(parse_cdx_records(&records), strings(&["http://example.com/a", "original"]));
    }

    #[tokio::test]
    async fn cdx_query_skips_header_and_collapses_duplicates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cdx/search/cdx"))
            .and(query_param("url", "example.com/*"))
            .and(query_param("output", "json"))
            .and(query_param("fl", "original"))
            .and(query_param("limit", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                ["original"],
                ["http://example.com/x"],
                ["http://example.com/x"]
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let harvest = scanner_for(&server).harvest("example.com", 500, false).await;
        assert_eq!(harvest.urls, strings(&["http://example.com/x"]));
        assert_eq!(harvest.origin, ArchiveOrigin::CdxApi);
        assert!(harvest.tool_summary.is_none());
    }

    #[tokio::test]
    async fn server_error_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let scanner = scanner_for(&server);
        assert!(matches!(
            scanner.query_cdx("example.com", 10).await,
            Err(SourceError::UnexpectedStatus(503))
        ));
        assert!(scanner.harvest("example.com", 10, false).await.urls.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        let scanner = scanner_for(&server);
        assert!(matches!(scanner.query_cdx("example.com", 10).await, Err(SourceError::Decode)));
        assert!(scanner.harvest("example.com", 10, false).await.urls.is_empty());
    }

    #[tokio::test]
    async fn empty_body_means_nothing_archived() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        assert!(scanner_for(&server).query_cdx("example.com", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_tool_falls_back_to_cdx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([["http://example.com/z"]])))
            .expect(1)
            .mount(&server)
            .await;

        let mut scanner = scanner_for(&server);
        scanner.tool = "definitely-not-a-real-binary-7c1e".to_string();
        let harvest = scanner.harvest("example.com", 5, true).await;
        assert_eq!(harvest.origin, ArchiveOrigin::CdxApi);
        assert_eq!(harvest.urls, strings(&["http://example.com/z"]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tool_output_is_used_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let mut scanner = scanner_for(&server);
        // `echo <domain>` stands in for a tool printing one URL per line.
        scanner.tool = "echo".to_string();
        let harvest = scanner.harvest("http://example.com/from-tool", 5, true).await;
        assert_eq!(harvest.origin, ArchiveOrigin::Tool);
        assert_eq!(harvest.urls, strings(&["http://example.com/from-tool"]));
        assert_eq!(harvest.tool_summary, Some(ArchiveToolSummary { rc: 0, count: 1 }));
    }
}
