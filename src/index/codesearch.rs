//! Code-search JSON API client
//!
//! Implements [`IndexClient`] against the code-search `json` endpoint. Each
//! query is a single request whose parameters are bracketed `b`/`e` groups:
//! - `annotation_request` for a file's annotations
//! - `xref_search_request` for the edges of a signature
//! - `call_graph_request` for the direct callers of a signature
//! - `search_request` for symbol search
//!
//! All failures (transport, status, decoding) surface as
//! `Error::UpstreamUnavailable`.
//!
//! @module index/codesearch

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::cache::ResponseCache;
use super::types::{
    Annotation, AnnotationKind, Edge, EdgeKind, EdgeKinds, LineRange, RawCallGraphEntry,
    Signature,
};
use super::IndexClient;
use crate::core::config::Config;
use crate::core::error::{Error, Result};

// =============================================================================
// CLIENT
// =============================================================================

/// Blocking client for the code-search JSON API
pub struct CodeSearchClient {
    http: Client,
    base_url: String,
    package_name: String,
    max_results: usize,
    post_threshold: usize,
    cache: Option<ResponseCache>,
}

impl CodeSearchClient {
    /// Build a client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.index.base_url).map_err(|e| Error::ConfigError {
            message: format!("invalid index.base_url {}: {}", config.index.base_url, e),
        })?;

        let http = Client::builder()
            .timeout(config.index.timeout())
            .connect_timeout(config.index.timeout())
            .tcp_nodelay(true)
            .build()?;

        let cache = config
            .cache
            .enabled
            .then(|| ResponseCache::new(config.cache.capacity, config.cache.ttl()));

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            package_name: config.index.package_name.clone(),
            max_results: config.index.max_results,
            post_threshold: config.index.post_threshold,
            cache,
        })
    }

    /// Build a request URL from ordered query parameters
    fn url(&self, params: &[(&str, &str)]) -> String {
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.base_url, query)
    }

    /// Fetch a response body, consulting the cache first
    fn retrieve(&self, url: &str) -> Result<String> {
        if let Some(body) = self.cache.as_ref().and_then(|c| c.get(url)) {
            return Ok(body);
        }

        let request = match url.split_once('?') {
            Some((short_url, data)) if url.len() > self.post_threshold => self
                .http
                .post(short_url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(data.to_string()),
            _ => self.http.get(url),
        };

        let response = request
            .send()
            .map_err(|e| Error::upstream(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Code search returned {}", status);
            return Err(Error::upstream(format!("code search returned {}", status)));
        }

        let body = response
            .text()
            .map_err(|e| Error::upstream(format!("failed to read response: {}", e)))?;

        if let Some(cache) = &self.cache {
            cache.put(url, body.clone());
        }
        Ok(body)
    }
}

impl IndexClient for CodeSearchClient {
    fn annotations(&self, file: &str) -> Result<Vec<Annotation>> {
        let url = self.url(&[
            ("annotation_request", "b"),
            ("file_spec", "b"),
            ("package_name", &self.package_name),
            ("name", file),
            ("file_spec", "e"),
            ("type", "b"),
            ("id", "1"),
            ("type", "e"),
            ("label", ""),
            ("follow_branches", "false"),
            ("annotation_request", "e"),
        ]);
        let annotations = parse_annotations(&self.retrieve(&url)?)?;
        debug!("{} annotations for {}", annotations.len(), file);
        Ok(annotations)
    }

    fn edges(&self, signature: &Signature, kinds: EdgeKinds) -> Result<Vec<Edge>> {
        let max = self.max_results.to_string();
        let url = self.url(&[
            ("xref_search_request", "b"),
            ("query", signature.as_str()),
            ("file_spec", "b"),
            ("name", "."),
            ("package_name", &self.package_name),
            ("file_spec", "e"),
            ("max_num_results", &max),
            ("xref_search_request", "e"),
        ]);
        parse_edges(signature, &self.retrieve(&url)?, kinds)
    }

    fn direct_callers(&self, signature: &Signature) -> Result<Vec<RawCallGraphEntry>> {
        let max = self.max_results.to_string();
        let url = self.url(&[
            ("call_graph_request", "b"),
            ("signature", signature.as_str()),
            ("file_spec", "b"),
            ("package_name", &self.package_name),
            ("name", "."),
            ("file_spec", "e"),
            ("max_num_results", &max),
            ("call_graph_request", "e"),
        ]);
        parse_callers(&self.retrieve(&url)?)
    }

    fn search_symbols(&self, pattern: &str) -> Result<Vec<Signature>> {
        let max = self.max_results.to_string();
        let query = format!("symbol:{}", pattern);
        let url = self.url(&[
            ("search_request", "b"),
            ("query", &query),
            ("file_spec", "b"),
            ("package_name", &self.package_name),
            ("file_spec", "e"),
            ("max_num_results", &max),
            ("return_line_matches", "false"),
            ("search_request", "e"),
        ]);
        parse_symbols(&self.retrieve(&url)?)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnnotationEnvelope {
    #[serde(default)]
    annotation_response: Vec<AnnotationResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnnotationResponse {
    annotation: Vec<WireAnnotation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireAnnotation {
    range: Option<WireRange>,
    internal_link: Option<WireSignature>,
    xref_signature: Option<WireSignature>,
    #[serde(alias = "kind")]
    xref_kind: Option<serde_json::Value>,
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireRange {
    start_line: u32,
    start_column: u32,
    end_line: u32,
    end_column: u32,
}

#[derive(Debug, Deserialize)]
struct WireSignature {
    signature: String,
}

#[derive(Debug, Deserialize)]
struct XrefEnvelope {
    #[serde(default)]
    xref_search_response: Vec<XrefResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XrefResponse {
    search_result: Vec<XrefFileResult>,
}

#[derive(Debug, Deserialize)]
struct XrefFileResult {
    file: WireFile,
    #[serde(default, rename = "match")]
    matches: Vec<XrefMatch>,
}

#[derive(Debug, Deserialize)]
struct WireFile {
    name: String,
}

#[derive(Debug, Deserialize)]
struct XrefMatch {
    #[serde(rename = "type")]
    match_type: String,
    line_number: u32,
    #[serde(default)]
    line_text: String,
    #[serde(default)]
    signature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallGraphEnvelope {
    #[serde(default)]
    call_graph_response: Vec<CallGraphResponse>,
}

#[derive(Debug, Deserialize)]
struct CallGraphResponse {
    #[serde(default)]
    node: CallGraphNodeWire,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CallGraphNodeWire {
    children: Vec<CallGraphChild>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CallGraphChild {
    signature: String,
    identifier: String,
    display_name: String,
    snippet_file_path: Option<String>,
    call_site_range: WireRange,
    snippet: Option<WireSnippet>,
}

#[derive(Debug, Deserialize)]
struct WireSnippet {
    text: WireText,
}

#[derive(Debug, Deserialize)]
struct WireText {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    search_response: Vec<SearchResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    search_result: Vec<SearchFileResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchFileResult {
    #[serde(rename = "match")]
    matches: Vec<SearchMatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchMatch {
    signature: Option<String>,
    internal_link: Option<WireSignature>,
}

// =============================================================================
// DECODING
// =============================================================================

fn decode<T: for<'de> Deserialize<'de>>(body: &str) -> Result<Option<T>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| Error::upstream(format!("malformed response: {}", e)))
}

fn parse_annotations(body: &str) -> Result<Vec<Annotation>> {
    let Some(envelope) = decode::<AnnotationEnvelope>(body)? else {
        return Ok(Vec::new());
    };
    let Some(response) = envelope.annotation_response.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut annotations = Vec::with_capacity(response.annotation.len());
    for wire in response.annotation {
        let Some(range) = wire.range else {
            continue;
        };

        let kind = match &wire.xref_kind {
            None => AnnotationKind::Link,
            Some(serde_json::Value::String(kind)) => match kind.parse() {
                Ok(kind) => kind,
                Err(e) => {
                    debug!("Skipping annotation: {}", e);
                    continue;
                }
            },
            Some(other) => {
                debug!("Skipping annotation with kind {}", other);
                continue;
            }
        };

        let signature = wire
            .xref_signature
            .or(wire.internal_link)
            .map(|s| Signature::new(s.signature));

        annotations.push(Annotation {
            kind,
            signature,
            range: LineRange::new(
                range.start_line,
                range.start_column,
                range.end_line,
                range.end_column,
            ),
            text: wire.text.unwrap_or_default(),
        });
    }
    Ok(annotations)
}

fn parse_edges(source: &Signature, body: &str, kinds: EdgeKinds) -> Result<Vec<Edge>> {
    let Some(envelope) = decode::<XrefEnvelope>(body)? else {
        return Ok(Vec::new());
    };
    let Some(response) = envelope.xref_search_response.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut edges = Vec::new();
    for file_result in response.search_result {
        for m in file_result.matches {
            let kind: EdgeKind = match m.match_type.parse() {
                Ok(kind) => kind,
                Err(e) => {
                    debug!("Skipping xref match: {}", e);
                    continue;
                }
            };
            if !kinds.has(kind) {
                continue;
            }
            edges.push(Edge {
                source: source.clone(),
                kind,
                file: file_result.file.name.clone(),
                line: m.line_number,
                column: None,
                snippet: m.line_text,
                target: m.signature.map(Signature::new),
            });
        }
    }
    Ok(edges)
}

fn parse_callers(body: &str) -> Result<Vec<RawCallGraphEntry>> {
    let Some(envelope) = decode::<CallGraphEnvelope>(body)? else {
        return Ok(Vec::new());
    };
    let Some(response) = envelope.call_graph_response.into_iter().next() else {
        return Ok(Vec::new());
    };

    Ok(response
        .node
        .children
        .into_iter()
        .map(|child| RawCallGraphEntry {
            identifier: child.identifier,
            signature: Signature::new(child.signature),
            file_path: child.snippet_file_path,
            call_site_line: child.call_site_range.start_line,
            call_site_column: child.call_site_range.start_column,
            snippet_text: child.snippet.map(|s| s.text.text).unwrap_or_default(),
            display_name: child.display_name,
        })
        .collect())
}

fn parse_symbols(body: &str) -> Result<Vec<Signature>> {
    let Some(envelope) = decode::<SearchEnvelope>(body)? else {
        return Ok(Vec::new());
    };

    let mut symbols: Vec<Signature> = Vec::new();
    for response in envelope.search_response {
        for result in response.search_result {
            for m in result.matches {
                let signature = m.signature.or(m.internal_link.map(|l| l.signature));
                if let Some(signature) = signature.map(Signature::new) {
                    if !symbols.contains(&signature) {
                        symbols.push(signature);
                    }
                }
            }
        }
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_brackets_and_encoding() {
        let client = CodeSearchClient::new(&Config::default()).unwrap();
        let url = client.url(&[("name", "src/a b.cc"), ("label", "")]);
        assert_eq!(
            url,
            "https://cs.chromium.org/codesearch/json?name=src%2Fa%20b.cc&label="
        );
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let mut config = Config::default();
        config.index.base_url = "not a url".to_string();
        assert!(matches!(
            CodeSearchClient::new(&config),
            Err(Error::ConfigError { .. })
        ));
    }

    #[test]
    fn test_parse_annotations() {
        let body = r#"{"annotation_response":[{"annotation":[
            {"range":{"start_line":10,"start_column":5,"end_line":10,"end_column":8},
             "xref_signature":{"signature":"cpp:ns::class-A::Foo()@x"},
             "xref_kind":"METHOD","text":"Foo"},
            {"range":{"start_line":12,"start_column":0,"end_line":12,"end_column":3},
             "internal_link":{"signature":"cpp:ns::Bar"}},
            {"range":{"start_line":14,"start_column":0,"end_line":14,"end_column":3},
             "xref_kind":"MACRO"},
            {"internal_link":{"signature":"no-range"}}
        ]}]}"#;

        let annotations = parse_annotations(body).unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].kind, AnnotationKind::Method);
        assert_eq!(annotations[0].text, "Foo");
        assert_eq!(annotations[1].kind, AnnotationKind::Link);
        assert_eq!(
            annotations[1].signature.as_ref().map(|s| s.as_str()),
            Some("cpp:ns::Bar")
        );
    }

    #[test]
    fn test_parse_edges_maps_and_filters_kinds() {
        let body = r#"{"xref_search_response":[{"status":0,"search_result":[
            {"file":{"name":"src/a.cc"},"match":[
                {"type":"HAS_DEFINITION","line_number":3,"line_text":"void Foo() {"},
                {"type":"REFERENCED_AT","line_number":9,"line_text":"Foo();"},
                {"type":"INSTANTIATED_BY","line_number":11}
            ]}
        ]}]}"#;

        let source = Signature::from("sig");
        let all = parse_edges(&source, body, EdgeKinds::XREFS).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, EdgeKind::Definition);
        assert_eq!(all[1].file, "src/a.cc");

        let refs = parse_edges(&source, body, EdgeKinds::REFERENCE).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].snippet, "Foo();");
    }

    #[test]
    fn test_parse_callers_keeps_missing_file() {
        let body = r#"{"call_graph_response":[{"node":{"children":[
            {"signature":"s1","identifier":"Run","display_name":"a::Run(int)",
             "snippet_file_path":"src/a.cc",
             "call_site_range":{"start_line":7,"start_column":2},
             "snippet":{"text":{"text":"Foo();"}}},
            {"signature":"s2","identifier":"Gen","display_name":"Gen()"}
        ]}}]}"#;

        let callers = parse_callers(body).unwrap();
        assert_eq!(callers.len(), 2);
        assert_eq!(callers[0].call_site_line, 7);
        assert_eq!(callers[0].snippet_text, "Foo();");
        assert!(callers[1].file_path.is_none());
    }

    #[test]
    fn test_empty_and_malformed_bodies() {
        assert!(parse_callers("").unwrap().is_empty());
        assert!(parse_callers(r#"{"call_graph_response":[]}"#).unwrap().is_empty());
        assert!(parse_symbols("{not json").unwrap_err().is_upstream());
    }

    #[test]
    fn test_parse_symbols_dedups_in_order() {
        let body = r#"{"search_response":[{"search_result":[
            {"match":[{"signature":"a"},{"internal_link":{"signature":"b"}}]},
            {"match":[{"signature":"a"}]}
        ]}]}"#;
        let symbols = parse_symbols(body).unwrap();
        assert_eq!(symbols, vec![Signature::from("a"), Signature::from("b")]);
    }
}
