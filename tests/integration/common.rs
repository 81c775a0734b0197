//! Shared fixtures: a fake content API and engine builders

use futures::FutureExt;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use word_ripple::config::{ApiConfig, EngineConfig};
use word_ripple::crawler::{Coordinator, Fetcher, Sleeper};
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const API_PATH: &str = "/w/api.php";

/// Backoff delays requested by a fetcher, in order
pub type Delays = Arc<Mutex<Vec<Duration>>>;

pub fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        url: format!("{}{}", server.uri(), API_PATH),
        user_agent: "TestRipple/1.0".to_string(),
        access_token: None,
        request_timeout_ms: 300,
        max_attempts: 5,
    }
}

pub fn engine_config(batch_size: u32) -> EngineConfig {
    EngineConfig {
        workers: 4,
        batch_size,
    }
}

/// A sleeper that records each delay and returns at once
pub fn recording_sleeper() -> (Sleeper, Delays) {
    let delays: Delays = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&delays);
    let sleeper: Sleeper = Arc::new(move |delay: Duration| {
        recorder.lock().unwrap().push(delay);
        async {}.boxed()
    });
    (sleeper, delays)
}

pub fn fetcher(config: &ApiConfig) -> (Fetcher, Delays) {
    let (sleeper, delays) = recording_sleeper();
    let fetcher = Fetcher::new(config)
        .expect("Failed to build fetcher")
        .with_sleeper(sleeper);
    (fetcher, delays)
}

pub fn coordinator(server: &MockServer, batch_size: u32) -> (Coordinator, Delays) {
    let (fetcher, delays) = fetcher(&api_config(server));
    let coordinator = Coordinator::with_fetcher(&engine_config(batch_size), fetcher)
        .expect("Failed to create coordinator");
    (coordinator, delays)
}

pub fn param(request: &Request, name: &str) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

pub fn query_pairs(request: &Request) -> Vec<(String, String)> {
    request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

pub fn titles_of(request: &Request) -> Vec<String> {
    param(request, "titles")
        .map(|t| t.split('|').map(str::to_string).collect())
        .unwrap_or_default()
}

/// Title batches of every received request for the given `prop`
pub async fn batches(server: &MockServer, prop: &str) -> Vec<Vec<String>> {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .filter(|r| param(r, "prop").as_deref() == Some(prop))
        .map(titles_of)
        .collect()
}

pub fn counts(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
    pairs.iter().map(|(w, c)| (w.to_string(), *c)).collect()
}

fn extract_page(title: &str, extract: &str) -> Value {
    json!({ "ns": 0, "title": title, "extract": extract })
}

fn links_page(title: &str, links: &[String]) -> Value {
    let links: Vec<Value> = links
        .iter()
        .map(|l| json!({ "ns": 0, "title": l }))
        .collect();
    json!({ "ns": 0, "title": title, "links": links })
}

fn query_body(pages: Vec<Value>, continuation: Option<Value>) -> Value {
    let pages: Map<String, Value> = pages
        .into_iter()
        .enumerate()
        .map(|(i, page)| ((i + 1).to_string(), page))
        .collect();
    let mut body = json!({ "batchcomplete": "", "query": { "pages": pages } });
    if let Some(continuation) = continuation {
        body["continue"] = continuation;
    }
    body
}

/// In-memory articles served the way the content API serves them
///
/// Unknown titles get the extract `n/a` and no links.
#[derive(Clone, Default)]
pub struct FakeWiki {
    extracts: HashMap<String, String>,
    links: HashMap<String, Vec<String>>,
}

impl FakeWiki {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn article(mut self, title: &str, extract: &str, links: &[&str]) -> Self {
        self.extracts.insert(title.to_string(), extract.to_string());
        self.links.insert(
            title.to_string(),
            links.iter().map(|l| l.to_string()).collect(),
        );
        self
    }
}

impl Respond for FakeWiki {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let titles = titles_of(request);
        let pages: Vec<Value> = match param(request, "prop").as_deref() {
            Some("links") => titles
                .iter()
                .map(|t| links_page(t, self.links.get(t).map(Vec::as_slice).unwrap_or(&[])))
                .collect(),
            _ => titles
                .iter()
                .map(|t| extract_page(t, self.extracts.get(t).map_or("n/a", String::as_str)))
                .collect(),
        };
        ResponseTemplate::new(200).set_body_json(query_body(pages, None))
    }
}

/// Links of every title served in two continuation pages
///
/// Extracts are the title itself.
pub struct PagedLinks {
    pub first: Vec<String>,
    pub second: Vec<String>,
}

impl Respond for PagedLinks {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let titles = titles_of(request);
        let body = match param(request, "prop").as_deref() {
            Some("links") if param(request, "plcontinue").is_some() => {
                query_body(vec![links_page(&titles[0], &self.second)], None)
            }
            Some("links") => query_body(
                vec![links_page(&titles[0], &self.first)],
                Some(json!({ "plcontinue": "736|0|Next", "continue": "||" })),
            ),
            _ => query_body(titles.iter().map(|t| extract_page(t, t)).collect(), None),
        };
        ResponseTemplate::new(200).set_body_json(body)
    }
}

/// Extracts of multi-title batches split across continuation pages
///
/// The first page carries the first title's extract, the continuation the
/// last title's. Every title links to `links`.
pub struct PagedExtracts {
    pub links: Vec<String>,
}

impl Respond for PagedExtracts {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let titles = titles_of(request);
        let body = match param(request, "prop").as_deref() {
            Some("links") => query_body(vec![links_page(&titles[0], &self.links)], None),
            _ if titles.len() == 1 => query_body(vec![extract_page(&titles[0], &titles[0])], None),
            _ if param(request, "excontinue").is_some() => {
                let last = &titles[titles.len() - 1];
                query_body(vec![extract_page(last, last)], None)
            }
            _ => query_body(
                vec![extract_page(&titles[0], &titles[0])],
                Some(json!({ "excontinue": 1, "continue": "||" })),
            ),
        };
        ResponseTemplate::new(200).set_body_json(body)
    }
}
