//! The HTTP implementation of [`TripleStore`].

use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::Deserialize;
use strata_core::{key::KeyPrefix, store::TripleStore, triple::Triple};
use tracing::debug;

use crate::{Error, Result};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Connection settings for the triple store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Base URL of the store, e.g. `http://localhost:1324`.
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Per-request timeout.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://localhost:1324".to_string() }

fn default_timeout_secs() -> u64 { 30 }

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      base_url:     default_base_url(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async HTTP client for the triple store.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based. Every call
/// is a single request; nothing is retried or batched.
#[derive(Clone)]
pub struct HttpStore {
  client: Client,
  config: StoreConfig,
}

impl HttpStore {
  pub fn new(config: StoreConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `/{route}/{percent-encoded prefix}`
  fn prefix_path(route: &str, prefix: &KeyPrefix) -> String {
    format!("/{route}/{}", urlencoding::encode(&prefix.to_string()))
  }

  /// `GET /HasKey/{prefix}`
  ///
  /// 2xx means a key exists and any 4xx means none does. A 5xx says nothing
  /// about the key and is an error.
  pub async fn has_key(&self, prefix: &KeyPrefix) -> Result<bool> {
    let path = Self::prefix_path("HasKey", prefix);
    debug!(%prefix, "HasKey");
    let resp = self.client.get(self.url(&path)).send().await?;

    let status = resp.status();
    if status.is_success() {
      return Ok(true);
    }
    if status.is_client_error() {
      return Ok(false);
    }
    Err(Error::Status {
      method: "GET",
      path,
      status,
    })
  }

  /// `GET /tuple/{prefix}`
  pub async fn get_tuples(&self, prefix: &KeyPrefix) -> Result<Vec<Triple>> {
    let path = Self::prefix_path("tuple", prefix);
    debug!(%prefix, "GetTuples");
    let resp = self.client.get(self.url(&path)).send().await?;

    if !resp.status().is_success() {
      return Err(Error::Status {
        method: "GET",
        path,
        status: resp.status(),
      });
    }
    let triples: Option<Vec<Triple>> = resp.json().await?;
    Ok(triples.unwrap_or_default())
  }

  /// `POST /tuple`
  pub async fn put_triple(&self, triple: &Triple) -> Result<()> {
    debug!(
      subject = %triple.subject,
      predicate = %triple.predicate,
      context = %triple.context,
      tombstone = triple.is_tombstone(),
      "PutTriple"
    );
    let resp = self
      .client
      .post(self.url("/tuple"))
      .json(triple)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status {
        method: "POST",
        path:   "/tuple".to_string(),
        status: resp.status(),
      });
    }
    Ok(())
  }
}

impl TripleStore for HttpStore {
  type Error = Error;

  fn has_key<'a>(
    &'a self,
    prefix: &'a KeyPrefix,
  ) -> impl Future<Output = Result<bool>> + Send + 'a {
    HttpStore::has_key(self, prefix)
  }

  fn get_tuples<'a>(
    &'a self,
    prefix: &'a KeyPrefix,
  ) -> impl Future<Output = Result<Vec<Triple>>> + Send + 'a {
    HttpStore::get_tuples(self, prefix)
  }

  fn put_triple<'a>(
    &'a self,
    triple: &'a Triple,
  ) -> impl Future<Output = Result<()>> + Send + 'a {
    HttpStore::put_triple(self, triple)
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path, path_regex},
  };

  use super::*;

  fn store_for(server: &MockServer) -> HttpStore {
    HttpStore::new(StoreConfig {
      base_url:     server.uri(),
      timeout_secs: 5,
    })
    .unwrap()
  }

  async fn decoded_request_path(server: &MockServer) -> String {
    let requests = server.received_requests().await.unwrap();
    let url = &requests[0].url;
    urlencoding::decode(url.path()).unwrap().into_owned()
  }

  #[tokio::test]
  async fn has_key_true_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path_regex("^/HasKey/.+"))
      .respond_with(ResponseTemplate::new(200))
      .mount(&server)
      .await;

    let store = store_for(&server);
    let prefix = KeyPrefix::subject("school1", "ABC");
    assert!(store.has_key(&prefix).await.unwrap());
    assert_eq!(
      decoded_request_path(&server).await,
      r#"/HasKey/c:"school1" s:"ABC" p:"#
    );
  }

  #[tokio::test]
  async fn has_key_false_on_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path_regex("^/HasKey/.+"))
      .respond_with(ResponseTemplate::new(404))
      .mount(&server)
      .await;

    let store = store_for(&server);
    let prefix = KeyPrefix::subject("school1", "ABC");
    assert!(!store.has_key(&prefix).await.unwrap());
  }

  #[tokio::test]
  async fn has_key_server_error_is_not_an_answer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path_regex("^/HasKey/.+"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let store = store_for(&server);
    let prefix = KeyPrefix::subject("c", "X");
    let err = store.has_key(&prefix).await.unwrap_err();
    assert!(matches!(
      err,
      Error::Status { method: "GET", status, .. } if status.as_u16() == 500
    ));
  }

  #[tokio::test]
  async fn get_tuples_decodes_pascal_case_records() {
    let server = MockServer::start().await;
    let body = serde_json::json!([
      { "Subject": "ABC", "Predicate": "Person.Name", "Object": "Ann", "Context": "school1" },
      { "Subject": "ABC", "Predicate": "Person.Tags.0", "Object": "x", "Context": "school1" },
    ]);
    Mock::given(method("GET"))
      .and(path_regex("^/tuple/.+"))
      .respond_with(ResponseTemplate::new(200).set_body_json(body))
      .mount(&server)
      .await;

    let store = store_for(&server);
    let prefix = KeyPrefix::predicate("school1", "Person.-RefId");
    let triples = store.get_tuples(&prefix).await.unwrap();
    assert_eq!(triples.len(), 2);
    assert_eq!(
      triples[0],
      Triple::new("ABC", "Person.Name", "Ann", "school1")
    );
    assert_eq!(
      decoded_request_path(&server).await,
      r#"/tuple/c:"school1" p:"Person.-RefId" s:"#
    );
  }

  #[tokio::test]
  async fn get_tuples_null_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path_regex("^/tuple/.+"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_raw("null", "application/json"),
      )
      .mount(&server)
      .await;

    let store = store_for(&server);
    let prefix = KeyPrefix::subject("c", "s");
    assert!(store.get_tuples(&prefix).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn get_tuples_error_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path_regex("^/tuple/.+"))
      .respond_with(ResponseTemplate::new(500))
      .mount(&server)
      .await;

    let store = store_for(&server);
    let prefix = KeyPrefix::subject("c", "s");
    let err = store.get_tuples(&prefix).await.unwrap_err();
    assert!(matches!(err, Error::Status { method: "GET", .. }));
  }

  #[tokio::test]
  async fn put_triple_posts_json_body() {
    let server = MockServer::start().await;
    let triple = Triple::new("ABC", "Person.Name", "Ann", "school1");
    Mock::given(method("POST"))
      .and(path("/tuple"))
      .and(body_json(serde_json::json!({
        "Subject": "ABC", "Predicate": "Person.Name",
        "Object": "Ann", "Context": "school1"
      })))
      .respond_with(ResponseTemplate::new(200))
      .expect(1)
      .mount(&server)
      .await;

    let store = store_for(&server);
    store.put_triple(&triple).await.unwrap();
  }

  #[tokio::test]
  async fn put_triple_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/tuple"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let store = store_for(&server);
    let err = store
      .put_triple(&Triple::new("s", "p", "o", "c"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Status { method: "POST", .. }));
  }

  #[tokio::test]
  async fn unreachable_store_is_a_transport_error() {
    let store = HttpStore::new(StoreConfig {
      base_url:     "http://127.0.0.1:9".to_string(),
      timeout_secs: 2,
    })
    .unwrap();
    let err = store
      .has_key(&KeyPrefix::subject("c", "s"))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Http(_)));
  }
}
