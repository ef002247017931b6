//! Shared fakes for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::storage::SecureStore;
use bridge_traits::time::Clock;
use chrono::{DateTime, Utc};
use core_library::{Track, TrackModel};
use std::collections::HashMap;
use std::sync::Mutex;

enum Route {
    Respond(u16, String),
    Fail,
}

/// HTTP client answering from a route table
///
/// The first route whose pattern is a substring of the request URL answers;
/// unmatched requests get an empty 404. Every request is recorded.
#[derive(Default)]
pub struct RoutingHttpClient {
    routes: Vec<(String, Route)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RoutingHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, pattern: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes
            .push((pattern.to_string(), Route::Respond(status, body.into())));
        self
    }

    /// Requests matching `pattern` fail at the transport level
    pub fn fail(mut self, pattern: &str) -> Self {
        self.routes.push((pattern.to_string(), Route::Fail));
        self
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.requested_urls()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

#[async_trait]
impl HttpClient for RoutingHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        match self.routes.iter().find(|(pattern, _)| url.contains(pattern.as_str())) {
            Some((_, Route::Respond(status, body))) => Ok(HttpResponse::new(*status, body.clone())),
            Some((_, Route::Fail)) => Err(BridgeError::OperationFailed(format!(
                "connection refused: {}",
                url
            ))),
            None => Ok(HttpResponse::new(404, "")),
        }
    }
}

/// Secure store kept in memory
#[derive(Default)]
pub struct MemorySecureStore {
    secrets: tokio::sync::Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.secrets
            .lock()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.secrets.lock().await.get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        self.secrets.lock().await.remove(key);
        Ok(())
    }
}

/// Clock stopped at a fixed Unix time
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap()
    }
}

pub fn track(id: i64, artist: &str, title: &str, duration_ms: i64) -> TrackModel {
    TrackModel::new(Track {
        title: Some(title.to_string()),
        artists: Some(format!(";{};", artist)),
        album_title: Some("Dummy".to_string()),
        duration_ms,
        ..Track::new(id, format!("/music/{}.mp3", id))
    })
}
