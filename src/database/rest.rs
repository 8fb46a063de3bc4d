//! Realtime Database REST backend
//!
//! # REST Reference
//! - `PUT {url}/{path}.json` - replace the value at a location
//! - `GET {url}/{path}.json` - read a location; `null` when nothing is stored
//! - `?access_token=` - OAuth2 credential for admin access

use super::backend::{DatabaseBackend, PendingWrite, ValueCallback};
use super::path::DatabasePath;
use super::snapshot::{DataSnapshot, ValueEvent};
use crate::error::DatabaseError;
use reqwest::Url;
use serde_json::Value;

/// [`DatabaseBackend`] over the Realtime Database REST API
#[derive(Clone)]
pub struct RestBackend {
    base_url: String,
    access_token: Option<String>,
    http_client: reqwest::Client,
}

impl RestBackend {
    /// Create a backend for the database at `base_url`
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            access_token,
            http_client,
        }
    }

    fn url_for(&self, path: &DatabasePath) -> Result<Url, DatabaseError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DatabaseError::InvalidPath(format!("{}: {}", self.base_url, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DatabaseError::InvalidPath(self.base_url.clone()))?;
            segments.pop_if_empty();
            match path.segments().split_last() {
                None => {
                    segments.push(".json");
                }
                Some((last, parents)) => {
                    segments.extend(parents);
                    segments.push(&format!("{}.json", last));
                }
            }
        }
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        Ok(url)
    }
}

async fn error_from_response(response: reqwest::Response) -> DatabaseError {
    let status = response.status().as_u16();
    let body: Value = response.json().await.unwrap_or_default();
    let message = body["error"].as_str().unwrap_or("unknown error");
    DatabaseError::from_status(status, message)
}

fn transport_error(error: reqwest::Error) -> DatabaseError {
    DatabaseError::Disconnected(error.to_string())
}

impl DatabaseBackend for RestBackend {
    fn set(&self, path: &DatabasePath, value: Value) -> PendingWrite {
        let url = match self.url_for(path) {
            Ok(url) => url,
            Err(e) => return PendingWrite::ready(Err(e)),
        };
        let (ack, pending) = PendingWrite::channel();
        let client = self.http_client.clone();
        let path = path.clone();

        tokio::spawn(async move {
            let result = match client.put(url).json(&value).send().await {
                Err(e) => Err(transport_error(e)),
                Ok(response) if !response.status().is_success() => {
                    Err(error_from_response(response).await)
                }
                Ok(_) => Ok(()),
            };
            if let Err(error) = &result {
                tracing::warn!(%path, %error, "database write failed");
            }
            ack.complete(result);
        });

        pending
    }

    fn read_once(&self, path: &DatabasePath, callback: ValueCallback) {
        let url = match self.url_for(path) {
            Ok(url) => url,
            Err(e) => return callback(ValueEvent::Cancelled(e)),
        };
        let client = self.http_client.clone();
        let path = path.clone();

        tokio::spawn(async move {
            let event = match client.get(url).send().await {
                Err(e) => ValueEvent::Cancelled(transport_error(e)),
                Ok(response) if !response.status().is_success() => {
                    ValueEvent::Cancelled(error_from_response(response).await)
                }
                Ok(response) => match response.json::<Value>().await {
                    Ok(value) => ValueEvent::Data(DataSnapshot::new(path.clone(), value)),
                    Err(e) => ValueEvent::Cancelled(DatabaseError::Other(e.to_string())),
                },
            };
            if let ValueEvent::Cancelled(error) = &event {
                tracing::warn!(%path, %error, "database read cancelled");
            }
            callback(event);
        });
    }
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::single_value::single_value_gate;

    fn backend(url: &str, token: Option<&str>) -> RestBackend {
        RestBackend::new(url, token.map(str::to_string), reqwest::Client::new())
    }

    #[test]
    fn test_url_for_nested_path() {
        let rest = backend("https://demo-default-rtdb.firebaseio.com", None);
        let url = rest.url_for(&DatabasePath::parse("users/abc").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://demo-default-rtdb.firebaseio.com/users/abc.json");
    }

    #[test]
    fn test_url_for_root_with_trailing_slash() {
        let rest = backend("https://demo-default-rtdb.firebaseio.com/", None);
        let url = rest.url_for(&DatabasePath::root()).unwrap();
        assert_eq!(url.as_str(), "https://demo-default-rtdb.firebaseio.com/.json");
    }

    #[test]
    fn test_url_for_appends_access_token() {
        let rest = backend("https://demo-default-rtdb.firebaseio.com", Some("tok"));
        let url = rest.url_for(&DatabasePath::parse("users/abc").unwrap()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo-default-rtdb.firebaseio.com/users/abc.json?access_token=tok"
        );
    }

    #[test]
    fn test_url_for_escapes_segments() {
        let rest = backend("https://demo-default-rtdb.firebaseio.com", None);
        let url = rest.url_for(&DatabasePath::parse("users/a b").unwrap()).unwrap();
        assert_eq!(url.as_str(), "https://demo-default-rtdb.firebaseio.com/users/a%20b.json");
    }

    #[test]
    fn test_debug_redacts_token() {
        let rest = backend("https://demo-default-rtdb.firebaseio.com", Some("secret-token"));
        assert!(!format!("{:?}", rest).contains("secret-token"));
    }

    #[tokio::test]
    async fn test_bad_base_url_cancels_read() {
        let rest = backend("not a url", None);
        let (callback, gate) = single_value_gate();
        rest.read_once(&DatabasePath::root(), callback);

        let event = gate.wait(None).await.unwrap();
        assert!(matches!(event, ValueEvent::Cancelled(DatabaseError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_cancels_read() {
        let rest = backend("http://127.0.0.1:9", None);
        let (callback, gate) = single_value_gate();
        rest.read_once(&DatabasePath::parse("users/a").unwrap(), callback);

        let event = gate.wait(None).await.unwrap();
        assert!(matches!(event, ValueEvent::Cancelled(DatabaseError::Disconnected(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_acknowledged_write() {
        let rest = backend("http://127.0.0.1:9", None);
        let result = rest
            .set(&DatabasePath::parse("users/a").unwrap(), serde_json::json!({ "name": "A" }))
            .await;
        assert!(matches!(result, Err(DatabaseError::Disconnected(_))));
    }
}
