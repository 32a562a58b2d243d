//! REST client for hosted realtime databases exposing the
//! `<base>/<path>.json` dialect (GET/PUT/PATCH/DELETE).
//!
//! The hosted service pushes changes to its own SDK clients; over plain
//! REST this client falls back to polling at a configurable interval for
//! `subscribe`, which is torn down through the returned guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use super::db::{OnChange, RealtimeDb, Subscription};
use crate::error::RoomError;

const POLL_SLICE: Duration = Duration::from_millis(100);

pub struct HttpRealtimeDb {
    base: Url,
    http: reqwest::Client,
    rt: tokio::runtime::Runtime,
    poll_interval: Duration,
}

impl HttpRealtimeDb {
    /// # Errors
    /// Returns an error if the base URL does not parse or the runtime
    /// cannot be created.
    pub fn new(base_url: &str, poll_interval: Duration) -> Result<Self, RoomError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| RoomError::Backend(e.to_string()))?;
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RoomError::Backend(e.to_string()))?;
        Ok(Self {
            base,
            http: reqwest::Client::new(),
            rt,
            poll_interval,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RoomError> {
        self.base
            .join(&format!("{path}.json"))
            .map_err(|e| RoomError::Backend(e.to_string()))
    }
}

impl RealtimeDb for HttpRealtimeDb {
    fn read(&self, path: &str) -> Result<Option<Value>, RoomError> {
        let url = self.endpoint(path)?;
        let value: Value = self.rt.block_on(async {
            self.http
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await
        })?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    fn write(&self, path: &str, doc: &Value) -> Result<(), RoomError> {
        let url = self.endpoint(path)?;
        self.rt.block_on(async {
            self.http
                .put(url)
                .json(doc)
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, reqwest::Error>(())
        })?;
        Ok(())
    }

    fn update(&self, path: &str, fields: &Value) -> Result<(), RoomError> {
        let url = self.endpoint(path)?;
        self.rt.block_on(async {
            self.http
                .patch(url)
                .json(fields)
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, reqwest::Error>(())
        })?;
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), RoomError> {
        let url = self.endpoint(path)?;
        self.rt.block_on(async {
            self.http
                .delete(url)
                .send()
                .await?
                .error_for_status()?;
            Ok::<_, reqwest::Error>(())
        })?;
        Ok(())
    }

    fn subscribe(&self, path: &str, on_change: OnChange) -> Result<Subscription, RoomError> {
        let url = self.endpoint(path)?;
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let poll_interval = self.poll_interval;

        let handle = std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::warn!(error = %e, "room watch thread failed to start");
                    return;
                }
            };
            let http = reqwest::Client::new();
            let mut last: Option<Option<Value>> = None;

            while !stop_flag.load(Ordering::Relaxed) {
                let fetched = rt.block_on(async {
                    http.get(url.clone())
                        .send()
                        .await?
                        .error_for_status()?
                        .json::<Value>()
                        .await
                });
                match fetched {
                    Ok(value) => {
                        let current = if value.is_null() { None } else { Some(value) };
                        if last.as_ref() != Some(&current) {
                            on_change(current.clone());
                            last = Some(current);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "room watch poll failed");
                    }
                }

                // Sleep in short slices so teardown stays prompt.
                let mut waited = Duration::ZERO;
                while waited < poll_interval && !stop_flag.load(Ordering::Relaxed) {
                    std::thread::sleep(POLL_SLICE.min(poll_interval - waited));
                    waited += POLL_SLICE;
                }
            }
        });

        Ok(Subscription::new(move || {
            stop.store(true, Ordering::Relaxed);
            let _ = handle.join();
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(server: &mockito::Server) -> HttpRealtimeDb {
        HttpRealtimeDb::new(&server.url(), Duration::from_millis(200)).unwrap()
    }

    #[test]
    fn read_absent_document_is_none() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/rooms/ABC123.json")
            .with_status(200)
            .with_body("null")
            .create();

        let db = client(&server);
        assert!(db.read("rooms/ABC123").unwrap().is_none());
        mock.assert();
    }

    #[test]
    fn read_parses_document() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rooms/ABC123.json")
            .with_status(200)
            .with_body(r#"{"code":"ABC123","totalStudyTime":7}"#)
            .create();

        let db = client(&server);
        let doc = db.read("rooms/ABC123").unwrap().unwrap();
        assert_eq!(doc["code"], "ABC123");
        assert_eq!(doc["totalStudyTime"], 7);
    }

    #[test]
    fn write_puts_full_document() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/rooms/ABC123.json")
            .match_body(mockito::Matcher::Json(json!({"code": "ABC123"})))
            .with_status(200)
            .with_body("{}")
            .create();

        let db = client(&server);
        db.write("rooms/ABC123", &json!({"code": "ABC123"})).unwrap();
        mock.assert();
    }

    #[test]
    fn update_patches_fields() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PATCH", "/rooms/ABC123.json")
            .match_body(mockito::Matcher::Json(json!({"totalStudyTime": 9})))
            .with_status(200)
            .with_body("{}")
            .create();

        let db = client(&server);
        db.update("rooms/ABC123", &json!({"totalStudyTime": 9}))
            .unwrap();
        mock.assert();
    }

    #[test]
    fn delete_issues_delete() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", "/rooms/ABC123.json")
            .with_status(200)
            .with_body("null")
            .create();

        let db = client(&server);
        db.delete("rooms/ABC123").unwrap();
        mock.assert();
    }

    #[test]
    fn server_error_surfaces_as_backend_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rooms/ABC123.json")
            .with_status(500)
            .create();

        let db = client(&server);
        assert!(matches!(
            db.read("rooms/ABC123"),
            Err(RoomError::Backend(_))
        ));
    }
}
