//! Server-side session store.
//!
//! An explicit TTL-backed key-value store keyed by an opaque cookie value,
//! injected through `AuthState` rather than living in a global. The login
//! route binds the caller's current session-key record id here so later
//! requests (home, web-view) can recover it without the bearer token.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use dashmap::DashMap;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub(crate) const SESSION_COOKIE_NAME: &str = "weapp.sess";

const SESSION_ID_LEN: usize = 32;
// Expired entries are swept opportunistically every N writes so abandoned
// sessions do not accumulate.
const SWEEP_EVERY: u64 = 100;

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    /// Reference to the caller's current session-key record.
    pub session_key_record_id: Option<i64>,
    /// Web-view page hit counter.
    pub view_count: u64,
}

struct Entry {
    data: SessionData,
    expires_at: Instant,
}

pub struct SessionStore {
    entries: DashMap<String, Entry>,
    ttl: Duration,
    writes: AtomicU64,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            writes: AtomicU64::new(0),
        }
    }

    /// Read a session, treating an expired entry as absent.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<SessionData> {
        let expired = match self.entries.get(session_id) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.data.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(session_id);
        }
        None
    }

    /// Mutate (creating if absent) a session and refresh its expiry.
    pub fn update<F>(&self, session_id: &str, mutate: F) -> SessionData
    where
        F: FnOnce(&mut SessionData),
    {
        let now = Instant::now();
        let data = {
            let mut entry = self
                .entries
                .entry(session_id.to_string())
                .or_insert_with(|| Entry {
                    data: SessionData::default(),
                    expires_at: now + self.ttl,
                });
            if entry.expires_at <= now {
                entry.data = SessionData::default();
            }
            mutate(&mut entry.data);
            entry.expires_at = now + self.ttl;
            entry.data.clone()
        };

        let writes = self.writes.fetch_add(1, Ordering::Relaxed);
        if writes % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.entries.retain(|_, entry| entry.expires_at > now);
        }

        data
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the caller's session id, minting a fresh one when no cookie was
/// sent. The bool reports whether a cookie still needs to be set.
pub(crate) fn client_session(headers: &HeaderMap) -> (String, bool) {
    match session_id_from_headers(headers) {
        Some(id) => (id, false),
        None => (new_session_id(), true),
    }
}

pub(crate) fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

pub(crate) fn new_session_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Build the session cookie. `HttpOnly` because nothing client-side needs to
/// read the session id.
pub(crate) fn build_cookie(
    session_id: &str,
    ttl_seconds: u64,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE_NAME}={session_id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_creates_and_get_reads_back() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.update("sid-1", |data| data.session_key_record_id = Some(7));

        let data = store.get("sid-1").expect("session exists");
        assert_eq!(data.session_key_record_id, Some(7));
        assert_eq!(data.view_count, 0);
    }

    #[test]
    fn view_counter_increments_per_update() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.update("sid-1", |data| data.view_count += 1);
        let data = store.update("sid-1", |data| data.view_count += 1);
        assert_eq!(data.view_count, 2);
    }

    #[test]
    fn expired_entries_read_as_absent() {
        let store = SessionStore::new(Duration::from_secs(0));
        store.update("sid-1", |data| data.view_count += 1);
        assert!(store.get("sid-1").is_none());
    }

    #[test]
    fn expired_entry_resets_on_next_write() {
        let store = SessionStore::new(Duration::from_secs(0));
        store.update("sid-1", |data| data.session_key_record_id = Some(7));
        let data = store.update("sid-1", |data| data.view_count += 1);
        // The stale record binding is gone; only the new write survives.
        assert_eq!(data.session_key_record_id, None);
        assert_eq!(data.view_count, 1);
    }

    #[test]
    fn session_id_parses_out_of_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("other=1; weapp.sess=abc123; x=y"),
        );
        assert_eq!(session_id_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_cookie_mints_a_new_session() {
        let headers = HeaderMap::new();
        let (id, is_new) = client_session(&headers);
        assert!(is_new);
        assert_eq!(id.len(), SESSION_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn cookie_carries_ttl_and_http_only() {
        let cookie = build_cookie("abc123", 86_400).expect("valid cookie");
        let cookie = cookie.to_str().expect("ascii cookie");
        assert!(cookie.contains("weapp.sess=abc123"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));
    }
}
