//! Document cookie store and cookie-string scanning.
//!
//! `CookieJar` stands in for the page's cookie string: the CSRF token is read
//! from it when a request is issued, and `Set-Cookie` headers on responses are
//! written back into it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Scan a `name=value; name=value` string for `name` and return its value.
///
/// Pairs are split on `;` with leading spaces trimmed; the name must match
/// exactly. The first match wins.
pub fn read_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|pair| {
        let pair = pair.trim_start_matches(' ');
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

/// Shared, cloneable cookie store. Clones see the same cookies.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Arc<Mutex<Vec<(String, String)>>>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a jar from a `name=value; …` string.
    pub fn from_cookie_string(cookies: &str) -> Self {
        let jar = Self::new();
        for pair in cookies.split(';') {
            if let Some((name, value)) = pair.trim_start_matches(' ').split_once('=') {
                jar.set(name, value);
            }
        }
        jar
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, String)>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `name=value`, replacing any earlier value. Names must be
    /// non-empty without `=`, `;` or whitespace, and values must not contain
    /// `;`, otherwise the pair would split differently when read back.
    /// Returns whether the cookie was stored.
    pub fn set(&self, name: &str, value: &str) -> bool {
        let bad_name = name.is_empty()
            || name.contains(|c: char| c == '=' || c == ';' || c.is_whitespace());
        if bad_name || value.contains(';') {
            tracing::warn!(cookie = name, "refusing cookie that cannot round-trip");
            return false;
        }
        let mut cookies = self.lock();
        match cookies.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => cookies.push((name.to_string(), value.to_string())),
        }
        true
    }

    pub fn remove(&self, name: &str) {
        self.lock().retain(|(k, _)| k != name);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        read_cookie(&self.cookie_string(), name)
    }

    /// The jar rendered the way a page exposes its cookies.
    pub fn cookie_string(&self) -> String {
        self.lock()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Store the cookie carried by a `Set-Cookie` header value. Attributes
    /// after the first `;` are ignored.
    pub fn store_set_cookie(&self, header: &str) {
        let pair = header.split(';').next().unwrap_or_default().trim();
        match pair.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                tracing::debug!(cookie = name, "storing cookie from response");
                self.set(name, value);
            }
            _ => tracing::warn!("ignoring malformed Set-Cookie header"),
        }
    }
}
