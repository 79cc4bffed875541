//! Kit Desk - order management core for a catering kitchen.
//!
//! The backend REST API is the source of truth; this crate is everything
//! the screens share on top of it: the typed client (`orders`, `auth`),
//! the normalization layer that folds the backend's two order dialects
//! into one canonical model (`normalize`, `model`), pure filtering and
//! aggregation (`filter`, `analytics`), printable projections
//! (`listing`, `format`), per-screen fetch supersession (`fetch`), and
//! the best-effort offline cache (`db`, `offline`).
//!
//! Data flow: fetch raw JSON -> `normalize` -> `filter` -> `analytics` /
//! `listing` -> render. On network failure the offline cache feeds the
//! same filter and aggregation path, tagged local-only.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod analytics;
pub mod api;
pub mod auth;
pub mod db;
pub mod fetch;
pub mod filter;
pub mod format;
pub mod listing;
pub mod model;
pub mod normalize;
pub mod offline;
pub mod orders;
pub mod validate;

/// First non-empty string under any of `keys`, trimmed.
pub(crate) fn value_str(v: &serde_json::Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = v.get(*key).and_then(|x| x.as_str()) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// First integer under any of `keys`; numeric strings count too, since
/// ids show up string-typed on some payloads.
pub(crate) fn value_i64(v: &serde_json::Value, keys: &[&str]) -> Option<i64> {
    for key in keys {
        if let Some(field) = v.get(*key) {
            if let Some(n) = field.as_i64() {
                return Some(n);
            }
            if let Some(n) = field.as_str().and_then(|s| s.trim().parse().ok()) {
                return Some(n);
            }
        }
    }
    None
}

/// Initialize structured logging: console always, plus a daily-rolling
/// file when `log_dir` is given. Safe to call more than once; only the
/// first call installs the subscriber.
pub fn init_logging(log_dir: Option<&std::path::Path>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,kit_desk=debug"));

    let console_layer = fmt::layer().with_target(true);
    let registry = tracing_subscriber::registry().with(env_filter).with(console_layer);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok();
            let file_appender = tracing_appender::rolling::daily(dir, "kitdesk");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            if registry.with(file_layer).try_init().is_ok() {
                // Keep the guard alive for the process lifetime; dropping
                // it would flush and close the file writer.
                std::mem::forget(guard);
            }
        }
        None => {
            let _ = registry.try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_str_skips_blank_and_missing_keys() {
        let v = json!({ "a": "  ", "b": " ok ", "c": 3 });
        assert_eq!(value_str(&v, &["a", "b"]).as_deref(), Some("ok"));
        assert_eq!(value_str(&v, &["a", "c"]), None);
        assert_eq!(value_str(&v, &["missing"]), None);
    }

    #[test]
    fn value_i64_accepts_numeric_strings() {
        let v = json!({ "id": 7, "pedidoId": "42", "bad": "x" });
        assert_eq!(value_i64(&v, &["id"]), Some(7));
        assert_eq!(value_i64(&v, &["pedidoId"]), Some(42));
        assert_eq!(value_i64(&v, &["bad", "id"]), Some(7));
        assert_eq!(value_i64(&v, &["missing"]), None);
    }
}
