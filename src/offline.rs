//! Offline fallback cache.
//!
//! When the backend is unreachable, screens degrade to a locally cached
//! list of previously-submitted orders instead of going empty. The cache
//! is a JSON array of canonical orders under one fixed settings key:
//! appended on explicit submit, filtered with the same predicates as the
//! online path, never reconciled against server state and never consulted
//! while the network path succeeds.

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

use crate::db::{self, DbState};
use crate::filter::OrderFilter;
use crate::model::{Order, OrderDraft};
use crate::orders::OrderClient;

const CACHE_CATEGORY: &str = "offline";
const CACHE_KEY: &str = "submitted_orders_v1";

/// Notice shown when a screen is rendering cached data.
pub const LOCAL_ONLY_NOTICE: &str = "API indisponível. Mostrando dados locais.";

/// Where the data on screen came from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataOrigin {
    Remote,
    /// Backend failure; `error` carries the message for the notice.
    LocalOnly { error: String },
}

/// What happened to a submitted order.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The backend accepted it and (maybe) reported the assigned id.
    Synced(Option<i64>),
    /// Backend down; the order lives in the local cache for now.
    CachedLocally(Order),
}

/// Read the cached order list. Malformed or non-array JSON degrades to an
/// empty list; individual broken entries are skipped rather than poisoning
/// the rest.
pub fn read_cached_orders(db: &DbState) -> Result<Vec<Order>, String> {
    let conn = db.conn.lock().map_err(|e| e.to_string())?;
    let Some(raw) = db::get_setting(&conn, CACHE_CATEGORY, CACHE_KEY) else {
        return Ok(Vec::new());
    };
    let Ok(parsed) = serde_json::from_str::<Value>(&raw) else {
        return Ok(Vec::new());
    };
    let Some(rows) = parsed.as_array() else {
        return Ok(Vec::new());
    };
    Ok(rows
        .iter()
        .filter_map(|row| serde_json::from_value::<Order>(row.clone()).ok())
        .collect())
}

fn write_cached_orders(db: &DbState, orders: &[Order]) -> Result<(), String> {
    let conn = db.conn.lock().map_err(|e| e.to_string())?;
    let text = serde_json::to_string(orders).map_err(|e| format!("serialize cache: {e}"))?;
    db::set_setting(&conn, CACHE_CATEGORY, CACHE_KEY, &text)
}

/// Locally-assigned id for the next cached order: one past the highest
/// positive cached id, 1 on an empty cache.
pub fn next_local_id(orders: &[Order]) -> i64 {
    let max = orders.iter().map(|o| o.id).max().unwrap_or(0);
    if max > 0 {
        max + 1
    } else {
        1
    }
}

/// Append a submitted order to the cache, assigning its local id and
/// timestamps. Returns the cached order.
pub fn append_submitted_order(db: &DbState, draft: OrderDraft) -> Result<Order, String> {
    let mut cached = read_cached_orders(db)?;
    let id = next_local_id(&cached);
    let now = Utc::now().to_rfc3339();
    let order = draft.into_order(id, &now);
    cached.push(order.clone());
    write_cached_orders(db, &cached)?;
    warn!(order_id = id, "backend unavailable, order cached locally");
    Ok(order)
}

/// Fetch filtered order documents, falling back to the cache when the
/// backend call fails. The same filter runs on both paths.
pub async fn load_documents_or_fallback(
    client: &OrderClient,
    db: &DbState,
    filter: &OrderFilter,
) -> (Vec<Order>, DataOrigin) {
    match client.list_documents(filter).await {
        Ok(orders) => (orders, DataOrigin::Remote),
        Err(err) => {
            warn!(error = %err, "document fetch failed, using local cache");
            let cached = read_cached_orders(db).unwrap_or_default();
            (
                filter.apply(&cached),
                DataOrigin::LocalOnly { error: err.to_string() },
            )
        }
    }
}

/// Submit an order document, caching it locally when the backend call
/// fails. The submit is reported exactly once either way.
pub async fn submit_document_or_cache(
    client: &OrderClient,
    db: &DbState,
    draft: &OrderDraft,
) -> Result<SubmitOutcome, String> {
    match client.create_document(draft).await {
        Ok(assigned) => Ok(SubmitOutcome::Synced(assigned)),
        Err(err) => {
            warn!(error = %err, "document submit failed, caching locally");
            let order = append_submitted_order(db, draft.clone())?;
            Ok(SubmitOutcome::CachedLocally(order))
        }
    }
}

/// Next order number to pre-fill on the registration screen: the
/// backend's last id when reachable, else the local cache's.
pub async fn next_order_number(client: &OrderClient, db: &DbState) -> i64 {
    match client.last_document_id().await {
        Ok(last) if last > 0 => last + 1,
        Ok(_) => 1,
        Err(err) => {
            warn!(error = %err, "last-id fetch failed, deriving from local cache");
            let cached = read_cached_orders(db).unwrap_or_default();
            next_local_id(&cached)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn test_db() -> DbState {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA synchronous = NORMAL;",
        )
        .expect("set pragmas");
        db::run_migrations_for_test(&conn);
        DbState {
            conn: std::sync::Mutex::new(conn),
            db_path: std::path::PathBuf::from(":memory:"),
        }
    }

    fn seed_raw_cache(db: &DbState, raw: &str) {
        let conn = db.conn.lock().unwrap();
        db::set_setting(&conn, CACHE_CATEGORY, CACHE_KEY, raw).expect("seed cache");
    }

    #[test]
    fn empty_cache_reads_as_empty_list() {
        let db = test_db();
        assert!(read_cached_orders(&db).unwrap().is_empty());
    }

    #[test]
    fn malformed_cache_degrades_to_empty() {
        let db = test_db();
        seed_raw_cache(&db, "{not json");
        assert!(read_cached_orders(&db).unwrap().is_empty());

        seed_raw_cache(&db, "{\"an\": \"object\"}");
        assert!(read_cached_orders(&db).unwrap().is_empty());

        // broken entries are skipped, healthy ones survive
        seed_raw_cache(&db, "[{\"id\": 1}, \"garbage\", {\"id\": 2}]");
        let orders = read_cached_orders(&db).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].id, 2);
    }

    #[test]
    fn local_ids_count_up_from_the_cache_maximum() {
        assert_eq!(next_local_id(&[]), 1);

        let orders = vec![
            Order { id: 4, ..Order::default() },
            Order { id: 9, ..Order::default() },
        ];
        assert_eq!(next_local_id(&orders), 10);

        // ids that never got assigned do not push the counter negative
        let unassigned = vec![Order::default()];
        assert_eq!(next_local_id(&unassigned), 1);
    }

    #[test]
    fn append_assigns_ids_and_round_trips() {
        let db = test_db();
        let draft = OrderDraft {
            client: "Janine".into(),
            ..OrderDraft::default()
        };

        let first = append_submitted_order(&db, draft.clone()).expect("append");
        assert_eq!(first.id, 1);
        let second = append_submitted_order(&db, draft).expect("append");
        assert_eq!(second.id, 2);

        let cached = read_cached_orders(&db).expect("read");
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].client, "Janine");
        assert!(!cached[0].created_at.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_falls_back_to_filtered_cache() {
        let db = test_db();
        let mut draft = OrderDraft::default();
        draft.client = "Escola Azul".into();
        append_submitted_order(&db, draft.clone()).expect("append");
        draft.client = "Outro Cliente".into();
        append_submitted_order(&db, draft).expect("append");

        // Port 1 is never listening; the request fails without leaving
        // the loopback interface.
        let client = OrderClient::new("http://127.0.0.1:1").expect("client");
        let filter = OrderFilter {
            client_query: "escola".into(),
            ..OrderFilter::default()
        };
        let (orders, origin) = load_documents_or_fallback(&client, &db, &filter).await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].client, "Escola Azul");
        assert!(matches!(origin, DataOrigin::LocalOnly { .. }));
    }

    #[tokio::test]
    async fn failed_submit_is_cached_with_a_local_id() {
        let db = test_db();
        let client = OrderClient::new("http://127.0.0.1:1").expect("client");
        let draft = OrderDraft {
            client: "Janine".into(),
            ..OrderDraft::default()
        };
        let outcome = submit_document_or_cache(&client, &db, &draft).await.expect("submit");
        match outcome {
            SubmitOutcome::CachedLocally(order) => assert_eq!(order.id, 1),
            SubmitOutcome::Synced(_) => panic!("backend cannot be reachable on port 1"),
        }
        assert_eq!(next_order_number(&client, &db).await, 2);
    }
}
