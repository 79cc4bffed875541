//! Client-side filtering and ordering of canonical orders.
//!
//! Filters are pure and synchronous; the same predicates run against
//! fresh backend data and against the offline cache so both paths behave
//! identically. Each screen picks its date semantics explicitly:
//! [`DateFilter::On`] for the operational day boards,
//! [`DateFilter::Range`] for the financial and report views.

use crate::format::digits_only;
use crate::model::{Category, DeliveryKind, Order};

/// Absent dates/times sort after every real value.
const DATE_SENTINEL: &str = "9999-99-99";
const TIME_SENTINEL: &str = "99:99";

/// Date criterion over the `YYYY-MM-DD` event date, compared as strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    Any,
    /// Exact-day match (kit board, category boards, relation sheet).
    On(String),
    /// Inclusive range (financial dashboard, reports). Unset bounds are
    /// open; an order without an event date fails a `from` bound.
    Range {
        from: Option<String>,
        to: Option<String>,
    },
}

impl DateFilter {
    fn matches(&self, event_date: &str) -> bool {
        match self {
            DateFilter::Any => true,
            DateFilter::On(day) => event_date == day.as_str(),
            DateFilter::Range { from, to } => {
                if let Some(from) = from {
                    if event_date < from.as_str() {
                        return false;
                    }
                }
                if let Some(to) = to {
                    if event_date > to.as_str() {
                        return false;
                    }
                }
                true
            }
        }
    }
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Lowercase, accent-fold and whitespace-collapse a text for matching.
pub fn fold_text(raw: &str) -> String {
    let folded: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .map(strip_accent)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Token-AND containment: every whitespace-separated token of the query
/// must appear somewhere in the folded haystack. An empty query matches
/// everything.
pub fn text_matches(haystack: &str, query: &str) -> bool {
    let query = fold_text(query);
    if query.is_empty() {
        return true;
    }
    let haystack = fold_text(haystack);
    query.split(' ').all(|token| haystack.contains(token))
}

/// Filter criteria shared by every listing screen. Unset fields match
/// everything.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderFilter {
    pub date: DateFilter,
    /// Token-AND over the order name.
    pub name_query: String,
    /// Token-AND over the client name.
    pub client_query: String,
    /// Token-AND over the responsible staff name.
    pub staff_query: String,
    /// Digits-only; matches when the decimal id contains it as a
    /// substring ("23" matches 123 and 230).
    pub number_query: String,
    /// Prefix match over the `HH:MM` event time.
    pub time_prefix: String,
    pub kind: Option<DeliveryKind>,
    /// Exact payment tag, case-insensitive.
    pub payment: Option<String>,
    /// Keep only orders with at least one line in this section.
    pub with_items: Option<Category>,
    pub delivered: Option<bool>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if !self.date.matches(&order.event_date) {
            return false;
        }
        if !text_matches(&order.name, &self.name_query)
            || !text_matches(&order.client, &self.client_query)
            || !text_matches(&order.staff, &self.staff_query)
        {
            return false;
        }
        let number = digits_only(&self.number_query);
        if !number.is_empty() && !order.id.to_string().contains(&number) {
            return false;
        }
        let time_prefix = self.time_prefix.trim();
        if !time_prefix.is_empty() && !order.event_time.starts_with(time_prefix) {
            return false;
        }
        if let Some(kind) = self.kind {
            if order.kind != kind {
                return false;
            }
        }
        if let Some(payment) = &self.payment {
            if !payment.trim().is_empty()
                && !order.payment.eq_ignore_ascii_case(payment.trim())
            {
                return false;
            }
        }
        if let Some(category) = self.with_items {
            if !order.has_items(category) {
                return false;
            }
        }
        if let Some(delivered) = self.delivered {
            if order.delivered != delivered {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, orders: &[Order]) -> Vec<Order> {
        orders.iter().filter(|o| self.matches(o)).cloned().collect()
    }
}

/// Sort keys used by the operational screens. Financial and consolidated
/// views keep insertion order instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Event date, then event time.
    EventDateTime,
    /// Event time only (the day boards are already scoped to one date).
    EventTime,
}

fn date_key(order: &Order) -> (&str, &str) {
    let date = if order.event_date.is_empty() {
        DATE_SENTINEL
    } else {
        &order.event_date
    };
    let time = if order.event_time.is_empty() {
        TIME_SENTINEL
    } else {
        &order.event_time
    };
    (date, time)
}

/// Stable sort: ties keep their relative input order in both directions.
pub fn sort_orders(orders: &mut [Order], key: SortKey, ascending: bool) {
    orders.sort_by(|a, b| {
        let (da, ta) = date_key(a);
        let (db, tb) = date_key(b);
        let ordering = match key {
            SortKey::EventDateTime => (da, ta).cmp(&(db, tb)),
            SortKey::EventTime => ta.cmp(tb),
        };
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}
