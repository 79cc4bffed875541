//! Derived figures over canonical orders: totals, status predicates,
//! time-series buckets, rankings and revenue summaries.
//!
//! Everything here is pure and total: malformed orders contribute zeros,
//! nothing caches, nothing returns an error. Predicates take the local
//! calendar day and wall-clock as explicit arguments so reports stay
//! reproducible in tests.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::format::parse_ymd;
use crate::model::{Category, DeliveryKind, Order};

/// Label used when a grouping key is blank (unnamed flavor, missing
/// payment tag, order without a client).
pub const UNSPECIFIED: &str = "NÃO INFORMADO";

// ---------------------------------------------------------------------------
// Per-order figures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryTotals {
    pub sweets: f64,
    pub savories: f64,
    pub cakes: f64,
}

impl CategoryTotals {
    pub fn grand_total(&self) -> f64 {
        self.sweets + self.savories + self.cakes
    }
}

/// Sum of quantities in one section. Quantities are already clamped by
/// normalization; non-finite values are skipped anyway so a total can
/// never become NaN.
pub fn category_total(order: &Order, category: Category) -> f64 {
    order
        .items(category)
        .iter()
        .map(|line| if line.quantity.is_finite() { line.quantity.max(0.0) } else { 0.0 })
        .sum()
}

pub fn category_totals(order: &Order) -> CategoryTotals {
    CategoryTotals {
        sweets: category_total(order, Category::Sweets),
        savories: category_total(order, Category::Savories),
        cakes: category_total(order, Category::Cakes),
    }
}

/// An order is fully done iff every non-empty section has its done flag
/// set. Empty sections count as done; an order with no items at all is
/// therefore done regardless of its flags. Recomputed on every call since
/// sections change between renders.
pub fn is_all_done(order: &Order) -> bool {
    Category::ALL
        .iter()
        .all(|&cat| !order.has_items(cat) || order.done(cat))
}

/// Overdue means the event day is already past, or it is today and the
/// event time is behind the current wall-clock. Orders without an event
/// date are never overdue; an unparseable time on today's date does not
/// flag the order.
pub fn is_overdue(order: &Order, today: NaiveDate, now: NaiveTime) -> bool {
    let Some(event_day) = parse_ymd(&order.event_date) else {
        return false;
    };
    if event_day < today {
        return true;
    }
    if event_day > today {
        return false;
    }
    match NaiveTime::parse_from_str(order.event_time.trim(), "%H:%M") {
        Ok(event_time) => event_time < now,
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Time-series buckets
// ---------------------------------------------------------------------------

/// One calendar day in a report range.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRow {
    pub date: String,
    pub total: i64,
    pub delivery: i64,
    pub pickup: i64,
    /// Running count across the range, including this day.
    pub cumulative: i64,
}

/// Every `YYYY-MM-DD` day from `from` to `to` inclusive; empty when either
/// bound is malformed or the range is inverted.
pub fn each_day(from: &str, to: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (parse_ymd(from), parse_ymd(to)) else {
        return Vec::new();
    };
    let mut days = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        days.push(cursor.format("%Y-%m-%d").to_string());
        match cursor.succ_opt() {
            Some(next) => cursor = next,
            None => break,
        }
    }
    days
}

/// Bucket orders by event day over an inclusive range. Days with no
/// orders are zero-filled, never omitted; each row carries the per-day
/// delivery/pickup split and the running cumulative count.
pub fn daily_series(orders: &[Order], from: &str, to: &str) -> Vec<DayRow> {
    let days = each_day(from, to);
    let mut per_day: HashMap<&str, (i64, i64, i64)> = HashMap::new();
    for order in orders {
        if !days.iter().any(|d| d == &order.event_date) {
            continue;
        }
        let bucket = per_day.entry(order.event_date.as_str()).or_insert((0, 0, 0));
        bucket.0 += 1;
        match order.kind {
            DeliveryKind::Delivery => bucket.1 += 1,
            DeliveryKind::Pickup => bucket.2 += 1,
        }
    }

    let mut cumulative = 0;
    days.into_iter()
        .map(|date| {
            let (total, delivery, pickup) = per_day.get(date.as_str()).copied().unwrap_or((0, 0, 0));
            cumulative += total;
            DayRow { date, total, delivery, pickup, cumulative }
        })
        .collect()
}

/// Orders per weekday, Sunday first (index 0). Dates are interpreted via
/// explicit Y/M/D components; unparseable dates are skipped.
pub fn weekday_histogram(orders: &[Order]) -> [i64; 7] {
    let mut counts = [0i64; 7];
    for order in orders {
        if let Some(date) = parse_ymd(&order.event_date) {
            counts[date.weekday().num_days_from_sunday() as usize] += 1;
        }
    }
    counts
}

/// Orders per event hour (0..24); unparseable times are skipped.
pub fn hour_histogram(orders: &[Order]) -> [i64; 24] {
    let mut counts = [0i64; 24];
    for order in orders {
        let hour = order
            .event_time
            .split(':')
            .next()
            .and_then(|h| h.trim().parse::<usize>().ok());
        if let Some(hour) = hour.filter(|h| *h < 24) {
            counts[hour] += 1;
        }
    }
    counts
}

/// Pickup/delivery counts across a list.
pub fn kind_split(orders: &[Order]) -> (i64, i64) {
    let delivery = orders
        .iter()
        .filter(|o| o.kind == DeliveryKind::Delivery)
        .count() as i64;
    (orders.len() as i64 - delivery, delivery)
}

// ---------------------------------------------------------------------------
// Group-by rankings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankEntry {
    pub name: String,
    pub value: f64,
}

/// Accumulate into first-seen order, then stable-sort descending so ties
/// keep their first appearance, then truncate.
fn ranked(entries: Vec<RankEntry>, top_n: usize) -> Vec<RankEntry> {
    let mut entries = entries;
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    entries.truncate(top_n);
    entries
}

fn accumulate(entries: &mut Vec<RankEntry>, index: &mut HashMap<String, usize>, key: String, amount: f64) {
    if !amount.is_finite() {
        return;
    }
    match index.get(&key) {
        Some(&i) => entries[i].value += amount,
        None => {
            index.insert(key.clone(), entries.len());
            entries.push(RankEntry { name: key, value: amount });
        }
    }
}

/// Quantity per flavor across all three sections, top `top_n` (the
/// reports screen shows 10).
pub fn flavor_ranking(orders: &[Order], top_n: usize) -> Vec<RankEntry> {
    let mut entries = Vec::new();
    let mut index = HashMap::new();
    for order in orders {
        for category in Category::ALL {
            for line in order.items(category) {
                let key = if line.flavor.is_empty() {
                    UNSPECIFIED.to_string()
                } else {
                    line.flavor.clone()
                };
                accumulate(&mut entries, &mut index, key, line.quantity.max(0.0));
            }
        }
    }
    ranked(entries, top_n)
}

/// Billed revenue per client, top `top_n` (the financial screen shows 8).
/// Orders without a price contribute zero, matching the screen they feed.
pub fn client_revenue_ranking(orders: &[Order], top_n: usize) -> Vec<RankEntry> {
    let mut entries = Vec::new();
    let mut index = HashMap::new();
    for order in orders {
        let key = if order.client.is_empty() {
            UNSPECIFIED.to_string()
        } else {
            order.client.clone()
        };
        accumulate(&mut entries, &mut index, key, order.price.unwrap_or(0.0));
    }
    ranked(entries, top_n)
}

/// Order count per payment tag, descending, unset tags bucketed under
/// [`UNSPECIFIED`]. Not truncated; the tag vocabulary is small.
pub fn payment_breakdown(orders: &[Order]) -> Vec<RankEntry> {
    let mut entries = Vec::new();
    let mut index = HashMap::new();
    for order in orders {
        let key = if order.payment.is_empty() {
            UNSPECIFIED.to_string()
        } else {
            order.payment.clone()
        };
        accumulate(&mut entries, &mut index, key, 1.0);
    }
    ranked(entries, usize::MAX)
}

// ---------------------------------------------------------------------------
// Revenue
// ---------------------------------------------------------------------------

/// Caller-supplied unit prices used to estimate revenue for orders that
/// carry no explicit price.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UnitPrices {
    pub sweets: f64,
    pub savories: f64,
    pub cakes: f64,
}

/// Real and estimated revenue are mutually exclusive per order and must
/// never be blended into one undisclosed number.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    /// Sum of explicit, finite order prices.
    pub real: f64,
    /// `Σ(category quantity × unit price)` for orders without a price.
    pub estimated: f64,
    pub real_orders: i64,
    pub estimated_orders: i64,
}

pub fn revenue_summary(orders: &[Order], unit_prices: UnitPrices) -> RevenueSummary {
    let mut summary = RevenueSummary::default();
    for order in orders {
        match order.price.filter(|p| p.is_finite()) {
            Some(price) => {
                summary.real += price;
                summary.real_orders += 1;
            }
            None => {
                let totals = category_totals(order);
                summary.estimated += totals.sweets * unit_prices.sweets
                    + totals.savories * unit_prices.savories
                    + totals.cakes * unit_prices.cakes;
                summary.estimated_orders += 1;
            }
        }
    }
    summary
}

/// Headline figures for the financial dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub billed_total: f64,
    pub fees_total: f64,
    pub order_count: i64,
    pub average_ticket: f64,
    pub delivered: i64,
    pub pending: i64,
    pub pickups: i64,
}

pub fn financial_summary(orders: &[Order]) -> FinancialSummary {
    let mut summary = FinancialSummary::default();
    for order in orders {
        summary.billed_total += order.price.unwrap_or(0.0);
        summary.fees_total += order.delivery_fee.unwrap_or(0.0);
        summary.order_count += 1;
        if order.delivered {
            summary.delivered += 1;
        } else {
            summary.pending += 1;
        }
        if order.kind == DeliveryKind::Pickup {
            summary.pickups += 1;
        }
    }
    if summary.order_count > 0 {
        summary.average_ticket = summary.billed_total / summary.order_count as f64;
    }
    summary
}

// ---------------------------------------------------------------------------
// Delivered-orders collaborator
// ---------------------------------------------------------------------------

/// Source of delivered orders for the report screens. The backend client
/// implements this; tests inject fixtures. Replaces the original's habit
/// of reaching into ambient global state for the delivered listing.
#[allow(async_fn_in_trait)]
pub trait DeliveredSource {
    async fn list_delivered(&self, from: &str, to: &str) -> Result<Vec<Order>, crate::api::ApiError>;
}
