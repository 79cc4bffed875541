//! Printable listing projections.
//!
//! Derived, read-only rows for the consolidated view (one row per order
//! and item line) and the relation sheet (one row per order with
//! per-category totals). Never persisted; recomputed on every filter
//! change. CSV export matches what the report screen downloads.

use crate::analytics::category_totals;
use crate::format::{format_brl, format_quantity, month_label};
use crate::model::{Category, Order};

/// One item line of the consolidated table.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedRow {
    pub order_number: String,
    /// `MM/YYYY` of the event date.
    pub month: String,
    /// Event date as stored (`YYYY-MM-DD`); display formatting is the
    /// renderer's business.
    pub date: String,
    pub client: String,
    pub staff: String,
    pub kind: String,
    pub time: String,
    pub category: &'static str,
    pub description: String,
    pub quantity: String,
    pub unit: String,
}

/// Flatten orders into one row per (order × item line), in input order.
pub fn consolidated_rows(orders: &[Order]) -> Vec<ConsolidatedRow> {
    let mut rows = Vec::new();
    for order in orders {
        let number = order_number(order);
        let month = month_label(&order.event_date);
        for category in Category::ALL {
            for line in order.items(category) {
                rows.push(ConsolidatedRow {
                    order_number: number.clone(),
                    month: month.clone(),
                    date: order.event_date.clone(),
                    client: order.client.clone(),
                    staff: order.staff.clone(),
                    kind: order.kind.label().to_string(),
                    time: order.event_time.clone(),
                    category: category.label(),
                    description: line.flavor.clone(),
                    quantity: format_quantity(line.quantity),
                    unit: line.unit.clone(),
                });
            }
        }
    }
    rows
}

/// One order of the relation sheet.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRow {
    pub order_number: String,
    pub date: String,
    pub phone: String,
    pub client: String,
    pub time: String,
    /// BRL display string; empty when the order has no price.
    pub price: String,
    pub reseller: String,
    pub payment: String,
    pub kind: String,
    pub sweets_total: f64,
    pub savories_total: f64,
    pub cakes_total: f64,
}

/// One row per order with the per-category quantity totals the kitchen
/// plans around.
pub fn relation_rows(orders: &[Order]) -> Vec<RelationRow> {
    orders
        .iter()
        .map(|order| {
            let totals = category_totals(order);
            RelationRow {
                order_number: order_number(order),
                date: order.event_date.clone(),
                phone: order.phone.clone(),
                client: order.client.clone(),
                time: order.event_time.clone(),
                price: order.price.map(format_brl).unwrap_or_default(),
                reseller: order.reseller.clone(),
                payment: order.payment.clone(),
                kind: order.kind.label().to_string(),
                sweets_total: totals.sweets,
                savories_total: totals.savories,
                cakes_total: totals.cakes,
            }
        })
        .collect()
}

fn order_number(order: &Order) -> String {
    if order.id > 0 {
        order.id.to_string()
    } else {
        String::new()
    }
}

/// Minimal CSV: header row plus one line per row, quoting only fields
/// that contain commas, quotes or newlines. Empty input yields an empty
/// string, not a lonely header.
pub fn to_csv(header: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    let escape = |field: &str| -> String {
        if field.contains([',', '"', '\n']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    };
    let mut out = header.join(",");
    for row in rows {
        out.push('\n');
        out.push_str(
            &row.iter()
                .map(|field| escape(field))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    out
}

/// The per-day summary CSV offered on the reports screen.
pub fn daily_series_csv(rows: &[crate::analytics::DayRow]) -> String {
    to_csv(
        &["data", "total", "retirada", "entrega", "acumulado"],
        &rows
            .iter()
            .map(|row| {
                vec![
                    row.date.clone(),
                    row.total.to_string(),
                    row.pickup.to_string(),
                    row.delivery.to_string(),
                    row.cumulative.to_string(),
                ]
            })
            .collect::<Vec<_>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::daily_series;
    use crate::model::{DeliveryKind, ItemLine};

    fn sample_order() -> Order {
        Order {
            id: 12,
            client: "Escola Azul".into(),
            staff: "Ana".into(),
            phone: "11999990000".into(),
            event_date: "2026-08-07".into(),
            event_time: "09:00".into(),
            kind: DeliveryKind::Delivery,
            price: Some(1234.56),
            payment: "PIX".into(),
            sweets: vec![
                ItemLine { flavor: "Beijinho".into(), quantity: 100.0, unit: "UN".into(), ..ItemLine::default() },
                ItemLine { flavor: "Brigadeiro".into(), quantity: 50.0, unit: "UN".into(), ..ItemLine::default() },
            ],
            cakes: vec![ItemLine { flavor: "Floresta Negra".into(), quantity: 1.5, unit: "KG".into(), ..ItemLine::default() }],
            ..Order::default()
        }
    }

    #[test]
    fn consolidated_flattens_one_row_per_item_line() {
        let rows = consolidated_rows(&[sample_order()]);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].order_number, "12");
        assert_eq!(rows[0].month, "08/2026");
        assert_eq!(rows[0].category, "DOCES");
        assert_eq!(rows[0].quantity, "100");
        assert_eq!(rows[2].category, "BOLOS");
        assert_eq!(rows[2].quantity, "1,5");
        assert_eq!(rows[2].unit, "KG");

        assert!(consolidated_rows(&[Order::default()]).is_empty());
    }

    #[test]
    fn relation_rows_carry_category_totals_and_display_price() {
        let rows = relation_rows(&[sample_order()]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sweets_total, 150.0);
        assert_eq!(rows[0].cakes_total, 1.5);
        assert_eq!(rows[0].savories_total, 0.0);
        assert_eq!(rows[0].price, "R$ 1.234,56");
        assert_eq!(rows[0].kind, "ENTREGA");

        let unpriced = relation_rows(&[Order::default()]);
        assert_eq!(unpriced[0].price, "");
        assert_eq!(unpriced[0].order_number, "");
    }

    #[test]
    fn csv_escapes_only_what_needs_escaping() {
        let rows = vec![
            vec!["2026-08-07".to_string(), "a,b".to_string(), "say \"hi\"".to_string()],
        ];
        let csv = to_csv(&["data", "x", "y"], &rows);
        assert_eq!(csv, "data,x,y\n2026-08-07,\"a,b\",\"say \"\"hi\"\"\"");

        assert_eq!(to_csv(&["a"], &[]), "");
    }

    #[test]
    fn daily_series_csv_matches_the_report_columns() {
        let orders = vec![sample_order()];
        let series = daily_series(&orders, "2026-08-07", "2026-08-08");
        let csv = daily_series_csv(&series);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("data,total,retirada,entrega,acumulado"));
        assert_eq!(lines.next(), Some("2026-08-07,1,0,1,1"));
        assert_eq!(lines.next(), Some("2026-08-08,0,0,0,1"));
    }
}
