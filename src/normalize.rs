//! Normalization of raw backend payloads into canonical orders.
//!
//! The backend speaks two dialects for the same order entity, and this
//! module is the compatibility shim that folds both (plus our own canonical
//! serialization, which the offline cache stores) into [`Order`]:
//!
//! | wire key (kit)   | wire key (pedido form)        | canonical      |
//! |------------------|-------------------------------|----------------|
//! | `nome`           | —                             | `name`         |
//! | `cliente`        | `cliente`                     | `client`       |
//! | —                | `responsavel`                 | `staff`        |
//! | —                | `revendedor`                  | `reseller`     |
//! | `dataEvento`     | `data`                        | `eventDate`    |
//! | `hora`           | `horario`                     | `eventTime`    |
//! | `tipo`           | `retirada`                    | `kind`         |
//! | `endereco`       | `enderecoEntrega`/`endereco_entrega` | `address` |
//! | `preco`          | `precoTotal`/`preco_total`    | `price`        |
//! | —                | `taxaEntrega`/`taxa_entrega`  | `deliveryFee`  |
//! | —                | `tipoPagamento`/`tipo_pagamento` | `payment`   |
//! | `statusDoces` …  | —                             | `sweetsDone` … |
//! | `sabor`          | `descricao`                   | item `flavor`  |
//!
//! Every function here is pure, total and panic-free: missing strings
//! default to empty, missing prices to `None`, missing flags to `false`,
//! malformed item lists to empty vectors.

use serde_json::Value;

use crate::model::{CategoryComments, DeliveryKind, ItemLine, Order};
use crate::{value_i64, value_str};

/// Parse a money amount that may arrive as a JSON number, a plain decimal
/// string from a DECIMAL column ("12.50"), or a BRL display string
/// ("R$ 1.234,56", dot thousands and comma decimal). Strings that parse as
/// plain floats are taken at face value; otherwise non-numeric characters
/// are stripped, dots dropped as thousands separators and the comma used
/// as the decimal point. Unparseable values yield `None`, never an error.
pub fn parse_money(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_money_str(s),
        _ => None,
    }
}

fn parse_money_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return n.is_finite().then_some(n);
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if cleaned.chars().all(|c| !c.is_ascii_digit()) {
        return None;
    }
    let n = cleaned.replace('.', "").replace(',', ".").parse::<f64>().ok()?;
    n.is_finite().then_some(n)
}

/// Boolean-like flag: real booleans, `0`/`1` integers (the kit resource
/// stores TINYINT flags) or `"true"`/`"1"` strings.
pub fn parse_flag(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "1" | "true"),
        _ => false,
    }
}

/// Item quantity: number or string, comma decimals accepted ("1,5" kg
/// cakes). Non-numeric input counts as zero and negatives are clamped so
/// NaN never reaches a total.
pub fn parse_quantity(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() {
        n.max(0.0)
    } else {
        0.0
    }
}

/// Item sub-lists arrive as an array, a single object (promoted to a
/// one-element list), an array-like object keyed by index, or not at all.
fn as_item_array(v: Option<&Value>) -> Vec<Value> {
    match v {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Object(map)) => {
            let looks_like_line = ["sabor", "descricao", "flavor", "quantidade", "quantity"]
                .iter()
                .any(|k| map.contains_key(*k));
            if looks_like_line {
                vec![Value::Object(map.clone())]
            } else {
                map.values().cloned().collect()
            }
        }
        _ => Vec::new(),
    }
}

fn first_value<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| v.get(*k))
}

fn parse_money_any(v: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| v.get(*k).and_then(parse_money))
}

fn flag_any(v: &Value, keys: &[&str]) -> bool {
    first_value(v, keys).map(parse_flag).unwrap_or(false)
}

/// Convert one raw item line (either wire shape) into the canonical form.
pub fn normalize_item(raw: &Value) -> ItemLine {
    ItemLine {
        id: value_i64(raw, &["id"]),
        flavor: value_str(raw, &["sabor", "descricao", "flavor"]).unwrap_or_default(),
        quantity: first_value(raw, &["quantidade", "quantity"])
            .map(parse_quantity)
            .unwrap_or(0.0),
        unit: value_str(raw, &["unidade", "unit"]).unwrap_or_default(),
        note: value_str(raw, &["observacao", "note"]).unwrap_or_default(),
        inscription: value_str(raw, &["texto", "inscription"]).unwrap_or_default(),
    }
}

fn normalize_comments(raw: Option<&Value>) -> CategoryComments {
    let Some(raw) = raw else {
        return CategoryComments::default();
    };
    CategoryComments {
        sweets: value_str(raw, &["doces", "sweets"]).unwrap_or_default(),
        savories: value_str(raw, &["salgados", "savories"]).unwrap_or_default(),
        cakes: value_str(raw, &["bolos", "cakes"]).unwrap_or_default(),
    }
}

/// Convert one raw backend record (either dialect) into a canonical order.
pub fn normalize_order(raw: &Value) -> Order {
    // Pedido documents nest the descriptive fields under `formData`; kit
    // records and canonical orders keep them at the top level.
    let form = raw.get("formData").filter(|v| v.is_object()).unwrap_or(raw);
    let items_src = raw.get("items").filter(|v| v.is_object()).unwrap_or(raw);

    let id = value_i64(raw, &["id"])
        .or_else(|| {
            value_str(form, &["pedidoId", "pedido_id"]).and_then(|s| s.trim().parse().ok())
        })
        .unwrap_or(0);

    let delivered = first_value(raw, &["entregue", "delivered"])
        .or_else(|| first_value(form, &["entregue", "delivered"]))
        .map(parse_flag)
        .unwrap_or(false);

    Order {
        id,
        name: value_str(form, &["nome", "name"]).unwrap_or_default(),
        client: value_str(form, &["cliente", "client"]).unwrap_or_default(),
        staff: value_str(form, &["responsavel", "staff"]).unwrap_or_default(),
        reseller: value_str(form, &["revendedor", "reseller"]).unwrap_or_default(),
        phone: value_str(form, &["telefone", "phone"]).unwrap_or_default(),
        email: value_str(form, &["email"]).unwrap_or_default(),
        event_date: value_str(form, &["dataEvento", "data_evento", "data", "eventDate"])
            .unwrap_or_default(),
        event_time: value_str(form, &["hora", "horario", "eventTime"]).unwrap_or_default(),
        kind: value_str(form, &["tipo", "retirada", "kind"])
            .map(|s| DeliveryKind::from_wire(&s))
            .unwrap_or_default(),
        address: value_str(form, &["endereco", "enderecoEntrega", "endereco_entrega", "address"])
            .unwrap_or_default(),
        price: parse_money_any(
            form,
            &["valorTotal", "precoTotal", "preco_total", "total", "preco", "price"],
        ),
        delivery_fee: parse_money_any(form, &["taxaEntrega", "taxa_entrega", "deliveryFee"]),
        payment: value_str(form, &["tipoPagamento", "tipo_pagamento", "payment"])
            .unwrap_or_default(),
        size: value_str(form, &["tamanho", "size"]).unwrap_or_default(),
        sweets: as_item_array(first_value(items_src, &["doces", "sweets"]))
            .iter()
            .map(normalize_item)
            .collect(),
        savories: as_item_array(first_value(items_src, &["salgados", "savories"]))
            .iter()
            .map(normalize_item)
            .collect(),
        cakes: as_item_array(first_value(items_src, &["bolos", "cakes"]))
            .iter()
            .map(normalize_item)
            .collect(),
        sweets_done: flag_any(raw, &["statusDoces", "status_doces", "sweetsDone"])
            || flag_any_nested(raw, "docesDone"),
        savories_done: flag_any(raw, &["statusSalgados", "status_salgados", "savoriesDone"])
            || flag_any_nested(raw, "salgadosDone"),
        cakes_done: flag_any(raw, &["statusBolos", "status_bolos", "cakesDone"])
            || flag_any_nested(raw, "bolosDone"),
        delivered,
        comments: normalize_comments(raw.get("comments")),
        created_at: value_str(raw, &["criadoEm", "criado_em", "createdAt", "created_at"])
            .unwrap_or_default(),
        updated_at: value_str(raw, &["atualizadoEm", "atualizado_em", "updatedAt", "updated_at"])
            .unwrap_or_default(),
    }
}

// Older list endpoints returned the front-end shape with a nested
// `status: { docesDone, ... }` object.
fn flag_any_nested(raw: &Value, key: &str) -> bool {
    raw.get("status")
        .and_then(|s| s.get(key))
        .map(parse_flag)
        .unwrap_or(false)
}

/// Convert a list payload into canonical orders, most recently touched
/// first. List bodies may be a bare array or wrapped under `pedidos`,
/// `data` or `items`. Ordering is a plain string comparison over the
/// ISO-ish `updated_at` (no timezone normalization); ties keep the
/// backend's order.
pub fn normalize_list(raw: &Value) -> Vec<Order> {
    let rows = if let Some(arr) = raw.as_array() {
        arr
    } else if let Some(arr) = raw.get("pedidos").and_then(Value::as_array) {
        arr
    } else if let Some(arr) = raw.get("data").and_then(Value::as_array) {
        arr
    } else if let Some(arr) = raw.get("items").and_then(Value::as_array) {
        arr
    } else {
        return Vec::new();
    };
    let mut orders: Vec<Order> = rows.iter().map(normalize_order).collect();
    orders.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_record_yields_defined_defaults() {
        let order = normalize_order(&json!({}));
        assert_eq!(order.id, 0);
        assert_eq!(order.name, "");
        assert_eq!(order.price, None);
        assert_eq!(order.kind, DeliveryKind::Pickup);
        assert!(!order.sweets_done && !order.delivered);
        assert!(order.sweets.is_empty() && order.savories.is_empty() && order.cakes.is_empty());
    }

    #[test]
    fn money_parses_brl_and_plain_strings() {
        assert_eq!(parse_money(&json!("R$ 1.234,56")), Some(1234.56));
        assert_eq!(parse_money(&json!("1.234,56")), Some(1234.56));
        assert_eq!(parse_money(&json!("12.50")), Some(12.5));
        assert_eq!(parse_money(&json!(89.9)), Some(89.9));
        assert_eq!(parse_money(&json!("abc")), None);
        assert_eq!(parse_money(&json!("")), None);
        assert_eq!(parse_money(&json!(null)), None);
    }

    #[test]
    fn flags_accept_integers_and_booleans() {
        assert!(parse_flag(&json!(1)));
        assert!(parse_flag(&json!(true)));
        assert!(parse_flag(&json!("1")));
        assert!(!parse_flag(&json!(0)));
        assert!(!parse_flag(&json!(false)));
        assert!(!parse_flag(&json!("0")));
        assert!(!parse_flag(&json!(null)));
    }

    #[test]
    fn quantity_never_propagates_nan() {
        assert_eq!(parse_quantity(&json!("10")), 10.0);
        assert_eq!(parse_quantity(&json!("1,5")), 1.5);
        assert_eq!(parse_quantity(&json!("x")), 0.0);
        assert_eq!(parse_quantity(&json!(-3)), 0.0);
        assert_eq!(parse_quantity(&json!(null)), 0.0);
    }

    #[test]
    fn kit_record_maps_to_canonical_fields() {
        let raw = json!({
            "id": 42,
            "nome": "Kit Festa",
            "telefone": "11999990000",
            "dataEvento": "2026-08-10",
            "hora": "14:30",
            "tipo": "entrega",
            "endereco": "Rua B, 9",
            "preco": "150.00",
            "statusDoces": 1,
            "statusSalgados": 0,
            "statusBolos": 0,
            "entregue": 0,
            "criadoEm": "2026-08-01T10:00:00",
            "atualizadoEm": "2026-08-02T10:00:00",
            "doces": [{"id": 1, "sabor": "Brigadeiro", "quantidade": 50, "observacao": null}],
            "salgados": [],
            "bolos": [{"id": 2, "sabor": "Chocolate", "quantidade": 1, "texto": "Parabéns!"}]
        });
        let order = normalize_order(&raw);
        assert_eq!(order.id, 42);
        assert_eq!(order.kind, DeliveryKind::Delivery);
        assert_eq!(order.price, Some(150.0));
        assert!(order.sweets_done && !order.savories_done);
        assert_eq!(order.sweets[0].flavor, "Brigadeiro");
        assert_eq!(order.cakes[0].inscription, "Parabéns!");
    }

    #[test]
    fn pedido_document_maps_through_the_shim() {
        let raw = json!({
            "id": 7,
            "formData": {
                "pedidoId": "7",
                "responsavel": "Ana",
                "cliente": "Escola Azul",
                "retirada": "ENTREGA",
                "data": "2026-08-15",
                "horario": "09:00",
                "endereco_entrega": "Av. Central, 100",
                "preco_total": "R$ 1.234,56",
                "taxa_entrega": "R$ 20,00",
                "tipo_pagamento": "PIX",
                "tamanho": "G"
            },
            "items": {
                "doces": [{"descricao": "Beijinho", "quantidade": "100", "unidade": "UN"}],
                "bolos": {"descricao": "Bolo redondo", "quantidade": "1,5", "unidade": "KG"}
            },
            "comments": {"doces": "sem açúcar no topo"}
        });
        let order = normalize_order(&raw);
        assert_eq!(order.id, 7);
        assert_eq!(order.staff, "Ana");
        assert_eq!(order.client, "Escola Azul");
        assert_eq!(order.kind, DeliveryKind::Delivery);
        assert_eq!(order.address, "Av. Central, 100");
        assert_eq!(order.price, Some(1234.56));
        assert_eq!(order.delivery_fee, Some(20.0));
        assert_eq!(order.payment, "PIX");
        assert_eq!(order.sweets[0].unit, "UN");
        // single object promoted to a one-element list, comma decimal kept
        assert_eq!(order.cakes.len(), 1);
        assert_eq!(order.cakes[0].quantity, 1.5);
        assert_eq!(order.comments.sweets, "sem açúcar no topo");
        assert!(order.savories.is_empty());
    }

    #[test]
    fn list_unwraps_envelopes_and_sorts_by_updated_at_desc() {
        let raw = json!({"pedidos": [
            {"id": 1, "atualizadoEm": "2026-08-01T09:00:00"},
            {"id": 2, "atualizadoEm": "2026-08-03T09:00:00"},
            {"id": 3, "atualizadoEm": "2026-08-02T09:00:00"}
        ]});
        let orders = normalize_list(&raw);
        let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(normalize_list(&json!({"unexpected": true})).is_empty());
        assert!(normalize_list(&json!("garbage")).is_empty());
    }

    #[test]
    fn list_and_single_normalization_agree() {
        let raw = json!([
            {"id": 1, "nome": "A", "doces": [{"sabor": "Brigadeiro", "quantidade": 10}]},
            {"id": 2, "formData": {"cliente": "B", "preco_total": "R$ 10,00"}}
        ]);
        let from_list = normalize_list(&raw);
        for order in &from_list {
            let single = normalize_order(
                raw.as_array()
                    .unwrap()
                    .iter()
                    .find(|r| value_i64(r, &["id"]) == Some(order.id))
                    .unwrap(),
            );
            assert_eq!(&single, order);
        }
    }

    #[test]
    fn normalization_is_a_fixpoint_over_its_own_output() {
        let raw = json!({
            "id": 9,
            "nome": "Kit",
            "tipo": "entrega",
            "endereco": "Rua C",
            "preco": 55.5,
            "statusDoces": 1,
            "doces": [{"id": 4, "sabor": "Ninho", "quantidade": 30}]
        });
        let once = normalize_order(&raw);
        let twice = normalize_order(&serde_json::to_value(&once).expect("serialize"));
        assert_eq!(once, twice);
    }
}
