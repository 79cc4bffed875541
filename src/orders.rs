//! Typed client for the order backend.
//!
//! Wraps the REST contract behind canonical-model methods: kit CRUD, item
//! lifecycle, status flags, the pedido document endpoints used by the
//! registration/printing screens, and the delivered-orders source the
//! report layer consumes. Every response body runs through `normalize`,
//! so callers only ever see canonical orders.

use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::analytics::DeliveredSource;
use crate::api::{self, ApiError};
use crate::filter::{DateFilter, OrderFilter};
use crate::format::{format_brl, format_quantity};
use crate::model::{Category, DeliveryKind, ItemLine, Order, OrderDraft};
use crate::normalize::{normalize_item, normalize_list, normalize_order};
use crate::value_i64;

pub struct OrderClient {
    http: reqwest::Client,
    base: String,
}

impl OrderClient {
    pub fn new(base_url: &str) -> Result<OrderClient, ApiError> {
        Ok(OrderClient {
            http: api::build_client()?,
            base: api::normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub(crate) async fn request(
        &self,
        path: &str,
        params: &[(&str, String)],
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        api::request_json(&self.http, &self.base, path, params, method, body).await
    }

    // -- Kits ----------------------------------------------------------------

    /// `GET /kits`: every order, most recently touched first.
    pub async fn list(&self) -> Result<Vec<Order>, ApiError> {
        let raw = self.request("/kits", &[], Method::GET, None).await?;
        Ok(normalize_list(&raw))
    }

    /// `GET /kits?entregues=true|false`: scoped by the delivered flag.
    pub async fn list_by_delivered(&self, delivered: bool) -> Result<Vec<Order>, ApiError> {
        let params = [("entregues", delivered.to_string())];
        let raw = self.request("/kits", &params, Method::GET, None).await?;
        Ok(normalize_list(&raw))
    }

    /// `GET /kits/:id`.
    pub async fn get(&self, id: i64) -> Result<Order, ApiError> {
        let raw = self.request(&format!("/kits/{id}"), &[], Method::GET, None).await?;
        Ok(normalize_order(&raw))
    }

    /// `POST /kits` plus one item POST per initial line. The backend
    /// assigns the id on the kit insert; item inserts then attach to it.
    pub async fn create(&self, draft: &OrderDraft) -> Result<Order, ApiError> {
        let body = kit_create_body(draft);
        let raw = self.request("/kits", &[], Method::POST, Some(&body)).await?;
        let mut order = normalize_order(&raw);
        info!(order_id = order.id, "order created");

        for category in Category::ALL {
            for line in draft.items(category) {
                let created = self.add_item(order.id, category, line).await?;
                order.items_mut(category).push(created);
            }
        }
        Ok(order)
    }

    /// `PATCH /kits/:id`: descriptive fields only; items and flags have
    /// their own endpoints. The price is included only when present, so a
    /// plain field edit cannot clear it.
    pub async fn update(&self, order: &Order) -> Result<(), ApiError> {
        let mut patch = Map::new();
        patch.insert("nome".into(), json!(order.name));
        patch.insert("telefone".into(), json!(order.phone));
        patch.insert("email".into(), opt_str(&order.email));
        patch.insert("dataEvento".into(), opt_str(&order.event_date));
        patch.insert("hora".into(), opt_str(&order.event_time));
        patch.insert("tipo".into(), json!(order.kind.wire_name()));
        patch.insert(
            "endereco".into(),
            if order.kind == DeliveryKind::Delivery {
                json!(order.address)
            } else {
                Value::Null
            },
        );
        if let Some(price) = order.price.filter(|p| p.is_finite()) {
            patch.insert("preco".into(), json!(price));
        }
        self.request(
            &format!("/kits/{}", order.id),
            &[],
            Method::PATCH,
            Some(&Value::Object(patch)),
        )
        .await?;
        Ok(())
    }

    /// `DELETE /kits/:id`; the backend cascades to the item tables.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.request(&format!("/kits/{id}"), &[], Method::DELETE, None).await?;
        info!(order_id = id, "order deleted");
        Ok(())
    }

    // -- Items ---------------------------------------------------------------

    /// `POST /kits/:id/{doces|salgados|bolos}`.
    pub async fn add_item(
        &self,
        kit_id: i64,
        category: Category,
        line: &ItemLine,
    ) -> Result<ItemLine, ApiError> {
        let mut body = Map::new();
        body.insert("sabor".into(), json!(line.flavor));
        body.insert("quantidade".into(), json!(line.quantity));
        if !line.note.is_empty() {
            body.insert("observacao".into(), json!(line.note));
        }
        if category == Category::Cakes && !line.inscription.is_empty() {
            body.insert("texto".into(), json!(line.inscription));
        }
        let raw = self
            .request(
                &format!("/kits/{kit_id}/{}", category.wire_name()),
                &[],
                Method::POST,
                Some(&Value::Object(body)),
            )
            .await?;
        Ok(normalize_item(&raw))
    }

    /// `PATCH /{doces|salgados|bolos}/:itemId` with a partial patch.
    pub async fn update_item(
        &self,
        category: Category,
        item_id: i64,
        patch: &Value,
    ) -> Result<(), ApiError> {
        self.request(
            &format!("/{}/{item_id}", category.wire_name()),
            &[],
            Method::PATCH,
            Some(patch),
        )
        .await?;
        Ok(())
    }

    /// `DELETE /{doces|salgados|bolos}/:itemId`.
    pub async fn remove_item(&self, category: Category, item_id: i64) -> Result<(), ApiError> {
        self.request(&format!("/{}/{item_id}", category.wire_name()), &[], Method::DELETE, None)
            .await?;
        Ok(())
    }

    // -- Status flags --------------------------------------------------------

    /// `PATCH /kits/:id/status/{doces|salgados|bolos}`.
    pub async fn set_done(
        &self,
        kit_id: i64,
        category: Category,
        value: bool,
    ) -> Result<(), ApiError> {
        self.request(
            &format!("/kits/{kit_id}/status/{}", category.wire_name()),
            &[],
            Method::PATCH,
            Some(&json!({ "value": value })),
        )
        .await?;
        Ok(())
    }

    /// `PATCH /kits/:id/status/entregue`.
    pub async fn set_delivered(&self, kit_id: i64, value: bool) -> Result<(), ApiError> {
        self.request(
            &format!("/kits/{kit_id}/status/entregue"),
            &[],
            Method::PATCH,
            Some(&json!({ "value": value })),
        )
        .await?;
        Ok(())
    }

    // -- Order documents (registration / printing / consolidated) -----------

    /// `GET /pedidos` with the filters the backend understands as query
    /// parameters, then the full filter re-applied locally. The server
    /// ignores parameters it does not know, so the local pass is what
    /// guarantees the contract.
    pub async fn list_documents(&self, filter: &OrderFilter) -> Result<Vec<Order>, ApiError> {
        let params = document_params(filter);
        let raw = self.request("/pedidos", &params, Method::GET, None).await?;
        Ok(filter.apply(&normalize_list(&raw)))
    }

    /// `GET /pedidos/:id`: `None` on 404, error on anything else.
    pub async fn get_document(&self, id: i64) -> Result<Option<Order>, ApiError> {
        match self.request(&format!("/pedidos/{id}"), &[], Method::GET, None).await {
            Ok(raw) => Ok(Some(normalize_order(&raw))),
            Err(err) if err.status() == Some(404) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// `POST /pedidos` with the nested document payload. Returns the id
    /// the backend assigned when it reports one.
    pub async fn create_document(&self, draft: &OrderDraft) -> Result<Option<i64>, ApiError> {
        let body = document_body(draft);
        let raw = self.request("/pedidos", &[], Method::POST, Some(&body)).await?;
        Ok(value_i64(&raw, &["pedidoId", "id"]))
    }

    /// `PATCH /pedidos/:id` with a full document payload.
    pub async fn update_document(&self, id: i64, draft: &OrderDraft) -> Result<(), ApiError> {
        let body = document_body(draft);
        self.request(&format!("/pedidos/{id}"), &[], Method::PATCH, Some(&body)).await?;
        Ok(())
    }

    /// `DELETE /pedidos/:id`.
    pub async fn delete_document(&self, id: i64) -> Result<(), ApiError> {
        self.request(&format!("/pedidos/{id}"), &[], Method::DELETE, None).await?;
        Ok(())
    }

    /// `GET /pedidos?ultimo_id=true`: highest assigned document id, used
    /// by the registration screen to pre-fill the next order number.
    /// Defaults to 0 when the backend reports nothing usable.
    pub async fn last_document_id(&self) -> Result<i64, ApiError> {
        let params = [("ultimo_id", "true".to_string())];
        let raw = self.request("/pedidos", &params, Method::GET, None).await?;
        Ok(value_i64(&raw, &["ultimoId", "ultimo_id"]).unwrap_or(0))
    }
}

impl DeliveredSource for OrderClient {
    /// Delivered orders scoped to an inclusive event-date range.
    async fn list_delivered(&self, from: &str, to: &str) -> Result<Vec<Order>, ApiError> {
        let delivered = self.list_by_delivered(true).await?;
        let filter = OrderFilter {
            date: DateFilter::Range {
                from: (!from.is_empty()).then(|| from.to_string()),
                to: (!to.is_empty()).then(|| to.to_string()),
            },
            ..OrderFilter::default()
        };
        Ok(filter.apply(&delivered))
    }
}

fn opt_str(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        json!(value)
    }
}

/// `POST /kits` body; optional fields are omitted rather than sent empty,
/// and the address only travels for delivery orders.
fn kit_create_body(draft: &OrderDraft) -> Value {
    let mut body = Map::new();
    body.insert("nome".into(), json!(draft.name));
    body.insert("telefone".into(), json!(draft.phone));
    if !draft.email.is_empty() {
        body.insert("email".into(), json!(draft.email));
    }
    if !draft.event_date.is_empty() {
        body.insert("dataEvento".into(), json!(draft.event_date));
    }
    if !draft.event_time.is_empty() {
        body.insert("hora".into(), json!(draft.event_time));
    }
    body.insert("tipo".into(), json!(draft.kind.wire_name()));
    if draft.kind == DeliveryKind::Delivery {
        body.insert("endereco".into(), json!(draft.address));
    }
    if let Some(price) = draft.price.filter(|p| p.is_finite()) {
        body.insert("preco".into(), json!(price));
    }
    Value::Object(body)
}

/// Nested `{ formData, items, comments }` payload for the document
/// endpoints. Prices travel in their display form and blank item lines
/// are dropped, mirroring what the registration form submits.
fn document_body(draft: &OrderDraft) -> Value {
    json!({
        "formData": {
            "responsavel": draft.staff,
            "cliente": draft.client,
            "revendedor": draft.reseller,
            "telefone": draft.phone,
            "retirada": draft.kind.label(),
            "data": draft.event_date,
            "horario": draft.event_time,
            "endereco_entrega": draft.address,
            "preco_total": draft.price.map(format_brl).unwrap_or_default(),
            "taxa_entrega": draft.delivery_fee.map(format_brl).unwrap_or_default(),
            "tipo_pagamento": if draft.payment.is_empty() { "PIX" } else { draft.payment.as_str() },
            "tamanho": draft.size,
        },
        "items": {
            "doces": document_items(&draft.sweets),
            "salgados": document_items(&draft.savories),
            "bolos": document_items(&draft.cakes),
        },
        "comments": {
            "doces": draft.comments.sweets,
            "salgados": draft.comments.savories,
            "bolos": draft.comments.cakes,
        },
    })
}

fn document_items(lines: &[ItemLine]) -> Vec<Value> {
    lines
        .iter()
        .filter(|line| !line.flavor.trim().is_empty() || line.quantity > 0.0)
        .map(|line| {
            json!({
                "descricao": line.flavor.trim(),
                "quantidade": format_quantity(line.quantity),
                "unidade": line.unit,
            })
        })
        .collect()
}

/// Query parameters the `/pedidos` controller understands. The exact-day
/// filter maps to `data`, ranges to `data_inicio`/`data_fim`; text
/// filters are forwarded verbatim and re-checked locally.
fn document_params(filter: &OrderFilter) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();
    match &filter.date {
        DateFilter::Any => {}
        DateFilter::On(day) => params.push(("data", day.clone())),
        DateFilter::Range { from, to } => {
            if let Some(from) = from {
                params.push(("data_inicio", from.clone()));
            }
            if let Some(to) = to {
                params.push(("data_fim", to.clone()));
            }
        }
    }
    if !filter.client_query.trim().is_empty() {
        params.push(("cliente", filter.client_query.trim().to_string()));
    }
    if !filter.staff_query.trim().is_empty() {
        params.push(("responsavel", filter.staff_query.trim().to_string()));
    }
    if let Some(kind) = filter.kind {
        params.push(("retirada", kind.label().to_string()));
    }
    if !filter.time_prefix.trim().is_empty() {
        params.push(("horario", filter.time_prefix.trim().to_string()));
    }
    if let Some(payment) = filter.payment.as_deref() {
        if !payment.trim().is_empty() {
            params.push(("tipo_pagamento", payment.trim().to_string()));
        }
    }
    let number = crate::format::digits_only(&filter.number_query);
    if !number.is_empty() {
        params.push(("pedidoId", number));
    }
    params
}
