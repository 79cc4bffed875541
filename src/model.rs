//! Canonical order model.
//!
//! The backend grew two representations of the same order over time: flat
//! camelCase "kit" records and nested snake_case "pedido" documents.
//! Everything past the normalization layer works with the single canonical
//! shape defined here; `normalize` is the only module that reads raw wire
//! payloads.

use serde::{Deserialize, Serialize};

/// The three item sections of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sweets,
    Savories,
    Cakes,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Sweets, Category::Savories, Category::Cakes];

    /// Path segment used by the item and status endpoints.
    pub fn wire_name(self) -> &'static str {
        match self {
            Category::Sweets => "doces",
            Category::Savories => "salgados",
            Category::Cakes => "bolos",
        }
    }

    /// Uppercase label used on printable listings.
    pub fn label(self) -> &'static str {
        match self {
            Category::Sweets => "DOCES",
            Category::Savories => "SALGADOS",
            Category::Cakes => "BOLOS",
        }
    }

    /// Suggested flavors for this section's select.
    pub fn suggested_flavors(self) -> &'static [&'static str] {
        match self {
            Category::Sweets => SWEET_FLAVORS,
            Category::Savories => SAVORY_FLAVORS,
            Category::Cakes => CAKE_FLAVORS,
        }
    }
}

/// Pickup at the shop or delivery to the customer address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    #[default]
    Pickup,
    Delivery,
}

impl DeliveryKind {
    /// Accepts every wire vocabulary in circulation: `retirada`/`entrega`
    /// from the kit resource, `RETIRADA`/`ENTREGA` from the pedido form
    /// and the canonical `pickup`/`delivery`. Anything unrecognized falls
    /// back to pickup, the form default.
    pub fn from_wire(raw: &str) -> DeliveryKind {
        match raw.trim().to_lowercase().as_str() {
            "entrega" | "delivery" => DeliveryKind::Delivery,
            _ => DeliveryKind::Pickup,
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            DeliveryKind::Pickup => "retirada",
            DeliveryKind::Delivery => "entrega",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeliveryKind::Pickup => "RETIRADA",
            DeliveryKind::Delivery => "ENTREGA",
        }
    }
}

/// Payment tags the registration form offers. The field itself is a free
/// string so unknown tags survive normalization untouched.
pub const PAYMENT_KINDS: &[&str] = &[
    "QRCODE", "PIX", "DÉBITO", "CRÉDITO", "DINHEIRO", "GUIA", "NOTA", "VALE", "VOUCHER",
];

/// Suggested flavor vocabularies for the item selects. Suggestions only;
/// item flavors are free text.
pub const SWEET_FLAVORS: &[&str] = &[
    "BRIGADEIRO", "BEIJINHO", "CAJUZINHO", "BICHO DE PÉ", "DOIS AMORES",
    "OLHO DE SOGRA", "DOCE DE UVA", "BOMBOM DE AMEIXA", "BOMBOM DE CEREJA",
    "BOMBOM DE UVA", "BOMBOM DE MORANGO", "BOMBOM DE DAMASCO", "TRUFA",
    "COPO DE CHOCOLATE", "MINI PUDIM", "MINI TORTINHAS", "CAMAFEU", "OUTROS",
];

pub const SAVORY_FLAVORS: &[&str] = &[
    "COXINHA DE FRANGO", "BOLINHA DE QUEIJO", "PASTEL DE CARNE", "PASTEL DE PIZZA",
    "BARQUETE DE SALPICÃO", "QUIBE", "RISOLIS DE PIZZA", "TROUXINHA DE FRANGO",
    "ENROLADO DE PIZZA", "ENROLADO DE VINA", "ESFIRRA DE CARNE", "MINI X SALADA",
    "MINI PIZZA", "FOLHADO (QUEIJO E PRESUNTO)", "FOLHADO (PALMITO)",
];

pub const CAKE_FLAVORS: &[&str] = &[
    "FLORESTA NEGRA", "MORANGO", "MARTA ROCHA", "SONHO DE VALSA", "NATA FRUTAS",
    "DOIS AMORES", "PRESTIGIO", "BRIGADEIRO", "QUATRO LEITES", "COCADA",
];

/// One item line inside an order section.
///
/// `id` is `None` for draft lines that have not been persisted yet. The
/// quantity is a float because cake lines are measured in kilograms on
/// some order sheets ("1,5 KG").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemLine {
    pub id: Option<i64>,
    pub flavor: String,
    pub quantity: f64,
    /// Unit tag from the order sheet ("UN", "CENTO", "KG"); empty on the
    /// kit wire shape, which has no unit column.
    pub unit: String,
    pub note: String,
    /// Inscription text piped onto cakes ("Parabéns Janine!"). Empty for
    /// sweets and savories.
    pub inscription: String,
}

/// Free-text remark per section, carried by the pedido document shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryComments {
    pub sweets: String,
    pub savories: String,
    pub cakes: String,
}

impl CategoryComments {
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Sweets => &self.sweets,
            Category::Savories => &self.savories,
            Category::Cakes => &self.cakes,
        }
    }

    pub fn set(&mut self, category: Category, text: impl Into<String>) {
        match category {
            Category::Sweets => self.sweets = text.into(),
            Category::Savories => self.savories = text.into(),
            Category::Cakes => self.cakes = text.into(),
        }
    }
}

/// A canonical order ("kit").
///
/// The `delivered` flag and the three per-section done flags are
/// independent: an order can be marked delivered while sections are still
/// open. Use [`crate::analytics::is_all_done`] for the combined predicate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub id: i64,
    pub name: String,
    pub client: String,
    /// Staff member responsible for the order.
    pub staff: String,
    pub reseller: String,
    pub phone: String,
    pub email: String,
    /// Event day as `YYYY-MM-DD`; empty when not scheduled yet.
    pub event_date: String,
    /// Event time as `HH:MM`; empty when not scheduled yet.
    pub event_time: String,
    pub kind: DeliveryKind,
    /// Required (non-empty) only when `kind` is delivery.
    pub address: String,
    pub price: Option<f64>,
    pub delivery_fee: Option<f64>,
    /// Payment tag, usually one of [`PAYMENT_KINDS`]; empty when unset.
    pub payment: String,
    /// Size tag ("P", "M", "G" or free text); empty when unset.
    pub size: String,
    pub sweets: Vec<ItemLine>,
    pub savories: Vec<ItemLine>,
    pub cakes: Vec<ItemLine>,
    pub sweets_done: bool,
    pub savories_done: bool,
    pub cakes_done: bool,
    pub delivered: bool,
    pub comments: CategoryComments,
    pub created_at: String,
    pub updated_at: String,
}

impl Order {
    pub fn items(&self, category: Category) -> &[ItemLine] {
        match category {
            Category::Sweets => &self.sweets,
            Category::Savories => &self.savories,
            Category::Cakes => &self.cakes,
        }
    }

    pub fn items_mut(&mut self, category: Category) -> &mut Vec<ItemLine> {
        match category {
            Category::Sweets => &mut self.sweets,
            Category::Savories => &mut self.savories,
            Category::Cakes => &mut self.cakes,
        }
    }

    pub fn has_items(&self, category: Category) -> bool {
        !self.items(category).is_empty()
    }

    pub fn done(&self, category: Category) -> bool {
        match category {
            Category::Sweets => self.sweets_done,
            Category::Savories => self.savories_done,
            Category::Cakes => self.cakes_done,
        }
    }

    pub fn set_done(&mut self, category: Category, value: bool) {
        match category {
            Category::Sweets => self.sweets_done = value,
            Category::Savories => self.savories_done = value,
            Category::Cakes => self.cakes_done = value,
        }
    }
}

/// Form data for an order that has not been submitted yet. The backend
/// assigns the id; the offline cache assigns `max + 1` locally.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderDraft {
    pub name: String,
    pub client: String,
    pub staff: String,
    pub reseller: String,
    pub phone: String,
    pub email: String,
    pub event_date: String,
    pub event_time: String,
    pub kind: DeliveryKind,
    pub address: String,
    pub price: Option<f64>,
    pub delivery_fee: Option<f64>,
    pub payment: String,
    pub size: String,
    pub sweets: Vec<ItemLine>,
    pub savories: Vec<ItemLine>,
    pub cakes: Vec<ItemLine>,
    pub comments: CategoryComments,
}

impl OrderDraft {
    pub fn items(&self, category: Category) -> &[ItemLine] {
        match category {
            Category::Sweets => &self.sweets,
            Category::Savories => &self.savories,
            Category::Cakes => &self.cakes,
        }
    }

    /// Promote the draft to an order with a known id; used by the offline
    /// cache, which skips the backend entirely.
    pub fn into_order(self, id: i64, now: &str) -> Order {
        Order {
            id,
            name: self.name,
            client: self.client,
            staff: self.staff,
            reseller: self.reseller,
            phone: self.phone,
            email: self.email,
            event_date: self.event_date,
            event_time: self.event_time,
            kind: self.kind,
            address: self.address,
            price: self.price,
            delivery_fee: self.delivery_fee,
            payment: self.payment,
            size: self.size,
            sweets: self.sweets,
            savories: self.savories,
            cakes: self.cakes,
            comments: self.comments,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            ..Order::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_kind_accepts_both_wire_vocabularies() {
        assert_eq!(DeliveryKind::from_wire("entrega"), DeliveryKind::Delivery);
        assert_eq!(DeliveryKind::from_wire("ENTREGA"), DeliveryKind::Delivery);
        assert_eq!(DeliveryKind::from_wire("retirada"), DeliveryKind::Pickup);
        assert_eq!(DeliveryKind::from_wire("RETIRADA"), DeliveryKind::Pickup);
        assert_eq!(DeliveryKind::from_wire(""), DeliveryKind::Pickup);
        assert_eq!(DeliveryKind::from_wire("whatever"), DeliveryKind::Pickup);
    }

    #[test]
    fn draft_promotion_stamps_id_and_timestamps() {
        let draft = OrderDraft {
            name: "Kit Aniversário".into(),
            client: "Janine".into(),
            kind: DeliveryKind::Delivery,
            address: "Rua A, 123".into(),
            sweets: vec![ItemLine {
                flavor: "Brigadeiro".into(),
                quantity: 50.0,
                ..ItemLine::default()
            }],
            ..OrderDraft::default()
        };
        let order = draft.into_order(7, "2026-08-07T10:00:00");
        assert_eq!(order.id, 7);
        assert_eq!(order.created_at, "2026-08-07T10:00:00");
        assert_eq!(order.updated_at, order.created_at);
        assert!(!order.delivered);
        assert_eq!(order.sweets.len(), 1);
    }
}
