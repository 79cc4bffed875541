//! Pre-submit validation and destructive-action confirmation.
//!
//! Validation runs synchronously before any network call and reports the
//! full list of problems at once, in the words the forms use. The
//! [`Confirm`] trait stands in for the blocking confirm dialog so the
//! delete flows stay testable without a UI shell.

use crate::api::ApiError;
use crate::model::{DeliveryKind, OrderDraft};
use crate::orders::OrderClient;

/// Rules of the kit board's create/edit modal: name, phone, and an
/// address when the kit is for delivery.
pub fn validate_kit_draft(draft: &OrderDraft) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if draft.name.trim().is_empty() {
        errors.push("Preencha o nome do kit.".to_string());
    }
    if draft.phone.trim().is_empty() {
        errors.push("Preencha o telefone.".to_string());
    }
    push_address_error(draft, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Rules of the registration sheet, which is stricter: client, phone,
/// price, date and time are all mandatory before the order is accepted.
pub fn validate_document_draft(draft: &OrderDraft) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if draft.client.trim().is_empty() {
        errors.push("Cliente é obrigatório.".to_string());
    }
    if draft.phone.trim().is_empty() {
        errors.push("Telefone é obrigatório.".to_string());
    }
    if draft.price.is_none() {
        errors.push("Preço é obrigatório.".to_string());
    }
    if draft.event_date.trim().is_empty() {
        errors.push("Data é obrigatória.".to_string());
    }
    if draft.event_time.trim().is_empty() {
        errors.push("Horário é obrigatório.".to_string());
    }
    push_address_error(draft, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn push_address_error(draft: &OrderDraft, errors: &mut Vec<String>) {
    if draft.kind == DeliveryKind::Delivery && draft.address.trim().is_empty() {
        errors.push("Endereço é obrigatório para entrega.".to_string());
    }
}

/// Blocking yes/no decision, answered by whatever shell hosts the core
/// (a dialog in the app, a canned answer in tests).
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// Approves everything; the default for non-interactive callers.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// Delete an order after confirmation. Returns `false` when the user
/// declined; the backend is not contacted in that case.
pub async fn delete_order_confirmed(
    client: &OrderClient,
    confirm: &dyn Confirm,
    id: i64,
) -> Result<bool, ApiError> {
    if !confirm.confirm("Remover este kit?") {
        return Ok(false);
    }
    client.delete(id).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Decline {
        asked: Cell<bool>,
    }

    impl Confirm for Decline {
        fn confirm(&self, _message: &str) -> bool {
            self.asked.set(true);
            false
        }
    }

    fn complete_draft() -> OrderDraft {
        OrderDraft {
            name: "Kit Festa".into(),
            client: "Janine".into(),
            phone: "11999990000".into(),
            price: Some(150.0),
            event_date: "2026-08-10".into(),
            event_time: "14:00".into(),
            ..OrderDraft::default()
        }
    }

    #[test]
    fn document_draft_reports_every_problem_at_once() {
        let errors = validate_document_draft(&OrderDraft::default()).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&"Cliente é obrigatório.".to_string()));
        assert!(errors.contains(&"Horário é obrigatório.".to_string()));

        assert!(validate_document_draft(&complete_draft()).is_ok());
    }

    #[test]
    fn delivery_requires_an_address_pickup_does_not() {
        let mut draft = complete_draft();
        draft.kind = DeliveryKind::Delivery;
        let errors = validate_document_draft(&draft).unwrap_err();
        assert_eq!(errors, vec!["Endereço é obrigatório para entrega.".to_string()]);

        draft.address = "Rua A, 123".into();
        assert!(validate_document_draft(&draft).is_ok());

        draft.kind = DeliveryKind::Pickup;
        draft.address.clear();
        assert!(validate_document_draft(&draft).is_ok());
    }

    #[test]
    fn kit_draft_needs_name_and_phone_only() {
        let mut draft = OrderDraft::default();
        let errors = validate_kit_draft(&draft).unwrap_err();
        assert_eq!(errors.len(), 2);

        draft.name = "Kit".into();
        draft.phone = "11".into();
        assert!(validate_kit_draft(&draft).is_ok());
    }

    #[tokio::test]
    async fn declined_confirmation_skips_the_backend() {
        let client = OrderClient::new("http://127.0.0.1:1").expect("client");
        let decline = Decline { asked: Cell::new(false) };
        let deleted = delete_order_confirmed(&client, &decline, 1).await.expect("flow");
        assert!(!deleted);
        assert!(decline.asked.get());
    }
}
