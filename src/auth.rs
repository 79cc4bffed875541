//! Session login against the order backend.
//!
//! The backend keeps accounts; this module only performs the login call
//! and hands the user record to the session layer. No credentials are
//! stored locally.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::api::ApiError;
use crate::orders::OrderClient;
use crate::{value_i64, value_str};

/// User record returned by `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

fn user_from_value(raw: &Value) -> UserRecord {
    // Some deployments wrap the record under "user".
    let record = raw.get("user").filter(|v| v.is_object()).unwrap_or(raw);
    UserRecord {
        id: value_i64(record, &["id"]).unwrap_or(0),
        email: value_str(record, &["email"]).unwrap_or_default(),
        name: value_str(record, &["nome", "name"]).unwrap_or_default(),
        role: value_str(record, &["role", "perfil"]).unwrap_or_default(),
    }
}

pub async fn login(
    client: &OrderClient,
    email: &str,
    password: &str,
) -> Result<UserRecord, ApiError> {
    let body = json!({ "email": email.trim(), "password": password });
    let raw = client.request("/auth/login", &[], Method::POST, Some(&body)).await?;
    let user = user_from_value(&raw);
    info!(user_id = user.id, "login succeeded");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_record_reads_flat_and_wrapped_bodies() {
        let flat = json!({ "id": 3, "email": "ana@doce.com", "role": "admin", "nome": "Ana" });
        let user = user_from_value(&flat);
        assert_eq!(user.id, 3);
        assert_eq!(user.role, "admin");
        assert_eq!(user.name, "Ana");

        let wrapped = json!({ "token": "abc", "user": { "id": 9, "email": "x@y.z" } });
        let user = user_from_value(&wrapped);
        assert_eq!(user.id, 9);
        assert_eq!(user.email, "x@y.z");

        let empty = user_from_value(&json!({}));
        assert_eq!(empty.id, 0);
        assert_eq!(empty.role, "");
    }
}
