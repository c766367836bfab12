//! Auth operations against the configured auth collection.
//!
//! Each operation is one request; the platform's JSON payload or error comes
//! back unchanged. Successful sign-ins are remembered in the client's auth
//! store so later requests carry the token.
//!
//! The free functions at the bottom forward to the process-wide client from
//! [`handle`](super::handle).

use super::{handle, PocketBaseClient};
use crate::domain::model::{AuthSession, Record};
use crate::utils::error::{KitError, Result};
use serde::Serialize;
use serde_json::{json, Value};

/// Arguments of `auth-with-oauth2` after the provider redirected back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthRequest {
    pub provider: String,
    pub code: String,
    pub code_verifier: String,
    pub redirect_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_data: Option<Record>,
}

impl PocketBaseClient {
    fn auth_url(&self, action: &str) -> String {
        self.url(&format!(
            "/api/collections/{}/{}",
            self.auth_collection(),
            action
        ))
    }

    fn remember_auth(&self, payload: &Value) {
        if let Some(token) = payload.get("token").and_then(|t| t.as_str()) {
            self.store_session(AuthSession {
                token: token.to_string(),
                record: payload.get("record").cloned(),
                is_admin: false,
            });
        }
    }

    pub async fn sign_in_with_email(&self, email: &str, password: &str) -> Result<Value> {
        let response = self
            .send(
                self.http
                    .post(self.auth_url("auth-with-password"))
                    .json(&json!({ "identity": email, "password": password })),
            )
            .await?;
        let payload: Value = response.json().await?;
        self.remember_auth(&payload);
        Ok(payload)
    }

    /// Creates the auth record. `extra` carries additional schema fields such
    /// as `name`; it does not sign the new user in.
    pub async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
        extra: Option<Record>,
    ) -> Result<Value> {
        let mut body = extra.unwrap_or_default();
        body.insert("email".to_string(), json!(email));
        body.insert("password".to_string(), json!(password));
        body.insert("passwordConfirm".to_string(), json!(password));

        let response = self
            .send(
                self.http
                    .post(self.url(&format!(
                        "/api/collections/{}/records",
                        self.auth_collection()
                    )))
                    .json(&body),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Forgets the stored token. No request is made.
    pub fn sign_out(&self) {
        self.clear_session();
    }

    pub async fn sign_in_with_oauth(&self, request: &OAuthRequest) -> Result<Value> {
        let response = self
            .send(self.http.post(self.auth_url("auth-with-oauth2")).json(request))
            .await?;
        let payload: Value = response.json().await?;
        self.remember_auth(&payload);
        Ok(payload)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        self.send(
            self.http
                .post(self.auth_url("request-password-reset"))
                .json(&json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    pub async fn confirm_password_reset(&self, token: &str, password: &str) -> Result<()> {
        self.send(
            self.http
                .post(self.auth_url("confirm-password-reset"))
                .json(&json!({
                    "token": token,
                    "password": password,
                    "passwordConfirm": password,
                })),
        )
        .await?;
        Ok(())
    }

    /// Changes the password of the signed-in record.
    pub async fn update_password(&self, old_password: &str, new_password: &str) -> Result<Value> {
        let session = self.session().filter(|s| !s.is_admin);
        let record_id = session
            .as_ref()
            .and_then(|s| s.record_id())
            .ok_or_else(|| KitError::AuthError {
                message: "Not signed in as a user".to_string(),
            })?;

        let response = self
            .send(
                self.http
                    .patch(self.url(&format!(
                        "/api/collections/{}/records/{}",
                        self.auth_collection(),
                        record_id
                    )))
                    .json(&json!({
                        "oldPassword": old_password,
                        "password": new_password,
                        "passwordConfirm": new_password,
                    })),
            )
            .await?;
        Ok(response.json().await?)
    }
}

pub async fn sign_in_with_email(email: &str, password: &str) -> Result<Value> {
    handle::get()?.sign_in_with_email(email, password).await
}

pub async fn sign_up_with_email(email: &str, password: &str, extra: Option<Record>) -> Result<Value> {
    handle::get()?.sign_up_with_email(email, password, extra).await
}

pub fn sign_out() -> Result<()> {
    handle::get()?.sign_out();
    Ok(())
}

pub async fn sign_in_with_oauth(request: &OAuthRequest) -> Result<Value> {
    handle::get()?.sign_in_with_oauth(request).await
}

pub async fn request_password_reset(email: &str) -> Result<()> {
    handle::get()?.request_password_reset(email).await
}

pub async fn confirm_password_reset(token: &str, password: &str) -> Result<()> {
    handle::get()?.confirm_password_reset(token, password).await
}

pub async fn update_password(old_password: &str, new_password: &str) -> Result<Value> {
    handle::get()?.update_password(old_password, new_password).await
}
