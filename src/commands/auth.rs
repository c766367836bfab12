use super::{client_config, prompt_secret};
use crate::client::auth::{self, OAuthRequest};
use crate::client::handle;
use crate::config::cli::{AuthAction, AuthArgs};
use crate::config::KitConfig;
use crate::domain::model::Record;
use crate::utils::error::{KitError, Result};
use serde_json::{json, Value};

pub async fn execute(args: AuthArgs, config: KitConfig) -> Result<Value> {
    let mut client_config = client_config(args.url.as_deref(), &config);
    if let Some(collection) = args.auth_collection {
        client_config = client_config.with_auth_collection(collection);
    }
    let client = handle::init(client_config)?;
    tracing::debug!(
        "Auth collection {} on {}",
        client.auth_collection(),
        client.base_url()
    );

    let result = match args.action {
        AuthAction::SignIn { email, password } => {
            let password = password_or_prompt(password, "Password: ")?;
            auth::sign_in_with_email(&email, &password).await?
        }
        AuthAction::SignUp {
            email,
            password,
            data,
        } => {
            let password = password_or_prompt(password, "Password: ")?;
            let extra = data.as_deref().map(parse_extra_fields).transpose()?;
            auth::sign_up_with_email(&email, &password, extra).await?
        }
        AuthAction::SignOut => {
            auth::sign_out()?;
            json!({ "signedOut": true })
        }
        AuthAction::Oauth {
            provider,
            code,
            code_verifier,
            redirect_url,
        } => {
            let request = OAuthRequest {
                provider,
                code,
                code_verifier,
                redirect_url,
                create_data: None,
            };
            auth::sign_in_with_oauth(&request).await?
        }
        AuthAction::RequestReset { email } => {
            auth::request_password_reset(&email).await?;
            json!({ "requested": true, "email": email })
        }
        AuthAction::ConfirmReset { token, password } => {
            let password = password_or_prompt(password, "New password: ")?;
            auth::confirm_password_reset(&token, &password).await?;
            json!({ "confirmed": true })
        }
        AuthAction::UpdatePassword {
            email,
            old_password,
            new_password,
        } => {
            let old_password = password_or_prompt(old_password, "Current password: ")?;
            let new_password = password_or_prompt(new_password, "New password: ")?;
            auth::sign_in_with_email(&email, &old_password).await?;
            auth::update_password(&old_password, &new_password).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result)
}

fn password_or_prompt(password: Option<String>, prompt: &str) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => prompt_secret(prompt),
    }
}

fn parse_extra_fields(raw: &str) -> Result<Record> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(KitError::ValidationError {
            message: "--data must be a JSON object".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_fields_must_be_object() {
        let fields = parse_extra_fields(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(fields["name"], "Ada");

        assert!(matches!(
            parse_extra_fields("[1, 2]"),
            Err(KitError::ValidationError { .. })
        ));
        assert!(parse_extra_fields("not json").is_err());
    }
}
