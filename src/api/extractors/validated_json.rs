//! JSON extractor that runs `validator` rules before the handler sees
//! the payload. Malformed bodies and failed rules both map to 400.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        if let Err(errors) = payload.validate() {
            return Err(AppError::validation(collect_messages(&errors)));
        }

        Ok(ValidatedJson(payload))
    }
}

/// Flatten rule failures into one comma-separated message. Rules without
/// an explicit message fall back to naming the field.
fn collect_messages(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = Vec::new();

    for (field, errs) in errors.field_errors() {
        for err in errs {
            match &err.message {
                Some(message) => messages.push(message.to_string()),
                None => messages.push(format!("{} is invalid", field)),
            }
        }
    }

    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[test]
    fn rule_messages_surface_verbatim() {
        let bad = Payload {
            email: "not-an-email".to_string(),
        };
        let errors = bad.validate().unwrap_err();

        assert_eq!(collect_messages(&errors), "Invalid email format");
    }
}
