//! Request body extraction with the API's error envelope.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use axum_valid::{Valid, ValidRejection};
use tracing::debug;
use validator::ValidationErrors;

use crate::error::{error_response, HandlerError};

/// JSON body that has passed its `validator` rules.
///
/// Malformed JSON, missing fields and rule violations are all answered
/// with `400 INVALID_INPUT`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Send,
    Valid<Json<T>>: FromRequest<S, Rejection = ValidRejection<JsonRejection>>,
{
    type Rejection = HandlerError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Valid::<Json<T>>::from_request(request, state).await {
            Ok(Valid(Json(value))) => Ok(Self(value)),
            Err(ValidRejection::Valid(errors)) => {
                let message = describe(&errors);
                debug!("Request body failed validation: {}", message);
                Err(error_response(StatusCode::BAD_REQUEST, "INVALID_INPUT", message))
            }
            Err(ValidRejection::Inner(rejection)) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(error_response(
                    StatusCode::BAD_REQUEST,
                    "INVALID_INPUT",
                    rejection.body_text(),
                ))
            }
        }
    }
}

/// `field: message` pairs joined with `; `, sorted by field.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |e| match &e.message {
                Some(message) => format!("{field}: {message}"),
                None => format!("{field}: invalid value ({})", e.code),
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::RegisterRequest;
    use validator::Validate;

    #[test]
    fn test_describe_lists_every_field() {
        let request = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: "Sam".to_string(),
        };

        let errors = request.validate().unwrap_err();

        assert_eq!(
            describe(&errors),
            "email: invalid email address; password: password must be at least 8 characters"
        );
    }
}
