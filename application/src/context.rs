//! [`Context`]-related definitions.

use std::sync::{
    atomic::{self, AtomicU16},
    Arc,
};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use secrecy::{ExposeSecret as _, SecretString};
use tokio::sync::OnceCell;

use crate::{define_error, AsError, Error, JuniperResponse, Service};

/// Application context.
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// [`Admin`] credentials to authenticate requests against.
    admin: Arc<Admin>,

    /// Error status code.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// Result of authenticating the HTTP request as an [`Admin`] one.
    admin_auth: OnceCell<Result<(), Error>>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the error status code of this [`Context`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .expect("invalid status code")
    }

    /// Sets the error status code for this [`Context`].
    ///
    /// Provided [`http::StatusCode`] will be applied to the response.
    pub fn set_error_status_code(&self, status_code: http::StatusCode) {
        self.error_status_code
            .store(status_code.as_u16(), atomic::Ordering::Relaxed);
    }

    /// Helper method calling [`Context::set_error_status_code()`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.set_error_status_code(err.status_code);
            err
        }
    }

    /// Ensures the current HTTP request is made by an [`Admin`].
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current HTTP request is not authorized;
    /// - the provided bearer token is not the [`Admin`] one;
    /// - the administrative API is disabled.
    pub async fn require_admin(&self) -> Result<(), Error> {
        self.admin_auth
            .get_or_init(|| self.authenticate_admin())
            .await
            .clone()
            .map_err(self.error())
    }

    /// Performs the [`Admin`] authentication.
    async fn authenticate_admin(&self) -> Result<(), Error> {
        let res = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await;
        match res {
            Ok(TypedHeader(Authorization(bearer))) => self
                .admin
                .verify(bearer.token())
                .map_err(Error::from),
            Err(e) => {
                if e.is_missing() {
                    Err(AuthError::AuthorizationRequired.into())
                } else {
                    Err(e.into_error())
                }
            }
        }
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let missing = |ext: &str| JuniperResponse {
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            response: GraphQLBatchResponse::Single(GraphQLResponse::error(
                Error::internal(format_args!("missing `{ext}` extension"))
                    .into_field_error(),
            )),
        };

        let service = parts
            .extensions
            .get::<Service>()
            .cloned()
            .ok_or_else(|| missing("Service"))?;
        let admin = parts
            .extensions
            .get::<Arc<Admin>>()
            .cloned()
            .ok_or_else(|| missing("Admin"))?;

        Ok(Self {
            service,
            admin,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
            admin_auth: OnceCell::new(),
        })
    }
}

/// Hotel administration, identified by a single bearer token.
#[derive(Debug, Default)]
pub struct Admin {
    /// Bearer token of this [`Admin`].
    ///
    /// Nobody is authenticated as an [`Admin`] if [`None`].
    token: Option<SecretString>,
}

impl Admin {
    /// Creates a new [`Admin`] identified by the provided bearer `token`.
    #[must_use]
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }

    /// Indicates whether the administrative API is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Verifies the `provided` bearer token against this [`Admin`]'s one.
    fn verify(&self, provided: &str) -> Result<(), AuthError> {
        let expected = self.token.as_ref().ok_or(AuthError::AdminDisabled)?;
        if constant_time_eq(
            expected.expose_secret().as_bytes(),
            provided.as_bytes(),
        ) {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

/// Compares the provided byte strings in time depending only on their lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = FORBIDDEN]
        #[message = "Provided token does not grant administrative access"]
        InvalidToken,

        #[code = "ADMIN_DISABLED"]
        #[status = FORBIDDEN]
        #[message = "Administrative API is disabled"]
        AdminDisabled,
    }
}

#[cfg(test)]
mod spec {
    use secrecy::SecretString;

    use super::{constant_time_eq, Admin, AuthError};

    #[test]
    fn compares_tokens_exactly() {
        assert!(constant_time_eq(b"s3cr3t", b"s3cr3t"));
        assert!(!constant_time_eq(b"s3cr3t", b"s3cr3T"));
        assert!(!constant_time_eq(b"s3cr3t", b"s3cr3"));
        assert!(!constant_time_eq(b"", b"s"));
    }

    #[test]
    fn verifies_admin_token() {
        let admin = Admin::new(Some(SecretString::from("s3cr3t".to_owned())));

        assert!(admin.is_enabled());
        assert!(admin.verify("s3cr3t").is_ok());
        assert!(matches!(
            admin.verify("guess"),
            Err(AuthError::InvalidToken),
        ));
    }

    #[test]
    fn disabled_admin_rejects_everyone() {
        let admin = Admin::default();

        assert!(!admin.is_enabled());
        assert!(matches!(admin.verify(""), Err(AuthError::AdminDisabled)));
    }
}
