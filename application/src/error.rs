//! [`Error`]-related definitions.

use std::fmt;

use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::infra::database;
use tracerr::{Trace, Traced};
use tracing as log;

/// Defines an enum of client-facing failures convertible into [`Error`]s.
///
/// Every variant declares its machine-readable `code`, the HTTP `status` of
/// the response it fails, and a human-readable `message`.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Client-facing failure.
        #[derive(
            Clone,
            Copy,
            Debug,
            Eq,
            PartialEq,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl $name {
            /// Returns the machine-readable code of this failure.
            #[must_use]
            pub const fn code(self) -> $crate::error::Code {
                match self {
                    $( Self::$variant => $code, )*
                }
            }
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                Self {
                    code: err.code(),
                    status_code: match err {
                        $(
                            $name::$variant => {
                                ::http::StatusCode::$status_code
                            }
                        )*
                    },
                    message: err.to_string(),
                    backtrace: None,
                }
            }
        }
    };
}

/// Failure of a GraphQL operation, as reported to the client.
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// Machine-readable code of this [`Error`].
    pub code: Code,

    /// [`http::StatusCode`] the response should be failed with.
    pub status_code: http::StatusCode,

    /// Place in the code this [`Error`] was raised at.
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// Human-readable description of this [`Error`].
    pub message: String,
}

impl Error {
    /// Code of an unexpected [`Error`].
    pub const INTERNAL: Code = "INTERNAL_SERVER_ERROR";

    /// Creates a new [`Error`] of an unexpected failure.
    ///
    /// The `cause` is logged, while the client sees only a generic message,
    /// so no database or infrastructure details leak out.
    #[must_use]
    pub fn internal(cause: impl fmt::Display) -> Self {
        log::error!("unexpected failure: {cause}");
        Self {
            code: Self::INTERNAL,
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_owned(),
            backtrace: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code,
            backtrace,
            message,
        } = self;

        write!(
            f,
            "[{code}|{}]: {message}{}",
            status_code.as_u16(),
            backtrace
                .iter()
                .format_with("", |trace, f| f(&format_args!("\n{trace}"))),
        )
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let mut ext = juniper::Object::with_capacity(2);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        // Traces reveal the code layout, so they're exposed to clients only
        // in debug builds.
        if cfg!(debug_assertions) {
            drop(
                ext.add_field(
                    "backtrace",
                    juniper::Value::list(
                        self.backtrace
                            .iter()
                            .flat_map(|trace| trace.iter())
                            .map(|frame| {
                                juniper::Value::scalar(frame.to_string())
                            })
                            .collect(),
                    ),
                ),
            );
        }
        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// Machine-readable code of an [`Error`], like `SOLD_OUT`.
pub type Code = &'static str;

/// Conversion of a failure into a client-facing [`Error`].
pub trait AsError {
    /// Returns the client-facing [`Error`] describing this failure.
    ///
    /// [`None`] means the failure is unexpected, so clients should see an
    /// internal [`Error`] only.
    fn try_as_error(&self) -> Option<Error>;

    /// Converts this failure into an [`Error`], falling back to an internal
    /// one.
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error().unwrap_or_else(|| Error::internal(self))
    }

    /// Converts this failure into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        None
    }
}

#[cfg(test)]
mod spec {
    use derive_more::Display;
    use juniper::{DefaultScalarValue, IntoFieldError as _};

    use super::{AsError, Error};

    crate::define_error! {
        enum Failure {
            #[code = "SOLD_OUT"]
            #[status = CONFLICT]
            #[message = "No rooms left"]
            SoldOut,

            #[code = "INVALID_STAY"]
            #[status = BAD_REQUEST]
            #[message = "Check-out must be after check-in"]
            InvalidStay,
        }
    }

    #[derive(Debug, Display)]
    #[display("{_0:?}")]
    struct Raw(Option<Failure>);

    impl AsError for Raw {
        fn try_as_error(&self) -> Option<Error> {
            self.0.map(Into::into)
        }
    }

    #[test]
    fn converts_defined_errors() {
        let err = Error::from(Failure::SoldOut);

        assert_eq!(err.code, "SOLD_OUT");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert_eq!(err.message, "No rooms left");
        assert_eq!(Failure::InvalidStay.code(), "INVALID_STAY");
        assert_eq!(err.to_string(), "[SOLD_OUT|409]: No rooms left");
    }

    #[test]
    fn hides_unexpected_failures() {
        let err = Raw(None).into_error();

        assert_eq!(err.code, Error::INTERNAL);
        assert_eq!(err.status_code, http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn attaches_trace_of_expected_failures() {
        let traced = tracerr::new!(Raw(Some(Failure::InvalidStay)));

        let err = traced.as_error();
        assert_eq!(err.code, "INVALID_STAY");
        assert!(err.backtrace.is_some());
    }

    #[test]
    fn exposes_code_in_extensions() {
        let field_err: juniper::FieldError<DefaultScalarValue> =
            Error::from(Failure::SoldOut).into_field_error();

        assert_eq!(field_err.message(), "No rooms left");
        assert_eq!(
            field_err
                .extensions()
                .as_object_value()
                .and_then(|o| o.get_field_value("code"))
                .and_then(juniper::Value::as_string_value),
            Some("SOLD_OUT"),
        );
    }
}
