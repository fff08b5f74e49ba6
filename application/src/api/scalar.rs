//! GraphQL scalar definitions.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Helper type to use in `#[graphql(with = ..)]` attribute.
///
/// Represents the target type as a GraphQL string, going through the
/// [`FromStr`]/[`Display`] impls of the `As` type, which the target type must
/// be [`TryFrom`] and [`AsRef`].
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Outputs the target type as a string scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Parses the target type from a string scalar [`InputValue`].
    ///
    /// # Errors
    ///
    /// If the `input` is not a string, or doesn't parse into `As`, or `As`
    /// isn't convertible into the target type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let name = name_of::<T, S>();
        let s = input.as_string_value().ok_or_else(|| {
            format!("Cannot parse `{name}` input scalar from {input}")
        })?;
        let parsed = s.parse::<As>().map_err(|e| {
            format!("Cannot parse `{name}` input scalar from \"{s}\": {e}")
        })?;
        T::try_from(parsed)
            .map_err(|e| format!("Invalid `{name}` input scalar: {e}"))
    }

    /// Parses the provided [`ScalarToken`] as a [`String`].
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

/// Returns the GraphQL name of the `T` type.
fn name_of<T, S>() -> String
where
    T: GraphQLType<S, TypeInfo = ()>,
    S: ScalarValue,
{
    T::name(&()).map_or_else(|| "<unnamed>".to_owned(), ToOwned::to_owned)
}
