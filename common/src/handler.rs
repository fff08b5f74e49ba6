//! [`Handler`] abstraction every command, query, task and database
//! operation is expressed with.

use std::future::Future;

/// Something able to asynchronously process `Args`.
///
/// A single type usually implements [`Handler`] many times, once per kind of
/// `Args` it understands, so the `Args` type alone picks the behavior:
/// ```rust
/// use std::convert::Infallible;
///
/// use common::Handler;
///
/// struct Nights;
///
/// impl Handler<(u16, u16)> for Nights {
///     type Ok = u16;
///     type Err = Infallible;
///
///     async fn execute(
///         &self,
///         (check_in, check_out): (u16, u16),
///     ) -> Result<u16, Infallible> {
///         Ok(check_out.saturating_sub(check_in))
///     }
/// }
/// ```
pub trait Handler<Args = ()> {
    /// Outcome of successfully handled `Args`.
    type Ok;

    /// Reason of `Args` not being handled.
    type Err;

    /// Handles the provided `Args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
