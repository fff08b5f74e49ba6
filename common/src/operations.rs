//! Operations passed to [`Handler`]s.
//!
//! Each operation is a plain wrapper naming *what* to do with its payload,
//! while the [`Handler`] implementation decides *how*. This lets the same
//! operation be executed by different storages.

use std::marker::PhantomData;

use crate::Handler;

/// Persists a new value.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an already persisted value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Reads a value, usually described by a [`By`] selector.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Takes a share of a limited resource, such as room units or promo
/// redemptions.
///
/// Either the whole share is taken or nothing is, so handlers return whether
/// it succeeded.
#[derive(Clone, Copy, Debug)]
pub struct Acquire<T>(pub T);

/// Gives back a share previously taken by [`Acquire`].
#[derive(Clone, Copy, Debug)]
pub struct Release<T>(pub T);

/// Excludes concurrent modifications of a value until the end of the current
/// [`Transact`]ion.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Spawns a long-running value, such as a periodic task.
#[derive(Clone, Copy, Debug)]
pub struct Start<T>(pub T);

/// Runs a value once to completion.
#[derive(Clone, Copy, Debug)]
pub struct Perform<T>(pub T);

/// Begins a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handle of a transaction begun by [`Transact`] on `T`.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Makes every change of a [`Transacted`] handle durable.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Discards every change of a [`Transacted`] handle.
#[derive(Clone, Copy, Debug)]
pub struct Rollback;

/// Selector of a `W` by a `B` key.
///
/// The same key may select different things, so `W` disambiguates them:
/// ```rust
/// # use common::operations::By;
/// struct Nights;
/// struct Guests;
///
/// let nights = By::<Nights, &str>::new("ABC123");
/// let guests = By::<Guests, &str>::new("ABC123");
/// assert_eq!(nights.into_inner(), guests.into_inner());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Selected type.
    _what: PhantomData<W>,

    /// Key to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector out of the provided key.
    #[must_use]
    pub const fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Unwraps the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}
