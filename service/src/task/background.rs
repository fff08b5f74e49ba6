//! [`Background`] environment running [`Task`]s alongside the [`Service`].

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tracing as log;

#[cfg(doc)]
use crate::{Service, Task};

/// Error a [`Background`] [`Task`] stopped with.
pub type TaskError = Box<dyn Error + 'static>;

/// Set of long-running [`Task`]s driven together on the current thread.
///
/// Nothing runs until the [`Background`] is awaited. The awaiting resolves
/// as soon as any [`Task`] fails, or once all of them finish.
#[derive(Default)]
pub struct Background {
    /// Named [`Task`] loops to drive.
    tasks: Vec<(&'static str, LocalBoxFuture<'static, Result<(), TaskError>>)>,
}

impl Background {
    /// Registers a new [`Task`] loop under the provided `name`.
    pub fn spawn<F, E>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.tasks.push((
            name,
            task.map_err(move |e| {
                log::error!("background `{name}` task failed: {e}");
                TaskError::from(Box::new(e))
            })
            .boxed_local(),
        ));
    }

    /// Returns names of the registered [`Task`]s.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tasks.iter().map(|(name, _)| *name)
    }
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), TaskError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        future::try_join_all(self.tasks.into_iter().map(|(name, task)| {
            log::debug!("background `{name}` task started");
            task
        }))
        .map_ok(drop)
        .boxed_local()
    }
}

#[cfg(test)]
mod spec {
    use std::{
        cell::Cell,
        fmt,
        future::{self, IntoFuture as _},
        rc::Rc,
    };

    use super::Background;

    #[derive(Debug)]
    struct Broken;

    impl fmt::Display for Broken {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "broken")
        }
    }

    impl std::error::Error for Broken {}

    #[tokio::test]
    async fn runs_nothing_until_awaited() {
        let ran = Rc::new(Cell::new(false));

        let mut bg = Background::default();
        let flag = Rc::clone(&ran);
        bg.spawn("flag", async move {
            flag.set(true);
            Ok::<_, Broken>(())
        });

        assert!(!ran.get());
        assert_eq!(bg.names().collect::<Vec<_>>(), ["flag"]);

        bg.into_future().await.expect("no task fails");
        assert!(ran.get());
    }

    #[tokio::test]
    async fn resolves_on_first_failure() {
        let mut bg = Background::default();
        bg.spawn("endless", future::pending::<Result<(), Broken>>());
        bg.spawn("broken", async { Err::<(), _>(Broken) });

        let err = bg.into_future().await.expect_err("`broken` task fails");
        assert_eq!(err.to_string(), "broken");
    }

    #[tokio::test]
    async fn empty_resolves_immediately() {
        Background::default()
            .into_future()
            .await
            .expect("nothing to fail");
    }
}
