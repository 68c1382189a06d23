//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Type-erased error of a [`Task`] running in the [`Background`].
type BoxError = Box<dyn Error + 'static>;

/// Background environment for running [`Task`]s.
///
/// [`Task`]s aren't required to be [`Send`], so they're run on the thread
/// awaiting this [`Background`].
#[derive(Debug, Default)]
pub struct Background {
    /// Local set the [`Task`]s are spawned into.
    set: task::LocalSet,

    /// Handles of the spawned [`Task`]s.
    handles: Vec<task::JoinHandle<Result<(), BoxError>>>,
}

impl Background {
    /// Spawns a new [`Task`] inside this [`Background`] environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        let handle = self
            .set
            .spawn_local(future.map_err(|e| BoxError::from(Box::new(e))));
        self.handles.push(handle);
    }
}

impl IntoFuture for Background {
    type Output = Result<(), BoxError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    /// Resolves once all the spawned [`Task`]s finish, or any of them fails.
    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        let all = future::try_join_all(handles.into_iter().map(|h| {
            h.map(|joined| match joined {
                Ok(res) => res,
                Err(e) => Err(BoxError::from(e)),
            })
        }));
        async move { set.run_until(all).await.map(drop) }.boxed_local()
    }
}
