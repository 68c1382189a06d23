//! [`SweepOverdueBills`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Bill;
use crate::{command, Command, Service};

use super::Task;

/// Configuration for [`SweepOverdueBills`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Indicator whether the [`Task`] runs at all.
    pub enabled: bool,

    /// Interval between sweeps.
    pub interval: time::Duration,
}

/// [`Task`] periodically marking unpaid [`Bill`]s past their due date as
/// overdue.
#[derive(Clone, Copy, Debug)]
pub struct SweepOverdueBills<S> {
    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<SweepOverdueBills<Self>, Config>>> for Service<Db>
where
    SweepOverdueBills<Service<Db>>:
        Task<Perform<()>, Ok = usize, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SweepOverdueBills<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Config { enabled, interval: period } = by.into_inner();
        if !enabled {
            log::debug!("`task::SweepOverdueBills` is disabled");
            return Ok(());
        }

        let task = SweepOverdueBills {
            service: self.clone(),
        };
        let mut interval = interval(period);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => log::info!("{n} bills became overdue"),
                Err(e) => {
                    log::error!("`task::SweepOverdueBills` failed: {e}");
                }
            }
        }
    }
}

impl<Db> Task<Perform<()>> for SweepOverdueBills<Service<Db>>
where
    Service<Db>: Command<
        command::SweepOverdueBills,
        Ok = usize,
        Err = Traced<command::sweep_overdue_bills::ExecutionError>,
    >,
{
    type Ok = usize;
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service
            .execute(command::SweepOverdueBills)
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`SweepOverdueBills`] execution.
pub type ExecutionError = Traced<command::sweep_overdue_bills::ExecutionError>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Perform, Start},
        Date,
    };

    use crate::{infra::Memory, testing, Task as _};

    use super::{Config, SweepOverdueBills};

    #[tokio::test]
    async fn disabled_task_finishes_immediately() {
        let svc = testing::service(Memory::default());

        let started = svc
            .execute(Start(By::new(Config {
                enabled: false,
                interval: Duration::from_millis(1),
            })))
            .await;

        assert!(started.is_ok());
    }

    #[tokio::test]
    async fn performs_sweep() {
        let member = testing::member("303");
        let db = Memory::with_members([member.clone()]);
        let mut bill = testing::bill(&member, 1, 2024);
        bill.due_date = Date::today().previous_day().unwrap().coerce();
        db.put_bill(bill);

        let task = SweepOverdueBills {
            service: testing::service(db),
        };

        assert_eq!(task.execute(Perform(())).await.unwrap(), 1);
        assert_eq!(task.execute(Perform(())).await.unwrap(), 0);
    }
}
