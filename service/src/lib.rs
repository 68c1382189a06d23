//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use common::operations::{By, Start};
use derive_more::{Debug, Display, Error};

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`domain::Tariff`] applied to the generated bills.
    pub tariff: domain::Tariff,

    /// [`task::SweepOverdueBills`] configuration.
    pub sweep_overdue_bills: task::sweep_overdue_bills::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters, along with the
    /// [`task::Background`] its periodic [`Task`]s run in.
    pub fn new(config: Config, database: Db) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::SweepOverdueBills<Self>,
                        task::sweep_overdue_bills::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service { config, database };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().sweep_overdue_bills)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}

/// Shortcut for the error of starting a [`Task`].
type TaskStartError<Svc, T, Args> = <Svc as Task<Start<By<T, Args>>>>::Err;

/// Error of starting a [`Service`].
#[derive(Debug, Display, Error)]
pub enum StartupError<Svc>
where
    Svc: Task<
        Start<
            By<
                task::SweepOverdueBills<Svc>,
                task::sweep_overdue_bills::Config,
            >,
        >,
    >,
{
    /// [`task::SweepOverdueBills`] failed to start.
    SweepOverdueBillsTask(
        TaskStartError<
            Svc,
            task::SweepOverdueBills<Svc>,
            task::sweep_overdue_bills::Config,
        >,
    ),
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for testing [`Service`] operations.

    use std::time::Duration;

    use common::DateTime;

    use crate::{
        domain::{bill::Period, member, Bill, Member, Tariff},
        infra::Memory,
        task, Config, Service,
    };

    /// Creates a new [`Service`] on top of the provided [`Memory`] database,
    /// without running any background tasks.
    pub(crate) fn service(database: Memory) -> Service<Memory> {
        Service {
            config: Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    b"test",
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    b"test",
                ),
                tariff: Tariff::default(),
                sweep_overdue_bills: task::sweep_overdue_bills::Config {
                    enabled: false,
                    interval: Duration::from_secs(60),
                },
            },
            database,
        }
    }

    /// Creates a new [`Member`] living in the provided `flat`.
    pub(crate) fn member(flat: &str) -> Member {
        Member {
            id: member::Id::new(),
            name: member::Name::new(format!("Resident of {flat}")).unwrap(),
            flat_num: member::FlatNum::new(flat).unwrap(),
            contact: None,
            email: None,
            kind: member::Kind::Owner,
            joined_at: DateTime::now().coerce(),
        }
    }

    /// Generates a new [`Bill`] of the provided [`Member`] for the provided
    /// `month` and `year` with the default [`Tariff`].
    pub(crate) fn bill(member: &Member, month: u8, year: i32) -> Bill {
        Bill::generate(
            member,
            Period::new(month, year).unwrap(),
            &Tariff::default(),
        )
    }
}
