//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `Member` of the society.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email.as_ref().map(ToString::to_string),
            flat_num = %flat_num,
            gql.name = "registerMember",
            kind = ?kind,
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn register_member(
        name: api::member::Name,
        flat_num: api::member::FlatNum,
        kind: api::member::Kind,
        contact: Option<api::member::Phone>,
        email: Option<api::member::Email>,
        ctx: &Context,
    ) -> Result<api::Member, Error> {
        _ = ctx.admin_access().await?;

        ctx.service()
            .execute(command::RegisterMember {
                name: name.into(),
                flat_num: flat_num.into(),
                contact: contact.map(Into::into),
                email: email.map(Into::into),
                kind: kind.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Member` having no `Bill`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration;
    /// - `MEMBER_NOT_FOUND` - the `Member` with the provided ID does not
    ///                        exist;
    /// - `MEMBER_HAS_BILLS` - the `Member` has `Bill`s generated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteMember",
            member_id = %member_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_member(
        member_id: api::member::Id,
        ctx: &Context,
    ) -> Result<api::Member, Error> {
        _ = ctx.admin_access().await?;

        ctx.service()
            .execute(command::DeleteMember {
                member_id: member_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Generates the `Bill` of the `Member` for the provided billing period.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration;
    /// - `INVALID_PERIOD` - the `month` or the `year` is out of range;
    /// - `MEMBER_NOT_FOUND` - the `Member` with the provided ID does not
    ///                        exist;
    /// - `DUPLICATE_BILL` - the `Member` is billed for the period already.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "generateBill",
            member_id = %member_id,
            month = month,
            otel.name = Self::SPAN_NAME,
            year = year,
        ),
    )]
    pub async fn generate_bill(
        member_id: api::member::Id,
        month: i32,
        year: i32,
        ctx: &Context,
    ) -> Result<api::Bill, Error> {
        _ = ctx.admin_access().await?;
        let period = api::bill::period(month, year).map_err(ctx.error())?;

        ctx.service()
            .execute(command::GenerateBill {
                member_id: member_id.into(),
                period,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Generates `Bill`s of all the `Member`s for the provided billing
    /// period, skipping the ones billed already.
    ///
    /// Returns the number of the generated `Bill`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration;
    /// - `INVALID_PERIOD` - the `month` or the `year` is out of range.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "generateAllBills",
            month = month,
            otel.name = Self::SPAN_NAME,
            year = year,
        ),
    )]
    pub async fn generate_all_bills(
        month: i32,
        year: i32,
        ctx: &Context,
    ) -> Result<i32, Error> {
        _ = ctx.admin_access().await?;
        let period = api::bill::period(month, year).map_err(ctx.error())?;

        let generated = ctx
            .service()
            .execute(command::GenerateAllBills { period })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        i32::try_from(generated)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Records a payment of the `Bill`, marking it as paid.
    ///
    /// Residents may pay their own `Bill`s only.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BILL_NOT_FOUND` - the `Bill` with the provided ID does not exist;
    /// - `NOT_BILL_OWNER` - the `Bill` is issued to another `Member`;
    /// - `BILL_NOT_PAYABLE` - the `Bill` is paid already.
    #[tracing::instrument(
        skip_all,
        fields(
            bill_id = %bill_id,
            gql.name = "payBill",
            method = %method,
            otel.name = Self::SPAN_NAME,
            transaction_id = %transaction_id,
        ),
    )]
    pub async fn pay_bill(
        bill_id: api::bill::Id,
        method: api::bill::PaymentMethod,
        transaction_id: api::bill::TransactionId,
        remarks: Option<api::bill::Remarks>,
        ctx: &Context,
    ) -> Result<api::Bill, Error> {
        let by = ctx.current_access().await?;

        ctx.service()
            .execute(command::RecordPayment {
                bill_id: bill_id.into(),
                by,
                method: method.into(),
                transaction_id: transaction_id.into(),
                remarks: remarks.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks all the unpaid `Bill`s past their due date as overdue, charging
    /// the late fee.
    ///
    /// Returns the number of the `Bill`s marked.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "sweepOverdueBills",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sweep_overdue_bills(ctx: &Context) -> Result<i32, Error> {
        _ = ctx.admin_access().await?;

        let marked = ctx
            .service()
            .execute(command::SweepOverdueBills)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        i32::try_from(marked)
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Deletes the `Bill`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NOT_ADMIN` - the current access doesn't belong to the
    ///                 administration;
    /// - `BILL_NOT_FOUND` - the `Bill` with the provided ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            bill_id = %bill_id,
            gql.name = "deleteBill",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_bill(
        bill_id: api::bill::Id,
        ctx: &Context,
    ) -> Result<api::Bill, Error> {
        _ = ctx.admin_access().await?;

        ctx.service()
            .execute(command::DeleteBill {
                bill_id: bill_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::generate_bill::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "DUPLICATE_BILL"]
                #[status = CONFLICT]
                #[message = "`Member` is billed for the provided period \
                             already"]
                DuplicateBill,

                #[code = "MEMBER_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Member` with the provided ID does not exist"]
                MemberNotFound,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::DuplicateBill { .. } => Error::DuplicateBill.into(),
            Self::MemberNotFound(_) => Error::MemberNotFound.into(),
        })
    }
}

impl AsError for command::record_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "BILL_NOT_FOUND"]
                #[status = NOT_FOUND]
                #[message = "`Bill` with the provided ID does not exist"]
                BillNotFound,

                #[code = "BILL_NOT_PAYABLE"]
                #[status = CONFLICT]
                #[message = "`Bill` with the provided ID is paid already"]
                BillNotPayable,

                #[code = "NOT_BILL_OWNER"]
                #[status = FORBIDDEN]
                #[message = "`Bill` with the provided ID is issued to another \
                             `Member`"]
                NotBillOwner,
            }
        }

        Some(match self {
            Self::BillNotFound(_) => Error::BillNotFound.into(),
            Self::BillNotPayable { .. } => Error::BillNotPayable.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NotBillOwner(_) => Error::NotBillOwner.into(),
        })
    }
}

impl AsError for command::delete_bill::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::BillNotFound(_) => api::bill::BillError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
        })
    }
}

impl AsError for command::delete_member::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "MEMBER_HAS_BILLS"]
                #[status = CONFLICT]
                #[message = "`Member` with the provided ID has `Bill`s \
                             generated"]
                MemberHasBills,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::MemberHasBills(_) => Error::MemberHasBills.into(),
            Self::MemberNotFound(_) => {
                api::member::MemberError::NotExists.into()
            }
        })
    }
}
