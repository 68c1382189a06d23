//! [`Command`] definition.

pub mod authorize_access;
pub mod delete_bill;
pub mod delete_member;
pub mod generate_all_bills;
pub mod generate_bill;
pub mod issue_access_token;
pub mod record_payment;
pub mod register_member;
pub mod sweep_overdue_bills;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_access::AuthorizeAccess, delete_bill::DeleteBill,
    delete_member::DeleteMember, generate_all_bills::GenerateAllBills,
    generate_bill::GenerateBill, issue_access_token::IssueAccessToken,
    record_payment::RecordPayment, register_member::RegisterMember,
    sweep_overdue_bills::SweepOverdueBills,
};
