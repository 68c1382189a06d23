//! Domain definitions.

pub mod access;
pub mod bill;
pub mod member;
pub mod tariff;

pub use self::{
    access::Access, bill::Bill, member::Member, tariff::Tariff,
};
