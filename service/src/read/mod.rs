//! Read entities definitions.

pub mod bill;
pub mod member;
