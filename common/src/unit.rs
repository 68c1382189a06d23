//! Marker types distinguishing kinds of dates of the same entity.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a deadline an entity is due by.
#[derive(Clone, Copy, Debug)]
pub struct Due;

/// Marker type describing an entity payment.
#[derive(Clone, Copy, Debug)]
pub struct Payment;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
