//! Implementation modules behind the `storage::store` facade.
//!
//! Each function takes a borrowed connection; the facade owns locking and
//! transaction boundaries.

pub(crate) mod folders;
pub(crate) mod responses;
pub(crate) mod rounds;
pub(crate) mod schema;
pub(crate) mod stories;
pub(crate) mod txn;
