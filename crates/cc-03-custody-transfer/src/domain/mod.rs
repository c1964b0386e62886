//! Domain layer: records, storage layout, errors.

pub mod errors;
pub mod invocation;
pub mod keys;
pub mod note;
pub mod outcome;
pub mod register;
pub mod waybill;
