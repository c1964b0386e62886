//! # Shared Types Crate
//!
//! Types every custody-chain crate agrees on.
//!
//! ## Contents
//!
//! - **Identity**: [`Role`], [`OrganizationId`], [`CallerIdentity`], [`Party`]
//! - **Time**: [`Timestamp`], the only clock the contract core sees
//! - **Failures**: [`FailureKind`] and [`ContractError`], the stable error shape
//!   returned to callers
//!
//! ## Design Principles
//!
//! - **Caller identity is external**: role and organization arrive already
//!   authenticated from the identity layer; nothing here inspects credentials.
//! - **One failure shape at the boundary**: subsystem crates keep rich error
//!   enums internally and convert to [`ContractError`] at the edge.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
