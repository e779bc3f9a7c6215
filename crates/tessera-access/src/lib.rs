//! # tessera-access: Access Keys
//!
//! A secret bound to a UTC validity window with clock-skew tolerance.
//!
//! - [`AccessKeyOptions`]: partial, serde-configurable window description,
//!   validated into an [`AccessKey`].
//! - [`AccessKey`]: immutable key with `valid_from <= expires`, created with
//!   [`AccessKey::new`] or [`AccessKey::issue`].
//! - Window evaluation: [`AccessKey::is_valid`] and its explicit-instant and
//!   explicit-clock forms.
//!
//! ## Crate Policy
//!
//! - Depends only on `tessera-core` within the workspace.
//! - Time is read only through [`tessera_core::Clock`].

pub mod key;
pub mod options;
mod validity;

pub use key::AccessKey;
pub use options::AccessKeyOptions;
