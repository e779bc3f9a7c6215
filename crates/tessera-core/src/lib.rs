//! # tessera-core: Self-Validating Value Objects
//!
//! The leaf crate of the Tessera workspace. It defines small immutable
//! value types that check their own invariants at construction, so that an
//! instance which exists is an instance which is valid.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** `Token`, `Secret`, `CorrelationId`,
//!    `ClockSkew`, `TimeToLive` and `UtcInstant` all wrap a primitive behind
//!    a fallible constructor. There is no unchecked public path in.
//!
//! 2. **One error type.** Every constructor returns [`ValidationError`].
//!    Callers branch on [`ErrorKind`] rather than on message text.
//!
//! 3. **UTC-only instants with tick precision.** [`UtcInstant`] refuses
//!    zone-less input and truncates to 100 ns so that its canonical text
//!    round-trips exactly.
//!
//! 4. **Injectable time.** Anything that reads "now" has a twin taking an
//!    explicit anchor or a [`Clock`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tessera-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Deserialization re-runs construction checks.

pub mod duration;
pub mod error;
pub mod identity;
pub mod temporal;
pub mod token;

// Re-export primary types for ergonomic imports.
pub use duration::{BoundedDuration, ClockSkew, TimeToLive};
pub use error::{ErrorKind, ValidationError};
pub use identity::{CorrelationId, Secret};
pub use temporal::{Clock, FixedClock, SystemClock, UtcInstant};
pub use token::{validate_token, Token, TokenOptions};
