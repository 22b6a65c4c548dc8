//! `registry-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the clock seam, EPP resources and the typed keys used to refer
//! to them from deferred tasks.

pub mod clock;
pub mod error;
pub mod id;
pub mod key;
pub mod resource;
pub mod trid;
pub mod value_object;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error::DomainError;
pub use id::{RegistrarId, RepoId};
pub use key::EntityKey;
pub use resource::{Contact, EppResource, Host};
pub use trid::Trid;
pub use value_object::ValueObject;
