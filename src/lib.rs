//! Secure group messaging: epoch-keyed group sessions over hybrid public-key
//! encryption, with a canonical binary codec for everything on the wire.

pub mod codec;

mod error;
pub use error::Error;

mod group;
pub use group::*;

mod hpke;
pub use hpke::*;

mod types;
