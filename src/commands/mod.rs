//! Backend Commands
//!
//! Frontend bindings to the data store, the auth provider and the channel
//! control API, organized by domain.

mod client;
mod channels;
mod hours;
mod leads;
mod profile;
mod session;

pub use channels::*;
pub use client::*;
pub use hours::*;
pub use leads::*;
pub use profile::*;
pub use session::*;
