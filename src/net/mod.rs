//! Contains the demultiplexing of captured frames down to the UDP payloads.

mod connection;
mod decoder;
mod fragments;
pub mod tecmp;

pub use connection::*;
pub use decoder::*;
pub use fragments::*;
