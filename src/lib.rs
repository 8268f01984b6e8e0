//! Streaming decoder extracting application payloads from PcapNg captures.
//!
//! The capture is fed in chunks of any size to a [`PcapNgDecoder`](pcapng::PcapNgDecoder).
//! Every captured frame is demultiplexed (Ethernet or Linux cooked capture, up to two
//! VLAN tags, optionally tunneled in TECMP) down to IPv4 and UDP. Fragmented datagrams
//! are reassembled, and the payload of every UDP flow is handed to its own
//! [`TraceDecoder`], created by a [`TraceDecoderFactory`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::fs::File;
//! use pcapng_payload::pcapng::PcapNgStreamReader;
//! use pcapng_payload::PayloadDecoderFactory;
//!
//! let file_in = File::open("test.pcapng").expect("Error opening file");
//!
//! for line in PcapNgStreamReader::new(file_in, PayloadDecoderFactory) {
//!     let line = line.unwrap();
//!     println!("{:?} @{:#x}: {}B", line.timestamp, line.position, line.data.len());
//! }
//! ```

#![allow(clippy::unreadable_literal)]

pub(crate) mod common;
pub mod config;
pub mod errors;
pub mod net;
pub mod pcapng;
pub mod trace;

pub use common::{Endianness, LinkType};
pub use config::DecoderConfig;
pub use errors::{FormatError, PcapError};
pub use trace::{LineOf, PayloadDecoder, PayloadDecoderFactory, PayloadLine, TraceDecoder, TraceDecoderFactory};
