//! Binary market update packet codec.
//!
//! This crate generates and processes fixed-layout packets of market
//! updates. A stream is a back-to-back sequence of packets with no
//! inter-packet delimiter; each packet is a 4-byte header followed by its
//! declared run of 32-byte update records.
//!
//! # Wire Format
//!
//! ```text
//! +------------------+-----------------------+
//! | packet_length u16| num_market_updates u16|   PacketHeader (4 bytes)
//! +------------------+-----------------------+
//! | length u16 | kind u8('Q'|'T')            |   UpdateHeader (3 bytes)
//! | symbol [u8;5] | fields... | reserved     |   Update record (32 bytes)
//! +--------------------------------------------+
//! ```
//!
//! All multi-byte integers are native-endian with no padding between
//! fields. Every update record occupies exactly 32 bytes regardless of
//! kind, so both sides can treat a packet body as a uniform array of
//! slots.
//!
//! # Components
//!
//! - [`PacketGenerator`] synthesizes packets of pseudo-random trade and
//!   quote records onto an output byte sink.
//! - [`PacketProcessor`] reads packets back, validates their structure,
//!   and transcodes trade records into human-readable text lines. Quotes
//!   are parsed and counted but otherwise discarded.
//!
//! Both are explicit finite-state machines over streams of unbounded
//! length, using bounded buffers sized once at construction.
//!
//! # Example
//!
//! ```rust
//! use market_packet::{Error, PacketGenerator, PacketProcessor};
//!
//! // Generate two packets into an in-memory stream.
//! let mut wire = Vec::new();
//! let mut generator = PacketGenerator::new(&mut wire, 42);
//! generator.initialize();
//! generator.generate_packets(2, 8)?;
//!
//! // Read them back, transcoding trades to text.
//! let mut lines = Vec::new();
//! let mut processor = PacketProcessor::new(wire.as_slice(), &mut lines);
//! processor.initialize();
//! processor.process_next_packet(Some(2))?;
//!
//! // The stream is now exhausted.
//! assert!(matches!(
//!     processor.process_next_packet(None),
//!     Err(Error::EndOfFile)
//! ));
//! # Ok::<(), market_packet::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod generator;
pub mod packet;
pub mod processor;
pub mod text;

// Re-export main types
pub use error::{Error, Result};
pub use generator::PacketGenerator;
pub use packet::{PacketHeader, Quote, Trade, UpdateHeader, UpdateKind};
pub use processor::PacketProcessor;

/// Size of every update record on the wire, trade or quote.
pub const UPDATE_SIZE: usize = 32;

/// Length of the raw symbol field (not NUL-terminated).
pub const SYMBOL_LEN: usize = 5;

/// Capacity of the processor's body read buffer.
pub const READ_BUFFER_SIZE: usize = 16384;

/// Capacity of the generator's record write buffer.
pub const WRITE_BUFFER_SIZE: usize = 16384;

/// Most updates a single packet may declare. `packet_length` is a 16-bit
/// field, so anything larger cannot be represented in the header.
pub const MAX_UPDATES_PER_PACKET: usize = (u16::MAX as usize / UPDATE_SIZE) - 1;

// Buffer capacities must be exact multiples of the slot size so a record
// never splits across two buffered reads or writes.
const _: () = assert!(READ_BUFFER_SIZE % UPDATE_SIZE == 0);
const _: () = assert!(WRITE_BUFFER_SIZE % UPDATE_SIZE == 0);
