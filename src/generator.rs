//! Packet generator state machine.
//!
//! [`PacketGenerator`] synthesizes packets of pseudo-random trade and
//! quote records onto an output byte sink. Records are composed in a
//! fixed-capacity write buffer and flushed in batches, one `write_all`
//! per batch, so the sink sees at most one write per 512 records plus one
//! per packet header.
//!
//! The random source is an explicitly seeded [`StdRng`] owned by the
//! instance; two generators constructed with the same seed produce
//! identical byte streams for identical arguments.

use std::io::Write;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::packet::{PacketHeader, Quote, Trade};
use crate::{MAX_UPDATES_PER_PACKET, SYMBOL_LEN, UPDATE_SIZE, WRITE_BUFFER_SIZE};

/// Update records held by a full write buffer, flushed in one write call.
pub const UPDATES_PER_FLUSH: usize = WRITE_BUFFER_SIZE / UPDATE_SIZE;

const SYMBOL_CHARSET: &[u8] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    WriteHeader,
    GenerateUpdates,
}

enum Step {
    Continue(State),
    Finished,
}

/// Encoder state machine writing packets to a byte sink.
///
/// The sink is owned exclusively for the generator's lifetime. Repeated
/// [`generate_packets`](PacketGenerator::generate_packets) calls are
/// independent runs appending to the same sink;
/// [`initialize`](PacketGenerator::initialize) itself is one-shot.
pub struct PacketGenerator<W: Write> {
    sink: W,
    rng: StdRng,
    state: State,
    write_buf: Vec<u8>,

    // Per-run
    num_packets: usize,
    max_updates: usize,
    packets_written: usize,

    // Per-packet
    packet_updates: usize,
    updates_written: usize,
}

impl<W: Write> PacketGenerator<W> {
    /// Create a generator over `sink`, drawing randomness from `seed`.
    ///
    /// The write buffer is sized here, once; it never grows.
    pub fn new(sink: W, seed: u64) -> Self {
        Self {
            sink,
            rng: StdRng::seed_from_u64(seed),
            state: State::Uninitialized,
            write_buf: vec![0u8; WRITE_BUFFER_SIZE],
            num_packets: 0,
            max_updates: 0,
            packets_written: 0,
            packet_updates: 0,
            updates_written: 0,
        }
    }

    /// Arm the state machine.
    ///
    /// # Panics
    ///
    /// Panics if called more than once on the same instance. Calling the
    /// run method without initializing first is reported as
    /// [`Error::Uninitialized`] instead.
    pub fn initialize(&mut self) {
        assert_eq!(
            self.state,
            State::Uninitialized,
            "PacketGenerator::initialize() may only be called once"
        );
        self.state = State::WriteHeader;
    }

    /// Synthesize `num_packets` packets, each carrying a uniformly random
    /// update count in `[1, max_updates]`.
    ///
    /// Fails with [`Error::TooManyUpdates`] before writing anything when
    /// `max_updates` is zero or exceeds [`MAX_UPDATES_PER_PACKET`].
    /// A sink failure aborts the run at header or batch granularity;
    /// bytes already flushed are not rolled back. `num_packets == 0` is a
    /// no-op success.
    pub fn generate_packets(&mut self, num_packets: usize, max_updates: usize) -> Result<()> {
        if max_updates == 0 || max_updates > MAX_UPDATES_PER_PACKET {
            return Err(Error::TooManyUpdates);
        }

        self.num_packets = num_packets;
        self.max_updates = max_updates;
        self.packets_written = 0;

        self.run()?;
        debug!("generated {} packets", self.packets_written);
        Ok(())
    }

    /// Consume the generator, returning the underlying sink.
    pub fn into_sink(self) -> W {
        self.sink
    }

    fn run(&mut self) -> Result<()> {
        loop {
            match self.step()? {
                Step::Continue(next) => self.state = next,
                Step::Finished => return Ok(()),
            }
        }
    }

    fn step(&mut self) -> Result<Step> {
        match self.state {
            State::Uninitialized => Err(Error::Uninitialized),

            State::WriteHeader => {
                // Stopping condition for the run.
                if self.packets_written == self.num_packets {
                    return Ok(Step::Finished);
                }
                self.write_header()?;
                Ok(Step::Continue(State::GenerateUpdates))
            }

            State::GenerateUpdates => {
                self.generate_updates()?;
                if self.updates_written == self.packet_updates {
                    self.packets_written += 1;
                    trace!(
                        "packet {} complete ({} updates)",
                        self.packets_written,
                        self.packet_updates
                    );
                    return Ok(Step::Continue(State::WriteHeader));
                }
                Ok(Step::Continue(State::GenerateUpdates))
            }
        }
    }

    fn write_header(&mut self) -> Result<()> {
        self.packet_updates = self.rng.random_range(1..=self.max_updates);
        self.updates_written = 0;

        let header = PacketHeader::for_updates(self.packet_updates as u16);
        self.sink
            .write_all(&header.to_bytes())
            .map_err(Error::HeaderWrite)
    }

    fn generate_updates(&mut self) -> Result<()> {
        let batch = (self.packet_updates - self.updates_written).min(UPDATES_PER_FLUSH);

        for i in 0..batch {
            let slot = if self.rng.random::<bool>() {
                self.random_quote().to_slot()
            } else {
                self.random_trade().to_slot()
            };
            self.write_buf[i * UPDATE_SIZE..(i + 1) * UPDATE_SIZE].copy_from_slice(&slot);
        }

        self.sink
            .write_all(&self.write_buf[..batch * UPDATE_SIZE])
            .map_err(Error::UpdateWrite)?;

        self.updates_written += batch;
        Ok(())
    }

    fn random_trade(&mut self) -> Trade {
        Trade {
            symbol: self.random_symbol(),
            size: self.rng.random(),
            price: self.rng.random(),
        }
    }

    fn random_quote(&mut self) -> Quote {
        Quote {
            symbol: self.random_symbol(),
            level: self.rng.random(),
            level_size: self.rng.random(),
            time_of_day: self.rng.random(),
        }
    }

    fn random_symbol(&mut self) -> [u8; SYMBOL_LEN] {
        let mut symbol = [0u8; SYMBOL_LEN];
        for byte in &mut symbol {
            *byte = SYMBOL_CHARSET[self.rng.random_range(0..SYMBOL_CHARSET.len())];
        }
        symbol
    }
}
