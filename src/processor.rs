//! Packet processor state machine.
//!
//! [`PacketProcessor`] reads packets from an input byte source, validates
//! their structure, and transcodes trade records into text lines on an
//! output sink. Quote records are parsed and counted but otherwise
//! discarded.
//!
//! The body is consumed through a fixed-capacity read buffer whose size
//! is an exact multiple of the 32-byte slot size, so a record never
//! splits across two reads. Validation is strict: the first malformed
//! record aborts the run; there is no skip-and-resync on the slot
//! boundary.

use std::io::{BufRead, BufReader, ErrorKind, Read, Write};

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::packet::{PacketHeader, Trade, UpdateHeader, UpdateKind};
use crate::text::trade_line;
use crate::{READ_BUFFER_SIZE, UPDATE_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    CheckStream,
    ReadHeader,
    ReadPartBody,
    WriteUpdates,
}

enum Step {
    Continue(State),
    Finished,
}

/// Decoder state machine reading packets from a byte source and writing
/// trade text to a sink.
///
/// Both streams are owned exclusively for the processor's lifetime.
/// Repeated [`process_next_packet`](PacketProcessor::process_next_packet)
/// calls continue from where the previous run stopped;
/// [`initialize`](PacketProcessor::initialize) itself is one-shot.
pub struct PacketProcessor<R: Read, W: Write> {
    source: BufReader<R>,
    sink: W,
    state: State,
    read_buf: Vec<u8>,
    trade_offsets: Vec<usize>,

    // Per-run
    packets_limit: Option<usize>,
    packets_processed: usize,

    // Per-packet
    packet_updates: usize,
    updates_read: usize,
    body_len: usize,
    body_bytes_read: usize,
}

impl<R: Read, W: Write> PacketProcessor<R, W> {
    /// Create a processor over `source` and `sink`.
    pub fn new(source: R, sink: W) -> Self {
        Self {
            source: BufReader::new(source),
            sink,
            state: State::Uninitialized,
            read_buf: Vec::new(),
            trade_offsets: Vec::new(),
            packets_limit: None,
            packets_processed: 0,
            packet_updates: 0,
            updates_read: 0,
            body_len: 0,
            body_bytes_read: 0,
        }
    }

    /// Arm the state machine and allocate the fixed read buffer and the
    /// record-location scratch list.
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
            "PacketProcessor::initialize() may only be called once"
        );
        self.read_buf = vec![0u8; READ_BUFFER_SIZE];
        self.trade_offsets = Vec::with_capacity(READ_BUFFER_SIZE / UPDATE_SIZE);
        self.state = State::CheckStream;
    }

    /// Process packets until `max_packets` have been consumed (`Ok`) or
    /// the stream cannot yield another well-formed packet (`Err` with the
    /// specific reason). `None` processes until end-of-stream or error.
    ///
    /// [`Error::EndOfFile`] is the ordinary exhaustion signal; structural
    /// errors abort the run immediately with no resynchronization.
    /// Trade lines already written to the sink are never rolled back.
    pub fn process_next_packet(&mut self, max_packets: Option<usize>) -> Result<()> {
        self.packets_limit = max_packets;
        self.packets_processed = 0;

        self.run()?;
        debug!("processed {} packets", self.packets_processed);
        Ok(())
    }

    /// Consume the processor, returning the underlying text sink.
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

            State::CheckStream => {
                // Stopping condition for the run, checked before touching
                // the source again.
                if let Some(limit) = self.packets_limit {
                    if self.packets_processed == limit {
                        return Ok(Step::Finished);
                    }
                }
                self.check_stream()?;
                Ok(Step::Continue(State::ReadHeader))
            }

            State::ReadHeader => {
                self.read_header()?;
                Ok(Step::Continue(State::ReadPartBody))
            }

            State::ReadPartBody => {
                self.read_part_body()?;
                Ok(Step::Continue(State::WriteUpdates))
            }

            State::WriteUpdates => {
                self.write_updates()?;

                if self.updates_read == self.packet_updates {
                    self.packets_processed += 1;
                    trace!(
                        "packet {} complete ({} updates)",
                        self.packets_processed,
                        self.packet_updates
                    );
                    return Ok(Step::Continue(State::CheckStream));
                }

                // Packet not fully read yet; fetch some more body.
                Ok(Step::Continue(State::ReadPartBody))
            }
        }
    }

    /// Probe the source for more data without consuming any.
    fn check_stream(&mut self) -> Result<()> {
        match self.source.fill_buf() {
            Ok(buf) if buf.is_empty() => Err(Error::EndOfFile),
            Ok(_) => Ok(()),
            Err(e) => match e.kind() {
                ErrorKind::BrokenPipe
                | ErrorKind::NotConnected
                | ErrorKind::ConnectionAborted
                | ErrorKind::ConnectionReset => Err(Error::StreamClosed),
                _ => Err(Error::BadStream(e)),
            },
        }
    }

    fn read_header(&mut self) -> Result<()> {
        let mut buf = [0u8; PacketHeader::SIZE];
        self.source.read_exact(&mut buf).map_err(Error::HeaderRead)?;
        let header = PacketHeader::from_bytes(&buf);

        let packet_length = header.packet_length as usize;
        let declared_updates = header.num_market_updates as usize;

        // The length must cover the header itself, and the remaining body
        // must hold exactly the declared number of slots.
        if packet_length < PacketHeader::SIZE
            || packet_length - PacketHeader::SIZE != declared_updates * UPDATE_SIZE
        {
            return Err(Error::MalformedPacketHeader);
        }

        self.packet_updates = declared_updates;
        self.updates_read = 0;
        self.body_len = packet_length - PacketHeader::SIZE;
        self.body_bytes_read = 0;
        self.trade_offsets.clear();
        Ok(())
    }

    fn read_part_body(&mut self) -> Result<()> {
        let remaining = self.body_len - self.body_bytes_read;
        let chunk = remaining.min(self.read_buf.len());

        self.source
            .read_exact(&mut self.read_buf[..chunk])
            .map_err(Error::BodyRead)?;

        // Both the body and the buffer capacity are multiples of the slot
        // size, so the chunk never ends inside a record.
        debug_assert_eq!(chunk % UPDATE_SIZE, 0);

        let mut offset = 0;
        while offset < chunk {
            let slot = &self.read_buf[offset..offset + UPDATE_SIZE];
            let header = UpdateHeader::peek(slot);
            if !header.is_valid() {
                return Err(Error::MalformedUpdate);
            }

            if header.update_kind() == Some(UpdateKind::Trade) {
                // Just remember where the trade sits; formatting is
                // deferred until the whole chunk has been scanned.
                self.trade_offsets.push(offset);
            }

            offset += header.length as usize;
            self.body_bytes_read += header.length as usize;
            self.updates_read += 1;
        }

        Ok(())
    }

    fn write_updates(&mut self) -> Result<()> {
        for &offset in &self.trade_offsets {
            let slot = self
                .read_buf
                .get(offset..offset + UPDATE_SIZE)
                .ok_or(Error::InvalidState)?;
            let trade = Trade::from_slot(slot);

            self.sink
                .write_all(&trade_line(&trade))
                .and_then(|()| self.sink.write_all(b"\n"))
                .map_err(Error::TradeWrite)?;
        }

        self.trade_offsets.clear();
        Ok(())
    }
}
