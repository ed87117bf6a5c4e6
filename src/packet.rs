//! Wire format for market update packets.
//!
//! Pure, stateless encode/decode over byte slices with fixed offsets. The
//! layout is packed and native-endian; host struct layout is never
//! overlaid on raw bytes.
//!
//! ```text
//! PacketHeader : u16 packet_length | u16 num_market_updates          (4 bytes)
//! UpdateHeader : u16 length        | u8 kind('Q'|'T')                (3 bytes)
//! Trade        : UpdateHeader | [u8;5] symbol | u16 size | u64 price
//!                | [u8;14] reserved                                  (32 bytes)
//! Quote        : UpdateHeader | [u8;5] symbol | u16 level | u64 level_size
//!                | u64 time_of_day | [u8;6] reserved                 (32 bytes)
//! ```

use crate::{SYMBOL_LEN, UPDATE_SIZE};

// Field offsets inside a 32-byte update slot.
const SYMBOL_OFFSET: usize = UpdateHeader::SIZE;
const SYMBOL_END: usize = SYMBOL_OFFSET + SYMBOL_LEN;
const TRADE_SIZE_OFFSET: usize = SYMBOL_END;
const TRADE_PRICE_OFFSET: usize = TRADE_SIZE_OFFSET + 2;
const QUOTE_LEVEL_OFFSET: usize = SYMBOL_END;
const QUOTE_LEVEL_SIZE_OFFSET: usize = QUOTE_LEVEL_OFFSET + 2;
const QUOTE_TIME_OFFSET: usize = QUOTE_LEVEL_SIZE_OFFSET + 8;

/// Discriminant of an update record.
///
/// The wire also knows an `INVALID = 0` discriminant; it (and every other
/// unlisted byte) decodes to `None` and is rejected by validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UpdateKind {
    /// A resting price level.
    Quote = b'Q',
    /// An executed transaction.
    Trade = b'T',
}

impl UpdateKind {
    /// Map a raw discriminant byte to a kind, if recognized.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'Q' => Some(UpdateKind::Quote),
            b'T' => Some(UpdateKind::Trade),
            _ => None,
        }
    }
}

/// Leading header of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Total packet bytes, this header included.
    pub packet_length: u16,
    /// Number of update records in the body.
    pub num_market_updates: u16,
}

impl PacketHeader {
    /// Header size in bytes (fixed).
    pub const SIZE: usize = 4;

    /// Header for a packet carrying `num_updates` records.
    #[inline]
    pub fn for_updates(num_updates: u16) -> Self {
        Self {
            packet_length: (Self::SIZE + num_updates as usize * UPDATE_SIZE) as u16,
            num_market_updates: num_updates,
        }
    }

    /// Encode to the fixed 4-byte layout.
    #[inline]
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.packet_length.to_ne_bytes());
        buf[2..4].copy_from_slice(&self.num_market_updates.to_ne_bytes());
        buf
    }

    /// Decode from the fixed 4-byte layout.
    #[inline]
    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> Self {
        Self {
            packet_length: u16::from_ne_bytes([buf[0], buf[1]]),
            num_market_updates: u16::from_ne_bytes([buf[2], buf[3]]),
        }
    }
}

/// Leading header of every update record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateHeader {
    /// Bytes of the whole record, header included. Always 32 on a valid
    /// stream.
    pub length: u16,
    /// Raw kind discriminant.
    pub kind: u8,
}

impl UpdateHeader {
    /// Header size in bytes (fixed, unpadded).
    pub const SIZE: usize = 3;

    /// Decode from the 3-byte prefix of an update slot without touching
    /// the rest of the record, so callers can dispatch on the kind before
    /// a full decode.
    #[inline]
    pub fn peek(slot: &[u8]) -> Self {
        debug_assert!(slot.len() >= Self::SIZE);
        Self {
            length: u16::from_ne_bytes([slot[0], slot[1]]),
            kind: slot[2],
        }
    }

    /// Whether the record behind this header is structurally acceptable:
    /// exactly one slot long and of a recognized kind.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.length as usize == UPDATE_SIZE && UpdateKind::from_byte(self.kind).is_some()
    }

    /// The recognized kind, if any.
    #[inline]
    pub fn update_kind(&self) -> Option<UpdateKind> {
        UpdateKind::from_byte(self.kind)
    }

    #[inline]
    fn write_into(self, slot: &mut [u8; UPDATE_SIZE]) {
        slot[0..2].copy_from_slice(&self.length.to_ne_bytes());
        slot[2] = self.kind;
    }
}

/// An executed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    /// Raw symbol bytes, emitted verbatim when formatted.
    pub symbol: [u8; SYMBOL_LEN],
    /// Executed quantity.
    pub size: u16,
    /// Executed price.
    pub price: u64,
}

impl Trade {
    /// Encode into a full 32-byte slot, reserved bytes zeroed.
    pub fn to_slot(&self) -> [u8; UPDATE_SIZE] {
        let mut slot = [0u8; UPDATE_SIZE];
        UpdateHeader {
            length: UPDATE_SIZE as u16,
            kind: UpdateKind::Trade as u8,
        }
        .write_into(&mut slot);
        slot[SYMBOL_OFFSET..SYMBOL_END].copy_from_slice(&self.symbol);
        slot[TRADE_SIZE_OFFSET..TRADE_SIZE_OFFSET + 2].copy_from_slice(&self.size.to_ne_bytes());
        slot[TRADE_PRICE_OFFSET..TRADE_PRICE_OFFSET + 8].copy_from_slice(&self.price.to_ne_bytes());
        slot
    }

    /// Decode the trade fields from a 32-byte slot.
    ///
    /// Assumes a correctly formed record; callers validate the update
    /// header first.
    pub fn from_slot(slot: &[u8]) -> Self {
        debug_assert!(slot.len() >= UPDATE_SIZE);
        let mut symbol = [0u8; SYMBOL_LEN];
        symbol.copy_from_slice(&slot[SYMBOL_OFFSET..SYMBOL_END]);
        Self {
            symbol,
            size: u16::from_ne_bytes([slot[TRADE_SIZE_OFFSET], slot[TRADE_SIZE_OFFSET + 1]]),
            price: u64::from_ne_bytes([
                slot[TRADE_PRICE_OFFSET],
                slot[TRADE_PRICE_OFFSET + 1],
                slot[TRADE_PRICE_OFFSET + 2],
                slot[TRADE_PRICE_OFFSET + 3],
                slot[TRADE_PRICE_OFFSET + 4],
                slot[TRADE_PRICE_OFFSET + 5],
                slot[TRADE_PRICE_OFFSET + 6],
                slot[TRADE_PRICE_OFFSET + 7],
            ]),
        }
    }
}

/// A resting price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Raw symbol bytes.
    pub symbol: [u8; SYMBOL_LEN],
    /// Price level index.
    pub level: u16,
    /// Quantity resting at the level.
    pub level_size: u64,
    /// Time of day the level was observed.
    pub time_of_day: u64,
}

impl Quote {
    /// Encode into a full 32-byte slot, reserved bytes zeroed.
    pub fn to_slot(&self) -> [u8; UPDATE_SIZE] {
        let mut slot = [0u8; UPDATE_SIZE];
        UpdateHeader {
            length: UPDATE_SIZE as u16,
            kind: UpdateKind::Quote as u8,
        }
        .write_into(&mut slot);
        slot[SYMBOL_OFFSET..SYMBOL_END].copy_from_slice(&self.symbol);
        slot[QUOTE_LEVEL_OFFSET..QUOTE_LEVEL_OFFSET + 2]
            .copy_from_slice(&self.level.to_ne_bytes());
        slot[QUOTE_LEVEL_SIZE_OFFSET..QUOTE_LEVEL_SIZE_OFFSET + 8]
            .copy_from_slice(&self.level_size.to_ne_bytes());
        slot[QUOTE_TIME_OFFSET..QUOTE_TIME_OFFSET + 8]
            .copy_from_slice(&self.time_of_day.to_ne_bytes());
        slot
    }

    /// Decode the quote fields from a 32-byte slot.
    ///
    /// Assumes a correctly formed record; callers validate the update
    /// header first.
    pub fn from_slot(slot: &[u8]) -> Self {
        debug_assert!(slot.len() >= UPDATE_SIZE);
        let mut symbol = [0u8; SYMBOL_LEN];
        symbol.copy_from_slice(&slot[SYMBOL_OFFSET..SYMBOL_END]);
        Self {
            symbol,
            level: u16::from_ne_bytes([slot[QUOTE_LEVEL_OFFSET], slot[QUOTE_LEVEL_OFFSET + 1]]),
            level_size: u64::from_ne_bytes([
                slot[QUOTE_LEVEL_SIZE_OFFSET],
                slot[QUOTE_LEVEL_SIZE_OFFSET + 1],
                slot[QUOTE_LEVEL_SIZE_OFFSET + 2],
                slot[QUOTE_LEVEL_SIZE_OFFSET + 3],
                slot[QUOTE_LEVEL_SIZE_OFFSET + 4],
                slot[QUOTE_LEVEL_SIZE_OFFSET + 5],
                slot[QUOTE_LEVEL_SIZE_OFFSET + 6],
                slot[QUOTE_LEVEL_SIZE_OFFSET + 7],
            ]),
            time_of_day: u64::from_ne_bytes([
                slot[QUOTE_TIME_OFFSET],
                slot[QUOTE_TIME_OFFSET + 1],
                slot[QUOTE_TIME_OFFSET + 2],
                slot[QUOTE_TIME_OFFSET + 3],
                slot[QUOTE_TIME_OFFSET + 4],
                slot[QUOTE_TIME_OFFSET + 5],
                slot[QUOTE_TIME_OFFSET + 6],
                slot[QUOTE_TIME_OFFSET + 7],
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_UPDATES_PER_PACKET;

    #[test]
    fn test_packet_header_roundtrip() {
        let header = PacketHeader {
            packet_length: 4 + 3 * 32,
            num_market_updates: 3,
        };

        let bytes = header.to_bytes();
        assert_eq!(PacketHeader::from_bytes(&bytes), header);
    }

    #[test]
    fn test_packet_header_for_updates() {
        let header = PacketHeader::for_updates(10);
        assert_eq!(header.packet_length, 4 + 10 * 32);
        assert_eq!(header.num_market_updates, 10);

        // The largest representable packet still fits the u16 field.
        let header = PacketHeader::for_updates(MAX_UPDATES_PER_PACKET as u16);
        assert_eq!(
            header.packet_length as usize,
            PacketHeader::SIZE + MAX_UPDATES_PER_PACKET * UPDATE_SIZE
        );
    }

    #[test]
    fn test_update_kind_from_byte() {
        assert_eq!(UpdateKind::from_byte(b'Q'), Some(UpdateKind::Quote));
        assert_eq!(UpdateKind::from_byte(b'T'), Some(UpdateKind::Trade));
        assert_eq!(UpdateKind::from_byte(0), None);
        assert_eq!(UpdateKind::from_byte(b'X'), None);
    }

    #[test]
    fn test_update_header_validation() {
        let valid = UpdateHeader {
            length: 32,
            kind: b'T',
        };
        assert!(valid.is_valid());

        let wrong_length = UpdateHeader {
            length: 12,
            kind: b'T',
        };
        assert!(!wrong_length.is_valid());

        let invalid_kind = UpdateHeader {
            length: 32,
            kind: 0,
        };
        assert!(!invalid_kind.is_valid());
    }

    #[test]
    fn test_update_header_peek_reads_prefix_only() {
        let trade = Trade {
            symbol: *b"ABCDE",
            size: 7,
            price: 99,
        };
        let slot = trade.to_slot();

        let header = UpdateHeader::peek(&slot);
        assert_eq!(header.length as usize, UPDATE_SIZE);
        assert_eq!(header.update_kind(), Some(UpdateKind::Trade));
    }

    #[test]
    fn test_trade_slot_layout() {
        let trade = Trade {
            symbol: *b"ABCDE",
            size: 0x1234,
            price: 0x1122334455667788,
        };
        let slot = trade.to_slot();

        assert_eq!(u16::from_ne_bytes([slot[0], slot[1]]), 32);
        assert_eq!(slot[2], b'T');
        assert_eq!(&slot[3..8], b"ABCDE");
        assert_eq!(u16::from_ne_bytes([slot[8], slot[9]]), 0x1234);
        // Reserved tail is zeroed.
        assert!(slot[18..].iter().all(|&b| b == 0));

        assert_eq!(Trade::from_slot(&slot), trade);
    }

    #[test]
    fn test_quote_slot_layout() {
        let quote = Quote {
            symbol: *b"VWXYZ",
            level: 5,
            level_size: 1_000_000,
            time_of_day: 34_200_000_000_000,
        };
        let slot = quote.to_slot();

        assert_eq!(u16::from_ne_bytes([slot[0], slot[1]]), 32);
        assert_eq!(slot[2], b'Q');
        assert_eq!(&slot[3..8], b"VWXYZ");
        assert!(slot[26..].iter().all(|&b| b == 0));

        assert_eq!(Quote::from_slot(&slot), quote);
    }

    #[test]
    fn test_max_updates_bound() {
        // Derived from the 16-bit packet_length field.
        assert_eq!(MAX_UPDATES_PER_PACKET, (65535 / 32) - 1);
        assert_eq!(MAX_UPDATES_PER_PACKET, 2046);
    }

    #[test]
    fn test_symbol_bytes_are_raw() {
        // Symbols are not required to be text; arbitrary bytes survive a
        // slot roundtrip untouched.
        let trade = Trade {
            symbol: [0x00, 0xFF, b'Z', 0x80, 0x0A],
            size: 1,
            price: 1,
        };
        assert_eq!(Trade::from_slot(&trade.to_slot()).symbol, trade.symbol);
    }
}
