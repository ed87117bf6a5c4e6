//! Human-readable rendering of decoded records.

use crate::packet::Trade;

/// Format a trade as its human-readable line, without a terminator.
///
/// Output is `"Trade: " + symbol + " Size: " + size + " Price: " + price`
/// with the sizes in decimal. The five symbol bytes are emitted verbatim;
/// they carry no NUL terminator and are not required to be UTF-8, which
/// is why this returns raw bytes rather than a `String`.
pub fn trade_line(trade: &Trade) -> Vec<u8> {
    let mut line = Vec::with_capacity(64);
    line.extend_from_slice(b"Trade: ");
    line.extend_from_slice(&trade.symbol);
    line.extend_from_slice(b" Size: ");
    line.extend_from_slice(trade.size.to_string().as_bytes());
    line.extend_from_slice(b" Price: ");
    line.extend_from_slice(trade.price.to_string().as_bytes());
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_line_exact() {
        let trade = Trade {
            symbol: *b"ABCDE",
            size: 12,
            price: 5235,
        };
        assert_eq!(trade_line(&trade), b"Trade: ABCDE Size: 12 Price: 5235");
    }

    #[test]
    fn test_trade_line_extremes() {
        let trade = Trade {
            symbol: *b"00000",
            size: u16::MAX,
            price: u64::MAX,
        };
        assert_eq!(
            trade_line(&trade),
            format!("Trade: 00000 Size: {} Price: {}", u16::MAX, u64::MAX).as_bytes()
        );
    }

    #[test]
    fn test_symbol_bytes_pass_through_verbatim() {
        let trade = Trade {
            symbol: [0xFF, 0x00, b'A', 0x80, b' '],
            size: 1,
            price: 2,
        };
        let line = trade_line(&trade);
        assert_eq!(&line[7..12], &trade.symbol);
    }

    #[test]
    fn test_trade_line_is_pure() {
        let trade = Trade {
            symbol: *b"PURE!",
            size: 42,
            price: 314,
        };
        assert_eq!(trade_line(&trade), trade_line(&trade));
    }
}
