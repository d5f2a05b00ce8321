use ufotofu::BulkConsumer;

use crate::compact_width::encode_compact_width;

/// The minimal power-of-two width of bytes needed to represent an unsigned integer value.
///
/// Unsigned integer values are always carried in one of these widths, and the width doubles as the Length of their entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "dev", derive(arbitrary::Arbitrary))]
pub enum FixedWidth {
    /// The byte-width required to represent numbers up to 256 (i.e. a 8-bit number).
    One,
    /// The byte-width required to represent numbers up to 256^2 (i.e. a 16-bit number).
    Two,
    /// The byte-width required to represent numbers up to 256^4 (i.e. a 32-bit number).
    Four,
    /// The byte-width required to represent numbers up to 256^8 (i.e. a 64-bit number).
    Eight,
}

impl FixedWidth {
    /// Return the [`FixedWidth`] of the given number of bytes, or `None` if it is not 1, 2, 4, or 8.
    pub fn from_len(len: usize) -> Option<FixedWidth> {
        match len {
            1 => Some(FixedWidth::One),
            2 => Some(FixedWidth::Two),
            4 => Some(FixedWidth::Four),
            8 => Some(FixedWidth::Eight),
            _ => None,
        }
    }

    /// Return the most compact width in bytes (1, 2, 4, or 8) needed to represent a given `u64` as a corresponding 8-bit, 16-bit, 32-bit, or 64-bit number.
    ///
    /// ```
    /// use tlv_encoding::FixedWidth;
    ///
    /// assert_eq!(FixedWidth::from_u64(255), FixedWidth::One);
    /// assert_eq!(FixedWidth::from_u64(256), FixedWidth::Two);
    /// ```
    pub fn from_u64(value: u64) -> Self {
        if value <= u8::MAX as u64 {
            FixedWidth::One
        } else if value <= u16::MAX as u64 {
            FixedWidth::Two
        } else if value <= u32::MAX as u64 {
            FixedWidth::Four
        } else {
            FixedWidth::Eight
        }
    }

    /// Return the width in bytes of this [`FixedWidth`].
    pub fn width(&self) -> usize {
        match self {
            FixedWidth::One => 1,
            FixedWidth::Two => 2,
            FixedWidth::Four => 4,
            FixedWidth::Eight => 8,
        }
    }
}

/// Encode the Length and value bytes of an unsigned integer entry: the minimal [`FixedWidth`] as a compact width Length, then that many big-endian bytes.
pub async fn encode_fixed_width_uint<Consumer: BulkConsumer<Item = u8>>(
    value: u64,
    consumer: &mut Consumer,
) -> Result<(), Consumer::Error> {
    let width = FixedWidth::from_u64(value).width();

    encode_compact_width(width as u64, consumer).await?;
    consumer
        .bulk_consume_full_slice(&value.to_be_bytes()[8 - width..])
        .await
        .map_err(|err| err.into_reason())?;

    Ok(())
}

/// Decode the value bytes of an unsigned integer entry, or return `None` if there are not 1, 2, 4, or 8 of them.
///
/// Widths wider than necessary are accepted.
pub fn decode_fixed_width_uint(bytes: &[u8]) -> Option<u64> {
    let width = FixedWidth::from_len(bytes.len())?;

    let mut raw = [0u8; 8];
    raw[8 - width.width()..].copy_from_slice(bytes);

    Some(u64::from_be_bytes(raw))
}

#[cfg(test)]
mod tests {
    use pollster::block_on;
    use ufotofu::consumer::IntoVec;

    use super::*;

    #[test]
    fn fixed_width_works() {
        assert_eq!(FixedWidth::from_u64(0_u64), FixedWidth::One);
        assert_eq!(FixedWidth::from_u64(u8::MAX as u64), FixedWidth::One);

        assert_eq!(FixedWidth::from_u64(u8::MAX as u64 + 1), FixedWidth::Two);
        assert_eq!(FixedWidth::from_u64(u16::MAX as u64), FixedWidth::Two);

        assert_eq!(FixedWidth::from_u64(u16::MAX as u64 + 1), FixedWidth::Four);
        assert_eq!(FixedWidth::from_u64(u32::MAX as u64), FixedWidth::Four);

        assert_eq!(FixedWidth::from_u64(u32::MAX as u64 + 1), FixedWidth::Eight);
        assert_eq!(FixedWidth::from_u64(u64::MAX), FixedWidth::Eight);
    }

    #[test]
    fn encoding() {
        let values = [
            (FixedWidth::One, 0),
            (FixedWidth::One, 255),
            (FixedWidth::Two, 256),
            (FixedWidth::Two, u16::MAX as u64),
            (FixedWidth::Four, 65536),
            (FixedWidth::Four, u32::MAX as u64),
            (FixedWidth::Eight, 4294967296),
            (FixedWidth::Eight, u64::MAX),
        ];

        for (fixed_width, value) in values {
            let mut consumer = IntoVec::<u8>::new();

            block_on(encode_fixed_width_uint(value, &mut consumer)).unwrap();

            let encode_result = consumer.into_vec();

            // The Length is a single literal byte, since widths never exceed 8.
            assert_eq!(encode_result[0] as usize, fixed_width.width());
            assert_eq!(encode_result.len(), 1 + fixed_width.width());

            assert_eq!(decode_fixed_width_uint(&encode_result[1..]), Some(value));
        }
    }

    #[test]
    fn accepts_wide_and_rejects_odd_widths() {
        assert_eq!(decode_fixed_width_uint(&[0, 0, 0, 7]), Some(7));
        assert_eq!(decode_fixed_width_uint(&[0, 0, 7]), None);
        assert_eq!(decode_fixed_width_uint(&[]), None);
    }
}
