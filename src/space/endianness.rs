//! Byte-order conversion between handle storage and host values.

pub const MAX_SCALAR_BYTES: usize = 16;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    #[inline(always)]
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    /// Folds stored bytes into a zero-extended value. Bytes beyond the
    /// sixteenth most significant one are shifted out.
    pub fn decode(self, bytes: &[u8]) -> u128 {
        let push = |value: u128, byte: &u8| (value << 8) | u128::from(*byte);
        match self {
            Endianness::Little => bytes.iter().rev().fold(0, push),
            Endianness::Big => bytes.iter().fold(0, push),
        }
    }

    /// Spreads the low `out.len()` bytes of `value` over `out`.
    pub fn encode(self, value: u128, out: &mut [u8]) {
        let len = out.len();
        for significance in 0..len {
            let byte = value.checked_shr(8 * significance as u32).unwrap_or(0) as u8;
            let slot = match self {
                Endianness::Little => significance,
                Endianness::Big => len - 1 - significance,
            };
            out[slot] = byte;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_little_endian_zero_extends() {
        let value = Endianness::Little.decode(&[0x34, 0x12]);
        assert_eq!(value, 0x1234, "low byte comes first on little endian");
    }

    #[test]
    fn decode_big_endian_reads_most_significant_first() {
        let value = Endianness::Big.decode(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(value, 0xDEAD_BEEF, "big endian keeps the written order");
    }

    #[test]
    fn encode_truncates_to_requested_width() {
        let mut out = [0u8; 4];
        Endianness::Big.encode(0x1122_3344_5566, &mut out);
        assert_eq!(out, [0x33, 0x44, 0x55, 0x66], "only the low four bytes are kept");
        Endianness::Little.encode(0x1122_3344_5566, &mut out);
        assert_eq!(out, [0x66, 0x55, 0x44, 0x33], "little endian reverses the order");
    }

    #[test]
    fn empty_and_full_width_values() {
        assert_eq!(Endianness::Big.decode(&[]), 0, "no bytes decode to zero");
        let mut out = [0u8; MAX_SCALAR_BYTES];
        Endianness::Little.encode(u128::MAX - 1, &mut out);
        assert_eq!(out[0], 0xFE, "least significant byte first");
        assert_eq!(
            Endianness::Little.decode(&out),
            u128::MAX - 1,
            "sixteen bytes carry a full u128"
        );
    }
}
