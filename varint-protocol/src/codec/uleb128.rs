//! Unsigned Little-Endian Base 128.
//!
//! Every byte carries one base-128 digit in its low seven bits, least
//! significant digit first. The high bit is set on every byte except the
//! last one.

use bytes::{Buf, BufMut};

use super::Codec;
use crate::var_int_helper::{put_byte, Integral, VarIntError, CONTINUE_BIT, SEGMENT_BITS};

/// The maximum number of bytes a `u64` occupies.
pub const MAX_U64_SIZE: usize = max_size(u64::BITS);

/// Number of bytes needed for the largest value of an integer `bits` wide.
pub const fn max_size(bits: u32) -> usize {
    if bits == 0 {
        return 1;
    }
    (bits as usize + 6) / 7
}

/// [`Codec::size`] for `u64`, usable in const context to size fixed buffers.
///
/// ```
/// use varint_protocol::{uleb128::size_of, ArrayVarint};
///
/// let port: ArrayVarint<{ size_of(65535) }> = ArrayVarint::from_value(8080u16).unwrap();
/// assert_eq!(port.as_bytes(), &[0x90, 0x3f]);
/// ```
pub const fn size_of(mut value: u64) -> usize {
    let mut n = 1;
    while value > SEGMENT_BITS as u64 {
        value >>= 7;
        n += 1;
    }
    n
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uleb128;

impl Uleb128 {
    /// Encodes `value` into a freshly allocated buffer.
    pub fn to_vec<I: Integral>(value: I) -> Vec<u8> {
        let mut buf: Vec<u8> = Vec::with_capacity(Self::size(value));
        Self::encode(value, &mut buf);
        buf
    }

    pub fn encode_buf<I: Integral>(value: I, write: &mut impl BufMut) -> usize {
        Self::encode(value, write)
    }

    /// Decodes one value from the front of `read`, consuming exactly its bytes.
    pub fn decode_buf<I: Integral>(read: &mut impl Buf) -> Result<I, VarIntError> {
        Self::decode_from(|| read.has_remaining().then(|| read.get_u8()))
    }

    fn decode_from<I: Integral>(mut read: impl FnMut() -> Option<u8>) -> Result<I, VarIntError> {
        let mut val = I::zero();
        let mut position = 0;
        loop {
            let Some(byte) = read() else {
                return Err(if position == 0 {
                    VarIntError::Empty
                } else {
                    VarIntError::Incomplete
                });
            };
            val = accumulate(val, byte & SEGMENT_BITS, position)?;
            if byte & CONTINUE_BIT == 0 {
                return Ok(val);
            }
            position += 1;
        }
    }
}

/// Adds `digit * 128^position` to `val`, failing as soon as the sum leaves `I`.
#[inline]
fn accumulate<I: Integral>(val: I, digit: u8, position: usize) -> Result<I, VarIntError> {
    if digit == 0 {
        return Ok(val);
    }
    let shift = position * 7;
    if shift >= I::BITS as usize {
        return Err(VarIntError::TooLarge);
    }
    let digit = <I as From<u8>>::from(digit);
    let part = digit << shift;
    if part >> shift != digit {
        return Err(VarIntError::TooLarge);
    }
    val.checked_add(&part).ok_or(VarIntError::TooLarge)
}

impl Codec for Uleb128 {
    const MAX_SIZE: usize = max_size(u128::BITS);

    fn size<I: Integral>(mut value: I) -> usize {
        let max = <I as From<u8>>::from(SEGMENT_BITS);
        let mut n = 1;
        while value > max {
            value = value >> 7;
            n += 1;
        }
        n
    }

    fn encoded_size(bytes: &[u8]) -> usize {
        bytes
            .iter()
            .position(|&byte| Self::is_terminal(byte))
            .map_or(0, |idx| idx + 1)
    }

    #[inline]
    fn is_terminal(byte: u8) -> bool {
        byte & CONTINUE_BIT == 0
    }

    fn encode<I: Integral>(mut value: I, write: &mut impl BufMut) -> usize {
        let max = <I as From<u8>>::from(SEGMENT_BITS);
        let mut count = 1;
        while value > max {
            let byte: u8 = value.as_();
            write.put_u8(byte | CONTINUE_BIT);
            value = value >> 7;
            count += 1;
        }
        write.put_u8(value.as_());
        count
    }

    fn decode<I: Integral>(bytes: &[u8]) -> Result<I, VarIntError> {
        let mut bytes = bytes.iter().copied();
        Self::decode_from(|| bytes.next())
    }

    fn copy(
        mut read: impl FnMut() -> Option<u8>,
        write: &mut impl BufMut,
    ) -> Result<usize, VarIntError> {
        let mut count = 0;
        loop {
            let byte = read().ok_or(VarIntError::Incomplete)?;
            put_byte(write, byte, count)?;
            count += 1;
            if Self::is_terminal(byte) {
                return Ok(count);
            }
        }
    }

    /// Shorter encodings are smaller. Equal-length encodings are ordered by
    /// their most significant digit first, i.e. from the last byte backwards.
    fn less(lhs: &[u8], rhs: &[u8]) -> bool {
        match lhs.len().cmp(&rhs.len()) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => lhs.iter().rev().lt(rhs.iter().rev()),
        }
    }

    fn equal(lhs: &[u8], rhs: &[u8]) -> bool {
        lhs == rhs
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};

    use super::*;

    const VECTORS: [(u64, &[u8]); 6] = [
        (0, &[0x00]),
        (127, &[0x7f]),
        (128, &[0x80, 0x01]),
        (255, &[0xff, 0x01]),
        (300, &[0xac, 0x02]),
        (16384, &[0x80, 0x80, 0x01]),
    ];

    #[test]
    fn encodes_known_vectors() {
        for (value, expected) in VECTORS {
            let mut buf: Vec<u8> = Vec::new();
            let written = Uleb128::encode(value, &mut buf);
            assert_eq!(buf, expected, "encoding of {value}");
            assert_eq!(written, expected.len());
            assert_eq!(Uleb128::size(value), expected.len());
            assert_eq!(size_of(value), expected.len());
            assert_eq!(Uleb128::decode::<u64>(expected), Ok(value));
        }
    }

    #[test]
    fn round_trips_boundaries() {
        let values: [u64; 16] = [
            0,
            127,
            128,
            255,
            256,
            32767,
            32768,
            65535,
            65536,
            2147483647,
            2147483648,
            4294967295,
            4294967296,
            9223372036854775807,
            9223372036854775808,
            u64::MAX,
        ];
        for value in values {
            let encoded = Uleb128::to_vec(value);
            assert_eq!(Uleb128::decode::<u64>(&encoded), Ok(value));
        }
        assert_eq!(Uleb128::to_vec(u64::MAX).len(), MAX_U64_SIZE);
        assert_eq!(Uleb128::to_vec(u128::MAX).len(), Uleb128::MAX_SIZE);
    }

    #[test]
    fn u32_round_trip_and_length() {
        assert!((0..u32::MAX).into_par_iter().step_by(4093).all(|value| {
            let encoded = Uleb128::to_vec(value);
            encoded.len() == Uleb128::size(value)
                && Uleb128::encoded_size(&encoded) == encoded.len()
                && Uleb128::decode::<u32>(&encoded) == Ok(value)
        }));
    }

    #[test]
    fn ordering_matches_numeric_order() {
        assert!((0..=u16::MAX as u32).into_par_iter().all(|value| {
            let lhs = Uleb128::to_vec(value);
            let rhs = Uleb128::to_vec(value + 1);
            Uleb128::size(value) <= Uleb128::size(value + 1)
                && Uleb128::less(&lhs, &rhs)
                && !Uleb128::less(&rhs, &lhs)
                && !Uleb128::equal(&lhs, &rhs)
                && Uleb128::equal(&lhs, &lhs)
        }));
        // 255 and 256 differ in both digits; the high digit decides.
        assert!(Uleb128::less(&[0xff, 0x01], &[0x80, 0x02]));
        assert_eq!(
            Uleb128::compare(&Uleb128::to_vec(300u32), &Uleb128::to_vec(300u64)),
            Ordering::Equal
        );
    }

    #[test]
    fn truncated_input() {
        assert_eq!(Uleb128::decode::<u64>(&[0x80]), Err(VarIntError::Incomplete));
        assert_eq!(
            Uleb128::decode::<u64>(&[0xff, 0xff]),
            Err(VarIntError::Incomplete)
        );
        assert_eq!(Uleb128::decode::<u64>(&[]), Err(VarIntError::Empty));
    }

    #[test]
    fn overflow_is_detected() {
        assert_eq!(Uleb128::decode::<u8>(&[0xff, 0x01]), Ok(255));
        assert_eq!(
            Uleb128::decode::<u8>(&[0x80, 0x02]),
            Err(VarIntError::TooLarge)
        );
        // fails on the second byte, before the missing terminator is noticed
        assert_eq!(
            Uleb128::decode::<u8>(&[0x80, 0x82]),
            Err(VarIntError::TooLarge)
        );
        let mut too_big = Uleb128::to_vec(u64::MAX);
        assert_eq!(Uleb128::decode::<u32>(&too_big), Err(VarIntError::TooLarge));
        *too_big.last_mut().unwrap() |= CONTINUE_BIT;
        too_big.push(0x01);
        assert_eq!(Uleb128::decode::<u64>(&too_big), Err(VarIntError::TooLarge));
    }

    #[test]
    fn encoded_size_scans_to_terminator() {
        assert_eq!(Uleb128::encoded_size(&[]), 0);
        assert_eq!(Uleb128::encoded_size(&[0x80, 0x80]), 0);
        assert_eq!(Uleb128::encoded_size(&[0x05, 0xff]), 1);
        assert_eq!(Uleb128::encoded_size(&[0x80, 0x80, 0x01, 0x80]), 3);
    }

    #[test]
    fn decode_buf_consumes_one_value() {
        let mut buf: &[u8] = &[0xac, 0x02, 0x7f, b'x'];
        assert_eq!(Uleb128::decode_buf::<u16>(&mut buf), Ok(300));
        assert_eq!(Uleb128::decode_buf::<u16>(&mut buf), Ok(127));
        assert_eq!(buf, b"x");

        let mut out = bytes::BytesMut::new();
        Uleb128::encode_buf(16384u32, &mut out);
        assert_eq!(&out[..], &[0x80, 0x80, 0x01]);
    }

    #[test]
    fn copy_moves_exactly_one_encoding() {
        let mut input = [0x80, 0x80, 0x01, 0x2a].into_iter();
        let mut out: Vec<u8> = Vec::new();
        assert_eq!(Uleb128::copy(|| input.next(), &mut out), Ok(3));
        assert_eq!(out, [0x80, 0x80, 0x01]);
        assert_eq!(input.next(), Some(0x2a));

        let mut input = [0x80, 0x80].into_iter();
        assert_eq!(
            Uleb128::copy(|| input.next(), &mut Vec::<u8>::new()),
            Err(VarIntError::Incomplete)
        );

        let mut input = [0x80, 0x80, 0x01].into_iter();
        let mut fixed = [0_u8; 2];
        assert_eq!(
            Uleb128::copy(|| input.next(), &mut &mut fixed[..]),
            Err(VarIntError::CapacityExceeded {
                required: 3,
                capacity: 2
            })
        );
    }

    #[test]
    fn try_copy_prefers_reader_errors() {
        let mut calls = 0;
        let res = Uleb128::try_copy(
            || {
                calls += 1;
                if calls == 1 {
                    Ok(Some(0x80))
                } else {
                    Err("socket closed")
                }
            },
            &mut Vec::<u8>::new(),
            |_| "codec error",
        );
        assert_eq!(res, Err("socket closed"));
    }

    #[test]
    fn const_sizes() {
        assert_eq!(MAX_U64_SIZE, 10);
        assert_eq!(Uleb128::MAX_SIZE, 19);
        assert_eq!(max_size(u8::BITS), 2);
        assert_eq!(size_of(u64::MAX), 10);
    }
}
