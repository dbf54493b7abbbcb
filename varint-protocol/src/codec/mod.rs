use std::cmp::Ordering;

use bytes::BufMut;

use crate::var_int_helper::{Integral, VarIntError};

pub mod uleb128;

/// A variable-length integer encoding.
///
/// Codecs are stateless; every operation is an associated function working on
/// plain byte ranges, so a [`Varint`](crate::Varint) only needs the type.
pub trait Codec {
    /// The maximum number of bytes one encoding can occupy (for a `u128`).
    const MAX_SIZE: usize;

    /// Returns the exact number of bytes [`Codec::encode`] will write for
    /// `value`.
    fn size<I: Integral>(value: I) -> usize;

    /// Returns the length of the encoding `bytes` starts with, or 0 if
    /// `bytes` is empty or never terminates.
    fn encoded_size(bytes: &[u8]) -> usize;

    /// Whether `byte` is the last byte of an encoding.
    fn is_terminal(byte: u8) -> bool;

    /// Encodes `value` into `write`, returning the number of bytes written.
    ///
    /// # Panics
    ///
    /// If `write` has less than [`Codec::size`] bytes of room left. Callers
    /// writing into fixed buffers check the size first.
    fn encode<I: Integral>(value: I, write: &mut impl BufMut) -> usize;

    /// Decodes the encoding `bytes` starts with; anything after it is ignored.
    ///
    /// Fails with [`VarIntError::Empty`] for an empty range,
    /// [`VarIntError::Incomplete`] if the range ends before the encoding does
    /// and [`VarIntError::TooLarge`] as soon as the value leaves `I`.
    fn decode<I: Integral>(bytes: &[u8]) -> Result<I, VarIntError>;

    /// Moves exactly one encoding from `read` to `write` without decoding it.
    fn copy(
        read: impl FnMut() -> Option<u8>,
        write: &mut impl BufMut,
    ) -> Result<usize, VarIntError>;

    /// [`Codec::copy`] from a fallible byte source. A reader error wins over
    /// any codec error it caused.
    fn try_copy<E>(
        mut reader: impl FnMut() -> Result<Option<u8>, E>,
        write: &mut impl BufMut,
        map_err: impl FnOnce(VarIntError) -> E,
    ) -> Result<usize, E> {
        let mut reader_error = None;
        let res = Self::copy(
            || {
                reader().unwrap_or_else(|err| {
                    reader_error = Some(err);
                    None
                })
            },
            write,
        );

        match reader_error {
            Some(err) => Err(err),
            None => res.map_err(map_err),
        }
    }

    /// Numeric `lhs < rhs` without decoding.
    ///
    /// Both ranges must hold canonical encodings. A shorter encoding is
    /// smaller; equal lengths compare from the most significant byte, which
    /// for little-endian codecs is the last one.
    fn less(lhs: &[u8], rhs: &[u8]) -> bool;

    /// Numeric equality of two canonical encodings, i.e. byte equality.
    fn equal(lhs: &[u8], rhs: &[u8]) -> bool;

    fn compare(lhs: &[u8], rhs: &[u8]) -> Ordering {
        if Self::less(lhs, rhs) {
            Ordering::Less
        } else if Self::less(rhs, lhs) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}
