use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::io::{self, Read};

use bytes::BufMut;
use num_traits::{AsPrimitive, PrimInt, Unsigned};
use thiserror::Error;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Error)]
pub enum VarIntError {
    /// No encoded bytes were present at all.
    #[error("varint encoding is empty")]
    Empty,
    /// The input ended while a continuation sequence was still open.
    #[error("incomplete varint encoding")]
    Incomplete,
    /// The decoded value does not fit the destination integer type.
    #[error("varint exceeds capacity of destination")]
    TooLarge,
    /// The encoding does not fit a fixed-capacity buffer.
    #[error("varint needs {required} bytes but the buffer only holds {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },
}

impl From<VarIntError> for io::Error {
    fn from(err: VarIntError) -> Self {
        let kind = match err {
            VarIntError::Incomplete => io::ErrorKind::UnexpectedEof,
            VarIntError::Empty | VarIntError::TooLarge | VarIntError::CapacityExceeded { .. } => {
                io::ErrorKind::InvalidData
            }
        };
        io::Error::new(kind, err)
    }
}

pub const SEGMENT_BITS: u8 = 0b01111111;
pub const CONTINUE_BIT: u8 = 0b10000000;

/// Unsigned integer types a varint can be encoded from and decoded into.
///
/// Only the unsigned primitives implement this, so encoding an `i32` with an
/// unsigned codec does not compile.
pub trait Integral:
    PrimInt + Unsigned + From<u8> + AsPrimitive<u8> + Debug + Display + Hash
{
    const BITS: u32;
}

macro_rules! impl_integral {
    ($($ty:ty),*) => {
        $(
            impl Integral for $ty {
                const BITS: u32 = <$ty>::BITS;
            }
        )*
    };
}

impl_integral!(u8, u16, u32, u64, u128, usize);

/// Appends one byte, refusing to run past the end of a fixed buffer.
///
/// `written` is the number of bytes already put into `write` for the
/// current encoding.
#[inline]
pub(crate) fn put_byte(
    write: &mut impl BufMut,
    byte: u8,
    written: usize,
) -> Result<(), VarIntError> {
    if !write.has_remaining_mut() {
        return Err(VarIntError::CapacityExceeded {
            required: written + 1,
            capacity: written,
        });
    }
    write.put_u8(byte);
    Ok(())
}

/// Reads a single byte, `None` once the reader is exhausted.
pub(crate) fn read_byte(reader: &mut impl Read) -> io::Result<Option<u8>> {
    let mut byte = 0_u8;
    loop {
        match reader.read(std::slice::from_mut(&mut byte)) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte)),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}
