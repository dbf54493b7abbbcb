//! Variable-length unsigned integers.
//!
//! [`Uleb128`] converts integers to and from their ULEB128 encoding;
//! [`Varint`] owns one encoded value in either growable (`Vec<u8>`,
//! [`bytes::BytesMut`]) or fixed (`[u8; N]`) storage and only decodes it on
//! request.
//!
//! ```
//! use varint_protocol::{ArrayVarint, Uleb128Varint};
//!
//! let length = Uleb128Varint::<Vec<u8>>::from_value(300u32)?;
//! assert_eq!(length.as_bytes(), &[0xac, 0x02]);
//!
//! let mut small = ArrayVarint::<2>::new();
//! assert!(small.assign(1u64 << 20).is_err());
//! small.assign(300u16)?;
//! assert_eq!(small, length);
//! assert_eq!(small.get::<u16>()?, 300);
//! # Ok::<(), varint_protocol::VarIntError>(())
//! ```

pub mod codec;
pub mod storage;
pub mod stream;
mod var_int_helper;
pub mod varint;

pub use codec::{uleb128, uleb128::Uleb128, Codec};
pub use storage::Storage;
pub use var_int_helper::{Integral, VarIntError, CONTINUE_BIT, SEGMENT_BITS};
pub use varint::{ArrayVarint, BytesVarint, Uleb128Varint, Varint};
