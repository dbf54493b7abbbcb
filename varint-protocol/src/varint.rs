use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use bytes::BytesMut;
use serde::{
    de::{self, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{
    codec::{uleb128::Uleb128, Codec},
    storage::Storage,
    var_int_helper::{Integral, VarIntError},
};

/// A ULEB128 value in growable storage.
pub type Uleb128Varint<S = Vec<u8>> = Varint<Uleb128, S>;

/// A ULEB128 value in a fixed buffer of `N` bytes. Size `N` with
/// [`size_of`](crate::uleb128::size_of) of the largest value it must hold.
pub type ArrayVarint<const N: usize> = Varint<Uleb128, [u8; N]>;

/// A ULEB128 value backed by [`BytesMut`].
pub type BytesVarint = Varint<Uleb128, BytesMut>;

/// An owned, encoded variable-length integer.
///
/// The value is only decoded when an integer is asked for; comparisons,
/// hashing and I/O all work on the encoded bytes. Only the first
/// [`Varint::len`] bytes of the storage are meaningful, the rest of a fixed
/// buffer is left over from earlier values.
pub struct Varint<C, S = Vec<u8>> {
    data: S,
    size: usize,
    codec: PhantomData<fn() -> C>,
}

impl<C: Codec, S: Storage> Varint<C, S> {
    /// A value holding no encoding. Decoding it fails with [`VarIntError::Empty`].
    pub fn new() -> Self {
        Self {
            data: S::empty(),
            size: 0,
            codec: PhantomData,
        }
    }

    /// Wraps a buffer that already starts with a valid encoding.
    ///
    /// Bytes after the first encoding are kept but ignored. A buffer without
    /// a terminated encoding yields an empty value.
    pub fn from_bytes(data: S) -> Self {
        let size = C::encoded_size(data.bytes());
        Self {
            data,
            size,
            codec: PhantomData,
        }
    }

    pub fn from_value<I: Integral>(value: I) -> Result<Self, VarIntError> {
        let mut varint = Self::new();
        varint.assign(value)?;
        Ok(varint)
    }

    /// Replaces the held encoding with the encoding of `value`.
    ///
    /// Fixed storage that is too small leaves the value as it was.
    pub fn assign<I: Integral>(&mut self, value: I) -> Result<(), VarIntError> {
        let required = C::size(value);
        let mut writer = match self.data.sized_writer(required) {
            Ok(writer) => writer,
            Err(err) => {
                log::debug!("cannot store varint {value}: {err}");
                return Err(err);
            }
        };
        self.size = C::encode(value, &mut writer);
        Ok(())
    }

    /// Decodes the held encoding into `I`.
    pub fn get<I: Integral>(&self) -> Result<I, VarIntError> {
        C::decode(self.as_bytes())
    }

    /// The encoded bytes, without any unused storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data.bytes()[..self.size]
    }

    /// Number of encoded bytes.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn into_inner(self) -> S {
        self.data
    }

    pub fn compare<R: Storage>(&self, other: &Varint<C, R>) -> Ordering {
        C::compare(self.as_bytes(), other.as_bytes())
    }

    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.data
    }

    pub(crate) fn set_len(&mut self, size: usize) {
        self.size = size;
    }
}

impl<C: Codec, S: Storage> Default for Varint<C, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, S: Clone> Clone for Varint<C, S> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            size: self.size,
            codec: PhantomData,
        }
    }
}

impl<C: Codec, S: Storage> fmt::Debug for Varint<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Varint").field(&self.as_bytes()).finish()
    }
}

impl<C: Codec, S: Storage> AsRef<[u8]> for Varint<C, S> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<C: Codec, L: Storage, R: Storage> PartialEq<Varint<C, R>> for Varint<C, L> {
    fn eq(&self, other: &Varint<C, R>) -> bool {
        C::equal(self.as_bytes(), other.as_bytes())
    }
}

impl<C: Codec, S: Storage> Eq for Varint<C, S> {}

impl<C: Codec, L: Storage, R: Storage> PartialOrd<Varint<C, R>> for Varint<C, L> {
    fn partial_cmp(&self, other: &Varint<C, R>) -> Option<Ordering> {
        Some(self.compare(other))
    }

    fn lt(&self, other: &Varint<C, R>) -> bool {
        C::less(self.as_bytes(), other.as_bytes())
    }

    fn gt(&self, other: &Varint<C, R>) -> bool {
        C::less(other.as_bytes(), self.as_bytes())
    }

    fn le(&self, other: &Varint<C, R>) -> bool {
        !self.gt(other)
    }

    fn ge(&self, other: &Varint<C, R>) -> bool {
        !self.lt(other)
    }
}

impl<C: Codec, S: Storage> Ord for Varint<C, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl<C: Codec, S: Storage> Hash for Varint<C, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

macro_rules! impl_conversions {
    ($($ty:ty),*) => {
        $(
            impl<C: Codec, S: Storage> TryFrom<$ty> for Varint<C, S> {
                type Error = VarIntError;

                fn try_from(value: $ty) -> Result<Self, Self::Error> {
                    Self::from_value(value)
                }
            }

            impl<C: Codec, S: Storage> TryFrom<&Varint<C, S>> for $ty {
                type Error = VarIntError;

                fn try_from(value: &Varint<C, S>) -> Result<Self, Self::Error> {
                    value.get()
                }
            }
        )*
    };
}

impl_conversions!(u8, u16, u32, u64, u128, usize);

impl<C: Codec, S: Storage> Serialize for Varint<C, S> {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.serialize_bytes(self.as_bytes())
    }
}

impl<'de, C: Codec, S: Storage> Deserialize<'de> for Varint<C, S> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VarintVisitor<C, S>(PhantomData<fn() -> (C, S)>);

        impl<'de, C: Codec, S: Storage> Visitor<'de> for VarintVisitor<C, S> {
            type Value = Varint<C, S>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a single varint encoded in a byte sequence")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let mut bytes = v.iter().copied();
                let mut varint = Varint::<C, S>::new();
                let size = C::copy(|| bytes.next(), &mut varint.data.stream_writer())
                    .map_err(de::Error::custom)?;
                if size != v.len() {
                    return Err(de::Error::invalid_length(v.len(), &self));
                }
                varint.size = size;
                Ok(varint)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut varint = Varint::<C, S>::new();
                let size = C::try_copy(
                    || seq.next_element::<u8>(),
                    &mut varint.data.stream_writer(),
                    de::Error::custom,
                )?;
                if seq.next_element::<u8>()?.is_some() {
                    return Err(de::Error::invalid_length(size + 1, &self));
                }
                varint.size = size;
                Ok(varint)
            }
        }

        deserializer.deserialize_bytes(VarintVisitor(PhantomData))
    }
}
