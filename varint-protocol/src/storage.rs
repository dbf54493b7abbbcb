//! Backing buffers for [`Varint`](crate::Varint).
//!
//! Each storage type decides once, through its `Storage` impl, how encoded
//! bytes get into it: growable buffers are cleared and appended to, fixed
//! buffers are overwritten from the front and refuse encodings that do not
//! fit.

use bytes::{BufMut, BytesMut};

use crate::var_int_helper::VarIntError;

pub trait Storage {
    /// Where a new encoding is written to.
    type Writer<'a>: BufMut
    where
        Self: 'a;

    /// Storage holding no encoding yet.
    fn empty() -> Self;

    /// Every byte currently held, which may be more than the encoding.
    fn bytes(&self) -> &[u8];

    /// Prepares for an encoding of `required` bytes.
    ///
    /// Must not touch the current contents when it fails.
    fn sized_writer(&mut self, required: usize) -> Result<Self::Writer<'_>, VarIntError>;

    /// Prepares for an encoding of unknown length, as read from a stream.
    fn stream_writer(&mut self) -> Self::Writer<'_>;
}

impl Storage for Vec<u8> {
    type Writer<'a> = &'a mut Vec<u8>;

    fn empty() -> Self {
        Vec::new()
    }

    fn bytes(&self) -> &[u8] {
        self
    }

    fn sized_writer(&mut self, required: usize) -> Result<Self::Writer<'_>, VarIntError> {
        self.clear();
        self.reserve_exact(required);
        Ok(self)
    }

    fn stream_writer(&mut self) -> Self::Writer<'_> {
        self.clear();
        self
    }
}

impl Storage for BytesMut {
    type Writer<'a> = &'a mut BytesMut;

    fn empty() -> Self {
        BytesMut::new()
    }

    fn bytes(&self) -> &[u8] {
        self
    }

    fn sized_writer(&mut self, required: usize) -> Result<Self::Writer<'_>, VarIntError> {
        self.clear();
        self.reserve(required);
        Ok(self)
    }

    fn stream_writer(&mut self) -> Self::Writer<'_> {
        self.clear();
        self
    }
}

impl<const N: usize> Storage for [u8; N] {
    type Writer<'a> = &'a mut [u8];

    fn empty() -> Self {
        [0; N]
    }

    fn bytes(&self) -> &[u8] {
        self
    }

    fn sized_writer(&mut self, required: usize) -> Result<Self::Writer<'_>, VarIntError> {
        if required > N {
            return Err(VarIntError::CapacityExceeded {
                required,
                capacity: N,
            });
        }
        Ok(&mut self[..])
    }

    fn stream_writer(&mut self) -> Self::Writer<'_> {
        &mut self[..]
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;

    use super::*;

    #[test]
    fn growable_storage_starts_over() {
        let mut storage: Vec<u8> = vec![1, 2, 3];
        storage.sized_writer(2).unwrap().put_slice(&[9, 9]);
        assert_eq!(storage, [9, 9]);

        let mut storage = BytesMut::from(&b"abc"[..]);
        storage.stream_writer().put_u8(7);
        assert_eq!(&storage[..], &[7]);
    }

    #[test]
    fn fixed_storage_checks_capacity() {
        let mut storage = [5_u8; 2];
        assert_eq!(
            storage.sized_writer(3).unwrap_err(),
            VarIntError::CapacityExceeded {
                required: 3,
                capacity: 2
            }
        );
        assert_eq!(storage, [5, 5]);

        storage.sized_writer(1).unwrap().put_u8(1);
        assert_eq!(storage, [1, 5]);
        assert_eq!(storage.bytes().len(), 2);
    }
}
