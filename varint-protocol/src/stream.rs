//! Moving varints through byte streams.
//!
//! Reads go one byte at a time: the length of an encoding is only known once
//! its last byte has been seen, and nothing past that byte may be consumed.
//! Wrap slow readers in a [`std::io::BufReader`].

use std::io::{self, Read, Write};

use crate::{
    codec::Codec,
    storage::Storage,
    var_int_helper::{read_byte, VarIntError},
    varint::Varint,
};

impl<C: Codec, S: Storage> Varint<C, S> {
    /// Replaces the held encoding with the next encoding read from `reader`.
    ///
    /// Returns the number of bytes consumed. The reader is left positioned
    /// right after the encoding. On failure the value is left empty.
    pub fn read_from(&mut self, reader: impl Read) -> io::Result<usize> {
        self.read_from_limited(reader, usize::MAX)
    }

    /// Like [`Varint::read_from`], but gives up with [`VarIntError::TooLarge`]
    /// once an encoding runs past `max_size` bytes.
    pub fn read_from_limited(
        &mut self,
        mut reader: impl Read,
        max_size: usize,
    ) -> io::Result<usize> {
        self.set_len(0);
        let mut consumed = 0;
        let res = C::try_copy(
            || -> io::Result<Option<u8>> {
                if consumed == max_size {
                    return Err(VarIntError::TooLarge.into());
                }
                let byte = read_byte(&mut reader)?;
                consumed += usize::from(byte.is_some());
                Ok(byte)
            },
            &mut self.storage_mut().stream_writer(),
            io::Error::from,
        );

        match res {
            Ok(size) => {
                log::trace!("read {size} byte varint from stream");
                self.set_len(size);
                Ok(size)
            }
            Err(err) => {
                log::debug!("failed to read varint after {consumed} bytes: {err}");
                Err(err)
            }
        }
    }

    /// Writes exactly the encoded bytes, nothing before or after them.
    pub fn write_to(&self, mut writer: impl Write) -> io::Result<()> {
        writer.write_all(self.as_bytes())
    }
}

/// Forwards one varint from `reader` to `writer` without decoding it.
///
/// Returns the number of bytes forwarded.
pub fn relay<C: Codec>(reader: impl Read, writer: impl Write) -> io::Result<usize> {
    let mut varint = Varint::<C, Vec<u8>>::new();
    let size = varint.read_from(reader)?;
    varint.write_to(writer)?;
    Ok(size)
}

#[cfg(feature = "tokio")]
mod tokio_io {
    use std::io;

    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

    use crate::{
        codec::Codec,
        storage::Storage,
        var_int_helper::{put_byte, VarIntError},
        varint::Varint,
    };

    impl<C: Codec, S: Storage> Varint<C, S> {
        /// [`Varint::read_from`] for async readers.
        pub async fn read_from_async(
            &mut self,
            mut reader: impl AsyncRead + Unpin,
        ) -> io::Result<usize> {
            self.set_len(0);
            let mut count = 0;
            {
                let mut writer = self.storage_mut().stream_writer();
                loop {
                    let byte = match reader.read_u8().await {
                        Ok(byte) => byte,
                        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                            return Err(VarIntError::Incomplete.into())
                        }
                        Err(err) => return Err(err),
                    };
                    put_byte(&mut writer, byte, count)?;
                    count += 1;
                    if C::is_terminal(byte) {
                        break;
                    }
                }
            }
            self.set_len(count);
            Ok(count)
        }

        /// [`Varint::write_to`] for async writers.
        pub async fn write_to_async(
            &self,
            mut writer: impl AsyncWrite + Unpin,
        ) -> io::Result<()> {
            writer.write_all(self.as_bytes()).await
        }
    }
}
