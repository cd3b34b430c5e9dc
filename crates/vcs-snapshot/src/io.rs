use std::io::{Read, Write};

use crate::error::{Result, StateError};
use crate::format::{FALSE_PATTERN, TRUE_PATTERN};

/// Fixed-width little-endian writers for snapshot primitives.
///
/// Strings are a `u32` length followed by the raw bytes. Booleans are one of the two sentinel
/// bytes from [`crate::format`], never a bare 0/1.
pub trait WriteStateExt: Write {
    fn write_byte(&mut self, v: u8) -> Result<()> {
        self.write_all(&[v])?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)?;
        Ok(())
    }

    fn write_u16(&mut self, v: u16) -> Result<()> {
        self.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn write_u16_array(&mut self, values: &[u16]) -> Result<()> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.write_all(&bytes)?;
        Ok(())
    }

    fn write_u32(&mut self, v: u32) -> Result<()> {
        self.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn write_u32_array(&mut self, values: &[u32]) -> Result<()> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.write_all(&bytes)?;
        Ok(())
    }

    fn write_len_prefixed_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let len: u32 = bytes
            .len()
            .try_into()
            .map_err(|_| StateError::Corrupt("length does not fit in u32"))?;
        self.write_u32(len)?;
        self.write_bytes(bytes)
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_len_prefixed_bytes(s.as_bytes())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_byte(if v { TRUE_PATTERN } else { FALSE_PATTERN })
    }
}

impl<T: Write + ?Sized> WriteStateExt for T {}

pub trait ReadStateExt: Read {
    fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads exactly `len` bytes.
    ///
    /// The buffer grows with the data actually present, so a corrupt length prefix ends in
    /// `UnexpectedEof` instead of a huge up-front allocation.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        buf.try_reserve(len.min(64 * 1024))
            .map_err(|_| StateError::OutOfMemory { len })?;
        Read::take(&mut *self, len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(StateError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "truncated byte array",
            )));
        }
        Ok(buf)
    }

    fn read_bytes_into(&mut self, out: &mut [u8]) -> Result<()> {
        self.read_exact(out)?;
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u16_array(&mut self, len: usize) -> Result<Vec<u16>> {
        let byte_len = len
            .checked_mul(2)
            .ok_or(StateError::Corrupt("u16 array length overflow"))?;
        let bytes = self.read_bytes(byte_len)?;
        Ok(bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect())
    }

    fn read_u16_array_into(&mut self, out: &mut [u16]) -> Result<()> {
        for v in out.iter_mut() {
            *v = self.read_u16()?;
        }
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u32_array(&mut self, len: usize) -> Result<Vec<u32>> {
        let byte_len = len
            .checked_mul(4)
            .ok_or(StateError::Corrupt("u32 array length overflow"))?;
        let bytes = self.read_bytes(byte_len)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    fn read_u32_array_into(&mut self, out: &mut [u32]) -> Result<()> {
        for v in out.iter_mut() {
            *v = self.read_u32()?;
        }
        Ok(())
    }

    fn read_len_prefixed_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    fn read_string(&mut self) -> Result<String> {
        Ok(String::from_utf8(self.read_len_prefixed_bytes()?)?)
    }

    /// Anything other than [`TRUE_PATTERN`] decodes as `false`, including a damaged false byte.
    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? == TRUE_PATTERN)
    }
}

impl<T: Read + ?Sized> ReadStateExt for T {}
