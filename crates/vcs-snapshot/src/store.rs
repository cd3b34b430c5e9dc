use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StateError};
use crate::io::{ReadStateExt, WriteStateExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMode {
    File { path: PathBuf, readonly: bool },
    Memory,
}

enum Medium {
    File(File),
    Memory(Cursor<Vec<u8>>),
}

impl Read for Medium {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Medium::File(f) => f.read(buf),
            Medium::Memory(c) => c.read(buf),
        }
    }
}

impl Write for Medium {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Medium::File(f) => f.write(buf),
            Medium::Memory(c) => c.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Medium::File(f) => f.flush(),
            Medium::Memory(c) => c.flush(),
        }
    }
}

impl Seek for Medium {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Medium::File(f) => f.seek(pos),
            Medium::Memory(c) => c.seek(pos),
        }
    }
}

/// Backing store for one snapshot: a file or an anonymous memory buffer with a single shared
/// read/write cursor.
///
/// Construction never fails. If the medium cannot be opened the store is *invalid* and every
/// read or write returns [`StateError::InvalidStore`]; check [`StateStore::is_valid`] first.
///
/// Any failed read or write leaves the store failed: later operations return
/// [`StateError::Poisoned`] until [`StateStore::reset`] is called.
pub struct StateStore {
    medium: Option<Medium>,
    mode: StoreMode,
    failed: bool,
}

impl StateStore {
    /// Opens `path` for reading, or for reading and writing when `readonly` is false.
    ///
    /// A read-write open creates the file if it is missing but never truncates existing content.
    pub fn open_file(path: impl AsRef<Path>, readonly: bool) -> Self {
        let path = path.as_ref();
        let opened = if readonly {
            File::open(path)
        } else {
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(path)
        };
        let medium = match opened {
            Ok(file) => Some(Medium::File(file)),
            Err(err) => {
                tracing::debug!("cannot open state file {}: {err}", path.display());
                None
            }
        };
        let mut store = Self {
            medium,
            mode: StoreMode::File {
                path: path.to_path_buf(),
                readonly,
            },
            failed: false,
        };
        store.reset();
        store
    }

    /// Allocates an empty in-memory store.
    ///
    /// The buffer is primed with a single `true` byte and rewound, so a read from a fresh store
    /// sees that byte rather than end-of-medium. The first write overwrites it.
    pub fn open_memory() -> Self {
        let mut store = Self {
            medium: Some(Medium::Memory(Cursor::new(Vec::new()))),
            mode: StoreMode::Memory,
            failed: false,
        };
        // Writing to a fresh cursor cannot fail.
        let _ = store.write_bool(true);
        store.reset();
        store
    }

    /// Memory store over existing snapshot bytes, positioned at the start.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            medium: Some(Medium::Memory(Cursor::new(bytes))),
            mode: StoreMode::Memory,
            failed: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.medium.is_some()
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub fn mode(&self) -> &StoreMode {
        &self.mode
    }

    /// Clears the failed flag and rewinds the cursor to the start of the medium.
    pub fn reset(&mut self) {
        self.failed = false;
        if let Some(medium) = self.medium.as_mut() {
            if let Err(err) = medium.seek(SeekFrom::Start(0)) {
                tracing::debug!("state store rewind failed: {err}");
                self.failed = true;
            }
        }
    }

    pub fn position(&mut self) -> Result<u64> {
        self.with_medium(|m| Ok(m.stream_position()?))
    }

    /// Total length of the medium, leaving the cursor where it was.
    pub fn len(&mut self) -> Result<u64> {
        self.with_medium(|m| {
            let pos = m.stream_position()?;
            let end = m.seek(SeekFrom::End(0))?;
            m.seek(SeekFrom::Start(pos))?;
            Ok(end)
        })
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.with_medium(|m| Ok(m.flush()?))
    }

    /// Contents of a memory store; `None` for file stores.
    pub fn memory_bytes(&self) -> Option<&[u8]> {
        match self.medium.as_ref()? {
            Medium::Memory(c) => Some(c.get_ref().as_slice()),
            Medium::File(_) => None,
        }
    }

    /// Memory store bytes up to the cursor, i.e. what the last save produced.
    pub fn written_bytes(&mut self) -> Option<Vec<u8>> {
        let pos = self.position().ok()? as usize;
        self.memory_bytes().map(|b| b[..pos.min(b.len())].to_vec())
    }

    fn with_medium<T>(&mut self, f: impl FnOnce(&mut Medium) -> Result<T>) -> Result<T> {
        if self.failed {
            return Err(StateError::Poisoned);
        }
        let medium = self.medium.as_mut().ok_or(StateError::InvalidStore)?;
        let result = f(medium);
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        self.with_medium(|m| m.read_byte())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.with_medium(|m| m.read_bytes(len))
    }

    pub fn read_bytes_into(&mut self, out: &mut [u8]) -> Result<()> {
        self.with_medium(|m| m.read_bytes_into(out))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.with_medium(|m| m.read_u16())
    }

    pub fn read_u16_array(&mut self, len: usize) -> Result<Vec<u16>> {
        self.with_medium(|m| m.read_u16_array(len))
    }

    pub fn read_u16_array_into(&mut self, out: &mut [u16]) -> Result<()> {
        self.with_medium(|m| m.read_u16_array_into(out))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.with_medium(|m| m.read_u32())
    }

    pub fn read_u32_array(&mut self, len: usize) -> Result<Vec<u32>> {
        self.with_medium(|m| m.read_u32_array(len))
    }

    pub fn read_u32_array_into(&mut self, out: &mut [u32]) -> Result<()> {
        self.with_medium(|m| m.read_u32_array_into(out))
    }

    /// A `u32` length followed by that many raw bytes; the string encoding without UTF-8 checks.
    pub fn read_len_prefixed_bytes(&mut self) -> Result<Vec<u8>> {
        self.with_medium(|m| m.read_len_prefixed_bytes())
    }

    pub fn read_string(&mut self) -> Result<String> {
        self.with_medium(|m| m.read_string())
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.with_medium(|m| m.read_bool())
    }

    pub fn write_byte(&mut self, v: u8) -> Result<()> {
        self.with_medium(|m| m.write_byte(v))
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.with_medium(|m| m.write_bytes(bytes))
    }

    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.with_medium(|m| m.write_u16(v))
    }

    pub fn write_u16_array(&mut self, values: &[u16]) -> Result<()> {
        self.with_medium(|m| m.write_u16_array(values))
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.with_medium(|m| m.write_u32(v))
    }

    pub fn write_u32_array(&mut self, values: &[u32]) -> Result<()> {
        self.with_medium(|m| m.write_u32_array(values))
    }

    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.with_medium(|m| m.write_string(s))
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.with_medium(|m| m.write_bool(v))
    }
}

impl core::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateStore")
            .field("mode", &self.mode)
            .field("valid", &self.is_valid())
            .field("failed", &self.failed)
            .finish()
    }
}
