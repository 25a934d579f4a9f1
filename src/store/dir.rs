//! Directory Store Module
//!
//! Durable store keeping one file per key inside a data directory.

use std::fs;
use std::hash::Hasher;
use std::io::{self, ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use twox_hash::XxHash64;

use crate::error::{StoreError, StoreResult};
use crate::store::PersistentStore;

const KEY_FILE_PREFIX: &str = "k-";
const HASHED_FILE_PREFIX: &str = "h-";

/// Longest key stored under its own hex name. `k-` plus 240 hex digits stays
/// under the usual 255-byte file name limit.
const MAX_NAMED_KEY_LEN: usize = 120;

const KEY_LEN_HEADER: usize = std::mem::size_of::<u64>();

// == Dir Store ==
/// Stores every value in `<dir>/k-<hex(key)>`.
///
/// Keys longer than 120 bytes are filed as `<dir>/h-<hash>-<slot>` instead.
/// Such a file starts with the key length (u64, little endian) and the key
/// itself, so lookups only return a value stored under the exact same key.
/// Keys whose hashes collide take the next free slot.
///
/// Writes go to a temporary file that is persisted over the target, so a
/// reader sees either the previous value or the new one.
#[derive(Debug)]
pub struct DirStore {
    dir: PathBuf,
    closed: AtomicBool,
}

/// Where a key lives on disk.
enum Slot {
    /// Short key, the file holds the bare value
    Named(PathBuf),
    /// Long key, the file holds a key header followed by the value
    Hashed(PathBuf),
}

impl DirStore {
    // == Open ==
    /// Opens the store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "directory store opened");

        Ok(Self {
            dir,
            closed: AtomicBool::new(false),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn named_path(&self, key: &[u8]) -> PathBuf {
        self.dir.join(format!("{}{}", KEY_FILE_PREFIX, hex::encode(key)))
    }

    fn hashed_path(&self, key: &[u8], slot: u64) -> PathBuf {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(key);
        let digest = hasher.finish().to_be_bytes();
        self.dir.join(format!(
            "{}{}-{}",
            HASHED_FILE_PREFIX,
            hex::encode(digest),
            slot
        ))
    }

    /// Picks the file for `key`. Long keys also return the contents already
    /// stored there, if any.
    fn locate(&self, key: &[u8]) -> StoreResult<(Slot, Option<Vec<u8>>)> {
        if key.len() <= MAX_NAMED_KEY_LEN {
            return Ok((Slot::Named(self.named_path(key)), None));
        }

        let mut slot = 0u64;
        loop {
            let path = self.hashed_path(key, slot);
            match fs::read(&path) {
                Ok(data) => {
                    if stored_key(&data)? == key {
                        return Ok((Slot::Hashed(path), Some(data)));
                    }
                    debug!(path = %path.display(), "hash collision, trying next slot");
                    slot += 1;
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    return Ok((Slot::Hashed(path), None));
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

/// Splits the key out of a long-key file.
fn stored_key(data: &[u8]) -> StoreResult<&[u8]> {
    split_hashed(data).map(|(key, _)| key)
}

fn split_hashed(data: &[u8]) -> StoreResult<(&[u8], &[u8])> {
    let corrupt = || StoreError::Io(io::Error::new(ErrorKind::InvalidData, "truncated key header"));

    let (len, rest) = data
        .split_first_chunk::<KEY_LEN_HEADER>()
        .ok_or_else(corrupt)?;
    let len = usize::try_from(u64::from_le_bytes(*len)).map_err(|_| corrupt())?;
    if rest.len() < len {
        return Err(corrupt());
    }
    Ok(rest.split_at(len))
}

impl PersistentStore for DirStore {
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.ensure_open()?;

        let (slot, _) = self.locate(key)?;

        // Dropping the temp file on any early return deletes it
        let mut file = NamedTempFile::new_in(&self.dir)?;
        let target = match slot {
            Slot::Named(path) => path,
            Slot::Hashed(path) => {
                file.write_all(&(key.len() as u64).to_le_bytes())?;
                file.write_all(key)?;
                path
            }
        };
        file.write_all(value)?;
        file.as_file().sync_all()?;
        file.persist(&target).map_err(|err| err.error)?;

        debug!(path = %target.display(), size = value.len(), "value written");
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StoreResult<Bytes> {
        self.ensure_open()?;

        match self.locate(key)? {
            (Slot::Named(path), _) => match fs::read(path) {
                Ok(data) => Ok(Bytes::from(data)),
                Err(err) if err.kind() == ErrorKind::NotFound => Err(StoreError::not_found(key)),
                Err(err) => Err(err.into()),
            },
            (Slot::Hashed(_), Some(data)) => {
                let (_, value) = split_hashed(&data)?;
                Ok(Bytes::copy_from_slice(value))
            }
            (Slot::Hashed(_), None) => Err(StoreError::not_found(key)),
        }
    }

    fn close(&self) -> StoreResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!(dir = %self.dir.display(), "directory store closed");
        }
        Ok(())
    }
}
