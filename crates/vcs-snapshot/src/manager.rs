use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, StateError};
use crate::format::{SnapshotKind, STATE_HEADER};
use crate::serializable::StateRoot;
use crate::store::StateStore;

pub const DEFAULT_SLOT_COUNT: u8 = 10;

/// Where slot files live and how many slots rotate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateConfig {
    pub state_dir: PathBuf,
    pub slot_count: u8,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("."),
            slot_count: DEFAULT_SLOT_COUNT,
        }
    }
}

impl StateConfig {
    /// `<state_dir>/<rom_name>.st<slot>`
    pub fn slot_path(&self, rom_name: &str, slot: u8) -> PathBuf {
        self.state_dir.join(format!("{rom_name}.st{slot}"))
    }
}

/// Header region of a snapshot, as read by [`read_header`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub kind: SnapshotKind,
    pub identity: String,
    /// Offset of the first body byte.
    pub body_offset: u64,
}

pub fn write_header(out: &mut StateStore, kind: SnapshotKind, identity: &str) -> Result<()> {
    out.write_string(kind.header())?;
    out.write_string(identity)
}

/// Reads the header literal and identity tag at the cursor. Fails with
/// [`StateError::HeaderMismatch`] if the literal is neither reserved header.
pub fn read_header(input: &mut StateStore) -> Result<SnapshotInfo> {
    let header = input.read_len_prefixed_bytes()?;
    let Some(kind) = SnapshotKind::from_header_bytes(&header) else {
        return Err(StateError::HeaderMismatch {
            expected: STATE_HEADER.to_string(),
            found: String::from_utf8_lossy(&header).into_owned(),
        });
    };
    let identity = String::from_utf8_lossy(&input.read_len_prefixed_bytes()?).into_owned();
    let body_offset = input.position()?;
    Ok(SnapshotInfo {
        kind,
        identity,
        body_offset,
    })
}

/// Wraps whole-machine snapshots with the state header and the identity tag of the running
/// program, then hands the store to the root component.
///
/// `save_state`/`load_state` report a plain success flag and log the reason for a failure;
/// the `try_` variants return the error instead.
#[derive(Debug)]
pub struct StateManager {
    current_slot: u8,
    slot_count: u8,
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(&StateConfig::default())
    }
}

impl StateManager {
    pub fn new(config: &StateConfig) -> Self {
        let mut manager = Self {
            current_slot: 0,
            slot_count: config.slot_count.max(1),
        };
        manager.reset();
        manager
    }

    /// Per-frame hook. Nothing to do yet.
    pub fn update(&mut self) {}

    pub fn reset(&mut self) {}

    pub fn current_slot(&self) -> u8 {
        self.current_slot
    }

    pub fn slot_count(&self) -> u8 {
        self.slot_count
    }

    /// Selects `slot`, wrapping into `0..slot_count`.
    pub fn set_slot(&mut self, slot: u8) {
        self.current_slot = slot % self.slot_count;
    }

    /// Advances to the next slot, wrapping after the last one.
    pub fn change_slot(&mut self) -> u8 {
        self.current_slot = (self.current_slot + 1) % self.slot_count;
        tracing::debug!("changed state slot to {}", self.current_slot);
        self.current_slot
    }

    pub fn save_state(&self, root: Option<&dyn StateRoot>, out: &mut StateStore) -> bool {
        match self.try_save_state(root, out) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("state save to {:?} failed: {err}", out.mode());
                false
            }
        }
    }

    pub fn load_state(&self, root: Option<&mut dyn StateRoot>, input: &mut StateStore) -> bool {
        match self.try_load_state(root, input) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("state load from {:?} failed: {err}", input.mode());
                false
            }
        }
    }

    /// Writes header, identity tag and body at the store's cursor.
    ///
    /// A failure part way through leaves whatever was already written in `out`. Use
    /// [`StateManager::save_state_to_file`] when the destination must stay intact.
    pub fn try_save_state(&self, root: Option<&dyn StateRoot>, out: &mut StateStore) -> Result<()> {
        let root = root.ok_or(StateError::NoRoot)?;
        if !out.is_valid() {
            return Err(StateError::InvalidStore);
        }
        let start = out.position()?;
        write_header(out, SnapshotKind::State, &root.identity())?;
        root.save(out).map_err(|e| e.in_component(root.name()))?;
        let end = out.position()?;
        tracing::debug!(
            "saved state for {} ({} bytes)",
            root.identity(),
            end.saturating_sub(start)
        );
        Ok(())
    }

    /// Checks header and identity, and only then loads the body into `root`.
    ///
    /// If the body load fails, components that already consumed bytes keep the restored values;
    /// callers should reset the machine.
    pub fn try_load_state(
        &self,
        root: Option<&mut dyn StateRoot>,
        input: &mut StateStore,
    ) -> Result<()> {
        let root = root.ok_or(StateError::NoRoot)?;
        if !input.is_valid() {
            return Err(StateError::InvalidStore);
        }

        // Both checks compare raw bytes so that undecodable tags are still a format mismatch.
        let header = input.read_len_prefixed_bytes()?;
        if header != STATE_HEADER.as_bytes() {
            return Err(StateError::HeaderMismatch {
                expected: STATE_HEADER.to_string(),
                found: String::from_utf8_lossy(&header).into_owned(),
            });
        }
        let expected = root.identity();
        let found = input.read_len_prefixed_bytes()?;
        if found != expected.as_bytes() {
            return Err(StateError::IdentityMismatch {
                expected,
                found: String::from_utf8_lossy(&found).into_owned(),
            });
        }

        let name = root.name();
        root.load(input).map_err(|e| e.in_component(name))?;
        tracing::debug!("loaded state for {expected}");
        Ok(())
    }

    /// Classifies the snapshot at the cursor from its header and identity tag alone.
    pub fn peek_header(&self, input: &mut StateStore) -> Result<SnapshotInfo> {
        if !input.is_valid() {
            return Err(StateError::InvalidStore);
        }
        read_header(input)
    }

    /// Saves into a memory store first and replaces `path` only after the whole snapshot was
    /// produced. The bytes go to a sibling temporary file which is then renamed over `path`.
    pub fn save_state_to_file(&self, root: &dyn StateRoot, path: &Path) -> Result<()> {
        let mut staged = StateStore::open_memory();
        self.try_save_state(Some(root), &mut staged)?;
        let bytes = staged
            .written_bytes()
            .ok_or(StateError::Corrupt("staging buffer unavailable"))?;

        let tmp = temp_sibling(path)?;
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        tracing::info!("state saved to {}", path.display());
        Ok(())
    }

    pub fn load_state_from_file(&self, root: &mut dyn StateRoot, path: &Path) -> Result<()> {
        let mut input = StateStore::open_file(path, true);
        self.try_load_state(Some(root), &mut input)?;
        tracing::info!("state loaded from {}", path.display());
        Ok(())
    }

    /// Runs `f` against `root` and then puts `root` back into the state it had before.
    ///
    /// The snapshot lives in a memory store only for the duration of the call.
    pub fn probe<R: StateRoot, T>(&self, root: &mut R, f: impl FnOnce(&mut R) -> T) -> Result<T> {
        let mut snapshot = StateStore::open_memory();
        self.try_save_state(Some(&*root), &mut snapshot)?;
        let result = f(&mut *root);
        snapshot.reset();
        self.try_load_state(Some(&mut *root), &mut snapshot)?;
        Ok(result)
    }
}

fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or(StateError::Corrupt("state path has no file name"))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_paths_follow_rom_name() {
        let config = StateConfig {
            state_dir: PathBuf::from("/tmp/states"),
            slot_count: 10,
        };
        assert_eq!(
            config.slot_path("Pitfall", 3),
            PathBuf::from("/tmp/states/Pitfall.st3")
        );
    }

    #[test]
    fn slots_rotate() {
        let mut manager = StateManager::new(&StateConfig {
            state_dir: PathBuf::new(),
            slot_count: 3,
        });
        assert_eq!(manager.current_slot(), 0);
        assert_eq!(manager.change_slot(), 1);
        assert_eq!(manager.change_slot(), 2);
        assert_eq!(manager.change_slot(), 0);
        manager.set_slot(7);
        assert_eq!(manager.current_slot(), 1);
    }

    #[test]
    fn zero_slot_count_is_clamped() {
        let manager = StateManager::new(&StateConfig {
            state_dir: PathBuf::new(),
            slot_count: 0,
        });
        assert_eq!(manager.slot_count(), 1);
    }

    #[test]
    fn temp_sibling_is_hidden_next_to_target() {
        let tmp = temp_sibling(Path::new("/a/b/game.st0")).unwrap();
        assert_eq!(tmp, PathBuf::from("/a/b/.game.st0.tmp"));
    }

    #[test]
    fn read_header_classifies_movie() {
        let mut store = StateStore::open_memory();
        write_header(&mut store, SnapshotKind::Movie, "Cartridge4K").unwrap();
        store.reset();
        let info = read_header(&mut store).unwrap();
        assert_eq!(info.kind, SnapshotKind::Movie);
        assert_eq!(info.identity, "Cartridge4K");
        assert_eq!(info.body_offset, (4 + 13 + 4 + 11) as u64);
    }

    #[test]
    fn read_header_rejects_unknown_literal() {
        let mut store = StateStore::open_memory();
        store.write_string("01020000state").unwrap();
        store.reset();
        let err = read_header(&mut store).unwrap_err();
        assert!(matches!(err, StateError::HeaderMismatch { .. }));
    }
}
