// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! One storage root (one mount point). Owns shard allocation, the
//! pending-id markers, the registered-tablet set, the per-directory meta
//! store location, and trash moves.
//!
//! Layout under the root:
//! `data/{shard}/{tablet_id}/{schema_hash}/`, `meta/`, and
//! `trash/{time_label}/{tablet_id}/{schema_hash}`.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::Local;

use crate::common::ids::{SchemaHash, TabletId, TabletInfo};
use crate::common::status::{OlapError, OlapResult};
use crate::novastore_logging::warn;

pub const DATA_PREFIX: &str = "data";
pub const TRASH_PREFIX: &str = "trash";
pub const META_PREFIX: &str = "meta";

/// Namespace for pending-id markers: `tablet_{tablet_id}`.
pub const TABLET_ID_PREFIX: &str = "tablet_";

/// Round-robin modulus for shard allocation.
pub const MAX_SHARD_NUM: u64 = 1024;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StorageMedium {
    Hdd,
    Ssd,
}

/// Usage snapshot of one storage root, filled in by
/// `TabletManager::update_root_path_info`.
#[derive(Clone, Debug)]
pub struct DataDirInfo {
    pub path: String,
    pub path_hash: i64,
    pub is_used: bool,
    pub data_used_capacity: i64,
    pub storage_medium: StorageMedium,
}

#[derive(Default)]
struct DataDirState {
    current_shard: u64,
    tablet_set: HashSet<TabletInfo>,
    pending_ids: HashSet<String>,
}

pub struct DataDir {
    path: PathBuf,
    storage_medium: StorageMedium,
    path_hash: i64,
    is_used: AtomicBool,
    trash_seq: AtomicU64,
    state: Mutex<DataDirState>,
}

fn hash_path(path: &Path) -> i64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish() as i64
}

impl DataDir {
    /// Opens (creating if needed) a storage root with its `data`, `meta`
    /// and `trash` subdirectories.
    pub fn new(path: impl Into<PathBuf>, storage_medium: StorageMedium) -> OlapResult<Self> {
        let path = path.into();
        for sub in [DATA_PREFIX, META_PREFIX, TRASH_PREFIX] {
            let dir = path.join(sub);
            std::fs::create_dir_all(&dir)
                .map_err(|e| OlapError::io(&format!("create dir {}", dir.display()), e))?;
        }
        let path_hash = hash_path(&path);
        Ok(Self {
            path,
            storage_medium,
            path_hash,
            is_used: AtomicBool::new(true),
            trash_seq: AtomicU64::new(0),
            state: Mutex::new(DataDirState::default()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_hash(&self) -> i64 {
        self.path_hash
    }

    pub fn storage_medium(&self) -> StorageMedium {
        self.storage_medium
    }

    pub fn is_used(&self) -> bool {
        self.is_used.load(Ordering::Acquire)
    }

    /// Marks the directory healthy or failed. Tablets on a failed
    /// directory are filtered out of lookups until evicted.
    pub fn set_is_used(&self, is_used: bool) {
        self.is_used.store(is_used, Ordering::Release);
    }

    pub fn data_path(&self) -> PathBuf {
        self.path.join(DATA_PREFIX)
    }

    pub fn meta_path(&self) -> PathBuf {
        self.path.join(META_PREFIX)
    }

    pub fn trash_path(&self) -> PathBuf {
        self.path.join(TRASH_PREFIX)
    }

    /// `{root}/data/{shard}/{tablet_id}/{schema_hash}`
    pub fn schema_hash_path(
        &self,
        shard_id: u64,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
    ) -> PathBuf {
        self.data_path()
            .join(shard_id.to_string())
            .join(tablet_id.to_string())
            .join(schema_hash.to_string())
    }

    /// Hands out the next shard round-robin, creating its directory on
    /// first use.
    pub fn get_shard(&self) -> OlapResult<u64> {
        let next_shard = {
            let mut state = self.state.lock().expect("data dir state lock");
            let shard = state.current_shard;
            state.current_shard = (state.current_shard + 1) % MAX_SHARD_NUM;
            shard
        };
        let shard_path = self.data_path().join(next_shard.to_string());
        if !shard_path.exists() {
            std::fs::create_dir_all(&shard_path)
                .map_err(|e| OlapError::io(&format!("create dir {}", shard_path.display()), e))?;
        }
        Ok(next_shard)
    }

    pub fn add_pending_ids(&self, id: &str) {
        let mut state = self.state.lock().expect("data dir state lock");
        state.pending_ids.insert(id.to_string());
    }

    pub fn remove_pending_ids(&self, id: &str) {
        let mut state = self.state.lock().expect("data dir state lock");
        state.pending_ids.remove(id);
    }

    pub fn has_pending_id(&self, id: &str) -> bool {
        let state = self.state.lock().expect("data dir state lock");
        state.pending_ids.contains(id)
    }

    pub fn register_tablet(&self, tablet_info: TabletInfo) {
        let mut state = self.state.lock().expect("data dir state lock");
        state.tablet_set.insert(tablet_info);
    }

    pub fn deregister_tablet(&self, tablet_info: &TabletInfo) {
        let mut state = self.state.lock().expect("data dir state lock");
        state.tablet_set.remove(tablet_info);
    }

    pub fn is_tablet_registered(&self, tablet_info: &TabletInfo) -> bool {
        let state = self.state.lock().expect("data dir state lock");
        state.tablet_set.contains(tablet_info)
    }

    /// Drains the registered-tablet set, returning everything that was
    /// registered. Used when evicting a failed directory.
    pub fn clear_tablets(&self) -> Vec<TabletInfo> {
        let mut state = self.state.lock().expect("data dir state lock");
        let tablets = state.tablet_set.iter().copied().collect();
        state.tablet_set.clear();
        tablets
    }

    /// Moves a tablet directory into the trash area, preserving its last
    /// two path components (`{tablet_id}/{schema_hash}`) under a fresh
    /// time label. Returns the destination.
    pub fn move_to_trash(&self, source: &Path) -> OlapResult<PathBuf> {
        let schema_hash_part = source.file_name().ok_or_else(|| {
            OlapError::InputParameterError(format!("bad tablet path: {}", source.display()))
        })?;
        let tablet_id_part = source.parent().and_then(Path::file_name).ok_or_else(|| {
            OlapError::InputParameterError(format!("bad tablet path: {}", source.display()))
        })?;

        let time_label = format!(
            "{}.{}",
            Local::now().format("%Y%m%d%H%M%S"),
            self.trash_seq.fetch_add(1, Ordering::Relaxed)
        );
        let dest_parent = self.trash_path().join(time_label).join(tablet_id_part);
        std::fs::create_dir_all(&dest_parent)
            .map_err(|e| OlapError::io(&format!("create dir {}", dest_parent.display()), e))?;
        let dest = dest_parent.join(schema_hash_part);
        std::fs::rename(source, &dest).map_err(|e| {
            OlapError::io(
                &format!("move {} to {}", source.display(), dest.display()),
                e,
            )
        })?;

        // The now-empty {tablet_id} directory under data/ is left behind by
        // the rename; clean it up when nothing else lives there.
        if let Some(parent) = source.parent() {
            if std::fs::remove_dir(parent).is_err() && parent.exists() {
                warn!(
                    "tablet dir not empty after trash move, leave it: {}",
                    parent.display()
                );
            }
        }
        Ok(dest)
    }

    pub fn info(&self) -> DataDirInfo {
        DataDirInfo {
            path: self.path.to_string_lossy().to_string(),
            path_hash: self.path_hash,
            is_used: self.is_used(),
            data_used_capacity: 0,
            storage_medium: self.storage_medium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DataDir, MAX_SHARD_NUM, StorageMedium, TABLET_ID_PREFIX};
    use crate::common::ids::TabletInfo;

    #[test]
    fn get_shard_round_robins_and_creates_dirs() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir");
        let first = dir.get_shard().expect("shard");
        let second = dir.get_shard().expect("shard");
        assert_eq!(first, 0);
        assert_eq!(second, 1 % MAX_SHARD_NUM);
        assert!(root.path().join("data").join("0").is_dir());
        assert!(root.path().join("data").join("1").is_dir());
    }

    #[test]
    fn pending_ids_are_added_and_cleared() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir");
        let marker = format!("{TABLET_ID_PREFIX}100");
        dir.add_pending_ids(&marker);
        assert!(dir.has_pending_id(&marker));
        dir.remove_pending_ids(&marker);
        assert!(!dir.has_pending_id(&marker));
    }

    #[test]
    fn register_and_deregister_tablet() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir");
        let info = TabletInfo::new(100, 7);
        dir.register_tablet(info);
        assert!(dir.is_tablet_registered(&info));
        dir.deregister_tablet(&info);
        assert!(!dir.is_tablet_registered(&info));
    }

    #[test]
    fn move_to_trash_preserves_tablet_and_schema_hash_components() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir");
        let source = dir.schema_hash_path(0, 100, 7);
        std::fs::create_dir_all(&source).expect("create tablet dir");
        std::fs::write(source.join("100.hdr"), b"snapshot").expect("write");

        let dest = dir.move_to_trash(&source).expect("move to trash");
        assert!(!source.exists());
        assert!(dest.join("100.hdr").is_file());
        assert_eq!(dest.file_name().and_then(|n| n.to_str()), Some("7"));
        assert_eq!(
            dest.parent().and_then(|p| p.file_name()).and_then(|n| n.to_str()),
            Some("100")
        );
        assert!(dest.starts_with(dir.trash_path()));
    }
}
