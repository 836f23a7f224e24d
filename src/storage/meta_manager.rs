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

//! Durable per-directory tablet meta store: one prost-encoded file per
//! `(tablet_id, schema_hash)` under `{root}/meta/`. A registered tablet's
//! meta must be present here; the trash sweeper consults it before it
//! deletes anything.

use std::path::PathBuf;

use prost::Message;

use crate::common::ids::{SchemaHash, TabletId};
use crate::common::status::{OlapError, OlapResult};
use crate::storage::data_dir::DataDir;
use crate::storage::tablet_meta::TabletMetaPb;

pub struct TabletMetaManager;

fn meta_file_path(data_dir: &DataDir, tablet_id: TabletId, schema_hash: SchemaHash) -> PathBuf {
    data_dir
        .meta_path()
        .join(format!("{tablet_id}_{schema_hash}.pb"))
}

impl TabletMetaManager {
    pub fn save(
        data_dir: &DataDir,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        meta: &TabletMetaPb,
    ) -> OlapResult<()> {
        let file = meta_file_path(data_dir, tablet_id, schema_hash);
        std::fs::write(&file, meta.encode_to_vec()).map_err(|e| {
            OlapError::MetaStoreError(format!("save meta file {}: {e}", file.display()))
        })
    }

    /// Returns `Ok(None)` when no meta is stored for the identity and an
    /// error only when a stored meta cannot be read or decoded.
    pub fn get_header(
        data_dir: &DataDir,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
    ) -> OlapResult<Option<TabletMetaPb>> {
        let file = meta_file_path(data_dir, tablet_id, schema_hash);
        if !file.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&file).map_err(|e| {
            OlapError::MetaStoreError(format!("read meta file {}: {e}", file.display()))
        })?;
        let meta = TabletMetaPb::decode(bytes.as_slice()).map_err(|e| {
            OlapError::MetaStoreError(format!("decode meta file {}: {e}", file.display()))
        })?;
        Ok(Some(meta))
    }

    /// Removing an absent meta is not an error; the sweeper retries.
    pub fn remove(
        data_dir: &DataDir,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
    ) -> OlapResult<()> {
        let file = meta_file_path(data_dir, tablet_id, schema_hash);
        if !file.exists() {
            return Ok(());
        }
        std::fs::remove_file(&file).map_err(|e| {
            OlapError::MetaStoreError(format!("remove meta file {}: {e}", file.display()))
        })
    }

    /// Visits every stored header as raw bytes. The callback returns false
    /// to stop the traversal. Used at engine boot to reload the registry.
    pub fn traverse_headers(
        data_dir: &DataDir,
        mut visitor: impl FnMut(TabletId, SchemaHash, &[u8]) -> bool,
    ) -> OlapResult<()> {
        let meta_dir = data_dir.meta_path();
        let entries = std::fs::read_dir(&meta_dir)
            .map_err(|e| OlapError::MetaStoreError(format!("scan {}: {e}", meta_dir.display())))?;
        for entry in entries {
            let entry = entry
                .map_err(|e| OlapError::MetaStoreError(format!("scan {}: {e}", meta_dir.display())))?;
            let file_name = entry.file_name();
            let Some(stem) = file_name.to_str().and_then(|n| n.strip_suffix(".pb")) else {
                continue;
            };
            let Some((tablet_id, schema_hash)) = stem.split_once('_') else {
                continue;
            };
            let (Ok(tablet_id), Ok(schema_hash)) =
                (tablet_id.parse::<TabletId>(), schema_hash.parse::<SchemaHash>())
            else {
                continue;
            };
            let bytes = std::fs::read(entry.path()).map_err(|e| {
                OlapError::MetaStoreError(format!("read meta file {}: {e}", entry.path().display()))
            })?;
            if !visitor(tablet_id, schema_hash, &bytes) {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TabletMetaManager;
    use crate::storage::data_dir::{DataDir, StorageMedium};
    use crate::storage::tablet_meta::{TabletMetaPb, TabletStatePb};

    fn meta(tablet_id: i64, schema_hash: i32) -> TabletMetaPb {
        TabletMetaPb {
            tablet_id,
            schema_hash,
            tablet_state: TabletStatePb::Normal as i32,
            ..Default::default()
        }
    }

    #[test]
    fn save_get_remove_cycle() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir");

        assert!(TabletMetaManager::get_header(&dir, 100, 7).expect("get").is_none());
        TabletMetaManager::save(&dir, 100, 7, &meta(100, 7)).expect("save");
        let loaded = TabletMetaManager::get_header(&dir, 100, 7)
            .expect("get")
            .expect("present");
        assert_eq!(loaded.tablet_id, 100);
        assert_eq!(loaded.schema_hash, 7);

        TabletMetaManager::remove(&dir, 100, 7).expect("remove");
        assert!(TabletMetaManager::get_header(&dir, 100, 7).expect("get").is_none());
        // removing again stays idempotent
        TabletMetaManager::remove(&dir, 100, 7).expect("remove twice");
    }

    #[test]
    fn traverse_headers_visits_saved_metas() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir");
        TabletMetaManager::save(&dir, 100, 7, &meta(100, 7)).expect("save");
        TabletMetaManager::save(&dir, 200, 9, &meta(200, 9)).expect("save");

        let mut visited = Vec::new();
        TabletMetaManager::traverse_headers(&dir, |tablet_id, schema_hash, bytes| {
            assert!(!bytes.is_empty());
            visited.push((tablet_id, schema_hash));
            true
        })
        .expect("traverse");
        visited.sort_unstable();
        assert_eq!(visited, vec![(100, 7), (200, 9)]);
    }
}
