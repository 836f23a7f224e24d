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

//! One tablet instance. The embedded `RwLock<TabletMetaPb>` is the header
//! lock; it is innermost in the lock order and is taken after the registry
//! lock whenever both are needed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::ids::{SchemaHash, TabletId, TabletInfo, Version};
use crate::common::status::{OlapError, OlapResult};
use crate::common::time_util::unix_seconds;
use crate::novastore_logging::warn;
use crate::storage::data_dir::DataDir;
use crate::storage::meta_manager::TabletMetaManager;
use crate::storage::rowset::Rowset;
use crate::storage::tablet_meta::{
    AlterTabletStatePb, AlterTaskPb, RowsetMetaPb, TabletMetaPb, TabletSchemaPb, TabletStatePb,
};

pub struct Tablet {
    tablet_id: TabletId,
    schema_hash: SchemaHash,
    data_dir: Arc<DataDir>,
    tablet_path: PathBuf,
    meta: RwLock<TabletMetaPb>,
    init_succeeded: AtomicBool,
}

impl Tablet {
    /// Builds the in-memory tablet from its meta. The meta must carry a
    /// non-empty schema; the tablet path is derived from the meta's shard.
    pub fn create_tablet_from_meta(
        meta: TabletMetaPb,
        data_dir: Arc<DataDir>,
    ) -> OlapResult<Arc<Tablet>> {
        if meta.schema.as_ref().is_none_or(|s| s.columns.is_empty()) {
            warn!(
                "tablet meta has no schema, tablet={}",
                meta.full_name()
            );
            return Err(OlapError::TableCreateFromHeaderError);
        }
        let tablet_path =
            data_dir.schema_hash_path(meta.shard_id, meta.tablet_id, meta.schema_hash);
        Ok(Arc::new(Tablet {
            tablet_id: meta.tablet_id,
            schema_hash: meta.schema_hash,
            data_dir,
            tablet_path,
            meta: RwLock::new(meta),
            init_succeeded: AtomicBool::new(false),
        }))
    }

    /// Validates the loaded rowset set. Rowsets must not repeat a version
    /// range; overlapping deltas would make version resolution ambiguous.
    pub fn init(&self) -> OlapResult<()> {
        {
            let meta = self.header_rdlock();
            let mut versions: Vec<Version> = meta.rowsets.iter().map(RowsetMetaPb::version).collect();
            versions.sort_unstable();
            for pair in versions.windows(2) {
                if pair[0] == pair[1] {
                    warn!(
                        "tablet has duplicated rowset version {}, tablet={}",
                        pair[0],
                        self.full_name()
                    );
                    return Err(OlapError::TableIndexValidateError);
                }
            }
        }
        self.init_succeeded.store(true, Ordering::Release);
        Ok(())
    }

    pub fn init_succeeded(&self) -> bool {
        self.init_succeeded.load(Ordering::Acquire)
    }

    pub fn tablet_id(&self) -> TabletId {
        self.tablet_id
    }

    pub fn schema_hash(&self) -> SchemaHash {
        self.schema_hash
    }

    pub fn tablet_info(&self) -> TabletInfo {
        TabletInfo::new(self.tablet_id, self.schema_hash)
    }

    pub fn equal(&self, tablet_id: TabletId, schema_hash: SchemaHash) -> bool {
        self.tablet_id == tablet_id && self.schema_hash == schema_hash
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.tablet_id, self.schema_hash)
    }

    pub fn data_dir(&self) -> &Arc<DataDir> {
        &self.data_dir
    }

    pub fn tablet_path(&self) -> &Path {
        &self.tablet_path
    }

    /// A tablet on a failed data dir must not be handed out.
    pub fn is_used(&self) -> bool {
        self.data_dir.is_used()
    }

    pub fn header_rdlock(&self) -> RwLockReadGuard<'_, TabletMetaPb> {
        self.meta.read().expect("tablet header lock")
    }

    pub fn header_wrlock(&self) -> RwLockWriteGuard<'_, TabletMetaPb> {
        self.meta.write().expect("tablet header lock")
    }

    /// Persists the given meta without touching the header lock; for call
    /// sites already inside a header critical section.
    pub fn save_meta_with(&self, meta: &TabletMetaPb) -> OlapResult<()> {
        TabletMetaManager::save(&self.data_dir, self.tablet_id, self.schema_hash, meta)
    }

    pub fn save_meta(&self) -> OlapResult<()> {
        let meta = self.header_rdlock();
        self.save_meta_with(&meta)
    }

    pub fn creation_time(&self) -> i64 {
        self.header_rdlock().creation_time
    }

    pub fn set_creation_time(&self, creation_time: i64) {
        self.header_wrlock().creation_time = creation_time;
    }

    pub fn tablet_state(&self) -> TabletStatePb {
        self.header_rdlock().tablet_state()
    }

    pub fn set_tablet_state(&self, state: TabletStatePb) {
        self.header_wrlock().set_tablet_state(state);
    }

    pub fn partition_id(&self) -> i64 {
        self.header_rdlock().partition_id
    }

    pub fn tablet_schema(&self) -> TabletSchemaPb {
        self.header_rdlock().schema.clone().unwrap_or_default()
    }

    pub fn next_unique_id(&self) -> u32 {
        self.header_rdlock()
            .schema
            .as_ref()
            .map(|s| s.next_column_unique_id)
            .unwrap_or(0)
    }

    pub fn alter_task(&self) -> Option<AlterTaskPb> {
        self.header_rdlock().alter_task.clone()
    }

    pub fn set_alter_task(&self, task: AlterTaskPb) {
        self.header_wrlock().alter_task = Some(task);
    }

    /// Updates the state of an existing alter task; a tablet without one
    /// is left untouched.
    pub fn set_alter_state(&self, state: AlterTabletStatePb) {
        let mut meta = self.header_wrlock();
        if let Some(task) = meta.alter_task.as_mut() {
            task.set_alter_state(state);
        }
    }

    pub fn delete_alter_task(&self) {
        self.header_wrlock().alter_task = None;
    }

    pub fn max_version(&self) -> Option<Version> {
        self.header_rdlock().max_version()
    }

    pub fn rowset_with_max_version(&self) -> Option<RowsetMetaPb> {
        self.header_rdlock().rowset_with_max_version().cloned()
    }

    pub fn num_rows(&self) -> i64 {
        self.header_rdlock().num_rows()
    }

    pub fn tablet_footprint(&self) -> i64 {
        self.header_rdlock().tablet_footprint()
    }

    pub fn version_count(&self) -> i64 {
        self.header_rdlock().version_count()
    }

    pub fn cumulative_layer_point(&self) -> i64 {
        self.header_rdlock().cumulative_layer_point
    }

    pub fn set_cumulative_layer_point(&self, point: i64) {
        self.header_wrlock().cumulative_layer_point = point;
    }

    /// Allocates the next rowset id for this tablet. Persisted with the
    /// next meta save.
    pub fn next_rowset_id(&self) -> i64 {
        let mut meta = self.header_wrlock();
        meta.next_rowset_id += 1;
        meta.next_rowset_id
    }

    pub fn add_rowset(&self, rowset: &Rowset) -> OlapResult<()> {
        let mut meta = self.header_wrlock();
        let version = rowset.version();
        if meta.rowsets.iter().any(|r| r.version() == version) {
            return Err(OlapError::InputParameterError(format!(
                "rowset version {} already exists, tablet={}",
                version,
                self.full_name()
            )));
        }
        meta.rowsets.push(rowset.rowset_meta().clone());
        Ok(())
    }

    pub fn add_inc_rowset(&self, rowset_meta: RowsetMetaPb) {
        self.header_wrlock().inc_rowsets.push(rowset_meta);
    }

    /// Drops incremental rowsets older than `expired_sec` and persists the
    /// meta when anything was dropped. Best-effort; invoked by the trash
    /// sweeper.
    pub fn delete_expired_inc_rowsets(&self, expired_sec: i64) {
        let now = unix_seconds();
        let mut meta = self.header_wrlock();
        let before = meta.inc_rowsets.len();
        meta.inc_rowsets
            .retain(|r| r.creation_time + expired_sec > now);
        if meta.inc_rowsets.len() == before {
            return;
        }
        if let Err(e) = self.save_meta_with(&meta) {
            warn!(
                "fail to save meta after expiring inc rowsets, tablet={}, error={}",
                self.full_name(),
                e
            );
        }
    }

    pub fn can_do_compaction(&self) -> bool {
        let meta = self.header_rdlock();
        meta.tablet_state() == TabletStatePb::Normal && meta.max_version().is_some()
    }

    /// Removes the tablet directory tree, and the parent `{tablet_id}`
    /// directory when this was its last schema-hash child.
    pub fn delete_all_files(&self) -> OlapResult<()> {
        if self.tablet_path.exists() {
            std::fs::remove_dir_all(&self.tablet_path).map_err(|e| {
                OlapError::io(&format!("remove {}", self.tablet_path.display()), e)
            })?;
        }
        if let Some(parent) = self.tablet_path.parent() {
            let _ = std::fs::remove_dir(parent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Tablet;
    use crate::common::status::OlapError;
    use crate::storage::data_dir::{DataDir, StorageMedium};
    use crate::storage::tablet_meta::{
        ColumnPb, RowsetMetaPb, TabletMetaPb, TabletSchemaPb, TabletStatePb,
    };
    use std::sync::Arc;

    fn meta_with_rowsets(rowsets: Vec<RowsetMetaPb>) -> TabletMetaPb {
        TabletMetaPb {
            tablet_id: 100,
            schema_hash: 7,
            shard_id: 0,
            tablet_state: TabletStatePb::Normal as i32,
            schema: Some(TabletSchemaPb {
                columns: vec![ColumnPb {
                    unique_id: 0,
                    name: "k1".to_string(),
                    column_type: "INT".to_string(),
                    is_key: true,
                    is_nullable: false,
                }],
                next_column_unique_id: 1,
            }),
            rowsets,
            ..Default::default()
        }
    }

    fn rowset(start: i64, end: i64) -> RowsetMetaPb {
        RowsetMetaPb {
            rowset_id: end,
            start_version: start,
            end_version: end,
            ..Default::default()
        }
    }

    #[test]
    fn meta_without_schema_is_rejected() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = Arc::new(DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir"));
        let meta = TabletMetaPb {
            tablet_id: 100,
            schema_hash: 7,
            ..Default::default()
        };
        assert_eq!(
            Tablet::create_tablet_from_meta(meta, dir).err(),
            Some(OlapError::TableCreateFromHeaderError)
        );
    }

    #[test]
    fn init_rejects_duplicated_rowset_versions() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = Arc::new(DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir"));
        let tablet =
            Tablet::create_tablet_from_meta(meta_with_rowsets(vec![rowset(0, 2), rowset(0, 2)]), dir)
                .expect("tablet");
        assert_eq!(tablet.init().err(), Some(OlapError::TableIndexValidateError));
        assert!(!tablet.init_succeeded());
    }

    #[test]
    fn next_rowset_id_is_monotonic() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = Arc::new(DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir"));
        let tablet =
            Tablet::create_tablet_from_meta(meta_with_rowsets(Vec::new()), dir).expect("tablet");
        assert_eq!(tablet.next_rowset_id(), 1);
        assert_eq!(tablet.next_rowset_id(), 2);
    }
}
