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

//! The tablet registry and lifecycle controller. Every externally visible
//! tablet mutation goes through here: create, drop, load from disk,
//! replacement during restore, compaction candidate selection, reporting,
//! and the deferred trash sweep of dropped tablets.
//!
//! Lock order, outermost first: the registry lock, the per-tablet-id
//! schema-change latch (try-acquired only), then per-tablet header locks.
//! No path inverts this order.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use prost::Message;
use regex::Regex;

use crate::common::app_config::StorageConfig;
use crate::common::ids::{SchemaHash, TabletId, TabletInfo, Version};
use crate::common::metrics::{increment, metrics};
use crate::common::status::{OlapError, OlapResult};
use crate::common::time_util::{unix_millis, unix_seconds};
use crate::novastore_logging::{debug, error, info, warn};
use crate::storage::data_dir::{DataDir, DataDirInfo, TABLET_ID_PREFIX};
use crate::storage::meta_manager::TabletMetaManager;
use crate::storage::request::{CreateTabletRequest, TabletReportInfo, TabletStat};
use crate::storage::rowset::{AlphaRowsetWriter, Rowset, RowsetWriterContext};
use crate::storage::tablet::Tablet;
use crate::storage::tablet_meta::{
    AlterTabletStatePb, ColumnPb, RowsetStatePb, RowsetTypePb, TabletMetaPb, TabletSchemaPb,
    TabletStatePb,
};
use crate::storage::txn_manager::TxnManager;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CompactionType {
    BaseCompaction,
    CumulativeCompaction,
}

/// All instances sharing one tablet id, ordered ascending by creation
/// time, plus the tryable latch that serializes schema-change jobs
/// targeting that id.
#[derive(Default)]
struct TableInstances {
    schema_change_lock: AtomicBool,
    table_arr: Vec<Arc<Tablet>>,
}

#[derive(Default)]
struct TabletStatCache {
    stats: HashMap<TabletId, TabletStat>,
    last_update_ms: i64,
}

pub struct TabletManager {
    config: StorageConfig,
    tablet_map: RwLock<BTreeMap<TabletId, TableInstances>>,
    shutdown_tablets: Mutex<VecDeque<Arc<Tablet>>>,
    unused_rowsets: Mutex<Vec<Rowset>>,
    tablet_stat_cache: Mutex<TabletStatCache>,
    available_storage_medium_type_count: AtomicU32,
}

fn get_tablet_unlocked(
    map: &BTreeMap<TabletId, TableInstances>,
    tablet_id: TabletId,
    schema_hash: SchemaHash,
) -> Option<Arc<Tablet>> {
    map.get(&tablet_id)?
        .table_arr
        .iter()
        .find(|t| t.equal(tablet_id, schema_hash))
        .cloned()
}

fn check_tablet_id_exist_unlocked(
    map: &BTreeMap<TabletId, TableInstances>,
    tablet_id: TabletId,
) -> bool {
    map.get(&tablet_id).is_some_and(|i| !i.table_arr.is_empty())
}

impl TabletManager {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            tablet_map: RwLock::new(BTreeMap::new()),
            shutdown_tablets: Mutex::new(VecDeque::new()),
            unused_rowsets: Mutex::new(Vec::new()),
            tablet_stat_cache: Mutex::new(TabletStatCache::default()),
            available_storage_medium_type_count: AtomicU32::new(0),
        }
    }

    /// Creates a fresh tablet on the first data dir that accepts it.
    ///
    /// Idempotent: a request matching an existing `(tablet_id,
    /// schema_hash)` succeeds without side effects, while the same id
    /// under a different schema hash conflicts with `CeTabletIdExist`.
    pub fn create_tablet(
        &self,
        request: &CreateTabletRequest,
        data_dirs: &[Arc<DataDir>],
    ) -> OlapResult<()> {
        let mut map_guard = self.tablet_map.write().expect("tablet map lock");
        let map = &mut *map_guard;
        info!(
            "begin to process create tablet, tablet_id={}, schema_hash={}",
            request.tablet_id, request.tablet_schema.schema_hash
        );
        increment(&metrics().create_tablet_requests_total);

        if check_tablet_id_exist_unlocked(map, request.tablet_id) {
            if get_tablet_unlocked(map, request.tablet_id, request.tablet_schema.schema_hash)
                .is_some()
            {
                info!("create tablet success for tablet already exist");
                return Ok(());
            }
            warn!(
                "tablet with different schema hash already exists, tablet_id={}",
                request.tablet_id
            );
            return Err(OlapError::CeTabletIdExist);
        }

        match self.internal_create_tablet(map, request, false, None, data_dirs) {
            Ok(_) => {
                info!(
                    "finish to process create tablet, tablet_id={}",
                    request.tablet_id
                );
                Ok(())
            }
            Err(e) => {
                warn!("fail to create tablet, error={}", e);
                Err(OlapError::CeCmdParamsError)
            }
        }
    }

    /// Creates the derived tablet of a schema change or rollup. The new
    /// tablet's creation time is forced strictly after the base tablet's.
    pub fn create_tablet_for_schema_change(
        &self,
        request: &CreateTabletRequest,
        ref_tablet: &Arc<Tablet>,
        data_dirs: &[Arc<DataDir>],
    ) -> OlapResult<Arc<Tablet>> {
        let mut map_guard = self.tablet_map.write().expect("tablet map lock");
        let map = &mut *map_guard;
        self.internal_create_tablet(map, request, true, Some(ref_tablet), data_dirs)
    }

    fn internal_create_tablet(
        &self,
        map: &mut BTreeMap<TabletId, TableInstances>,
        request: &CreateTabletRequest,
        is_schema_change: bool,
        ref_tablet: Option<&Arc<Tablet>>,
        data_dirs: &[Arc<DataDir>],
    ) -> OlapResult<Arc<Tablet>> {
        debug_assert_eq!(is_schema_change, ref_tablet.is_some());
        let schema_hash = request.tablet_schema.schema_hash;
        if get_tablet_unlocked(map, request.tablet_id, schema_hash).is_some() {
            warn!(
                "failed to create tablet because tablet already exists, tablet_id={}, schema_hash={}",
                request.tablet_id, schema_hash
            );
            return Err(OlapError::EngineInsertExistsTable);
        }

        let tablet = self.create_tablet_meta_and_dir(request, is_schema_change, ref_tablet, data_dirs)?;

        let mut is_tablet_added = false;
        let res: OlapResult<()> = (|| {
            tablet.init()?;
            if !is_schema_change {
                // Creating the initial rowset before publishing the tablet
                // keeps it invisible until it can serve its first version.
                self.create_initial_rowset(&tablet, request)?;
            } else if let Some(ref_tablet) = ref_tablet {
                // OS clock jumps and 1-second granularity can make the new
                // tablet's creation time collide with or precede the base
                // tablet's; the creation-time order must stay strict.
                if tablet.creation_time() <= ref_tablet.creation_time() {
                    warn!(
                        "new tablet creation time is not newer than the base tablet, new={}, base={}",
                        tablet.creation_time(),
                        ref_tablet.creation_time()
                    );
                    tablet.set_creation_time(ref_tablet.creation_time() + 1);
                }
            }
            self.add_tablet_unlocked(map, tablet.clone(), true, false)?;
            is_tablet_added = true;
            if get_tablet_unlocked(map, request.tablet_id, schema_hash).is_none() {
                warn!(
                    "fail to get tablet just added, tablet_id={}, schema_hash={}",
                    request.tablet_id, schema_hash
                );
                return Err(OlapError::TableNotFound);
            }
            Ok(())
        })();

        // The pending mark is cleared no matter whether creation succeeded.
        tablet
            .data_dir()
            .remove_pending_ids(&format!("{TABLET_ID_PREFIX}{}", request.tablet_id));

        match res {
            Ok(()) => Ok(tablet),
            Err(e) => {
                increment(&metrics().create_tablet_requests_failed);
                if is_tablet_added {
                    if let Err(drop_err) =
                        self.drop_tablet_unlocked(map, request.tablet_id, schema_hash, false)
                    {
                        warn!(
                            "fail to drop tablet when create tablet failed, error={}",
                            drop_err
                        );
                    }
                } else {
                    if let Err(rm_err) = tablet.delete_all_files() {
                        warn!(
                            "fail to remove files of half-created tablet, tablet={}, error={}",
                            tablet.full_name(),
                            rm_err
                        );
                    }
                    if let Err(meta_err) =
                        TabletMetaManager::remove(tablet.data_dir(), request.tablet_id, schema_hash)
                    {
                        warn!(
                            "fail to remove meta of half-created tablet, tablet={}, error={}",
                            tablet.full_name(),
                            meta_err
                        );
                    }
                }
                Err(e)
            }
        }
    }

    /// Tries each data dir in order: allocate a shard, materialize the
    /// meta, create the schema-hash directory tree, build the in-memory
    /// tablet. The first dir where every step succeeds wins.
    fn create_tablet_meta_and_dir(
        &self,
        request: &CreateTabletRequest,
        is_schema_change: bool,
        ref_tablet: Option<&Arc<Tablet>>,
        data_dirs: &[Arc<DataDir>],
    ) -> OlapResult<Arc<Tablet>> {
        let pending_id = format!("{TABLET_ID_PREFIX}{}", request.tablet_id);
        let mut last_dir: Option<&Arc<DataDir>> = None;
        for data_dir in data_dirs {
            if let Some(last) = last_dir {
                // the previous dir failed partway; its pending mark must go
                last.remove_pending_ids(&pending_id);
            }
            last_dir = Some(data_dir);

            let tablet_meta =
                match Self::create_tablet_meta(request, data_dir, is_schema_change, ref_tablet) {
                    Ok(meta) => meta,
                    Err(e) => {
                        warn!(
                            "fail to create tablet meta, root={}, error={}",
                            data_dir.path().display(),
                            e
                        );
                        continue;
                    }
                };

            let schema_hash_dir = data_dir.schema_hash_path(
                tablet_meta.shard_id,
                request.tablet_id,
                request.tablet_schema.schema_hash,
            );
            if !schema_hash_dir.exists() {
                data_dir.add_pending_ids(&pending_id);
                if let Err(e) = std::fs::create_dir_all(&schema_hash_dir) {
                    warn!(
                        "create dir fail, path={}, error={}",
                        schema_hash_dir.display(),
                        e
                    );
                    continue;
                }
            }

            match Tablet::create_tablet_from_meta(tablet_meta, data_dir.clone()) {
                Ok(tablet) => return Ok(tablet),
                Err(e) => {
                    warn!(
                        "fail to build tablet from meta, root={}, error={}",
                        data_dir.path().display(),
                        e
                    );
                    if let Some(tablet_dir) = schema_hash_dir.parent() {
                        if let Err(rm_err) = std::fs::remove_dir_all(tablet_dir) {
                            warn!(
                                "fail to remove tablet dir {}, error={}",
                                tablet_dir.display(),
                                rm_err
                            );
                        }
                    }
                }
            }
        }
        if let Some(last) = last_dir {
            last.remove_pending_ids(&pending_id);
        }
        warn!(
            "fail to create tablet on any data dir, tablet_id={}",
            request.tablet_id
        );
        Err(OlapError::CeCmdParamsError)
    }

    /// Builds the meta for a new tablet, assigning column unique ids.
    ///
    /// Fresh tablet: unique id equals ordinal. Schema-change tablet:
    /// columns already present in the base tablet keep its unique id, new
    /// columns draw from the base tablet's `next_unique_id`.
    fn create_tablet_meta(
        request: &CreateTabletRequest,
        data_dir: &DataDir,
        is_schema_change: bool,
        ref_tablet: Option<&Arc<Tablet>>,
    ) -> OlapResult<TabletMetaPb> {
        let shard_id = data_dir.get_shard()?;

        let mut columns = Vec::with_capacity(request.tablet_schema.columns.len());
        let next_unique_id;
        if !is_schema_change {
            for (ordinal, column) in request.tablet_schema.columns.iter().enumerate() {
                columns.push(ColumnPb {
                    unique_id: ordinal as u32,
                    name: column.name.clone(),
                    column_type: column.column_type.clone(),
                    is_key: column.is_key,
                    is_nullable: column.is_nullable,
                });
            }
            next_unique_id = columns.len() as u32;
        } else {
            let ref_tablet = ref_tablet.ok_or_else(|| {
                OlapError::InputParameterError(
                    "schema change creation requires a ref tablet".to_string(),
                )
            })?;
            let ref_schema = ref_tablet.tablet_schema();
            let mut next = ref_schema.next_column_unique_id;
            for column in &request.tablet_schema.columns {
                let unique_id = match ref_schema.columns.iter().find(|c| c.name == column.name) {
                    Some(ref_column) => ref_column.unique_id,
                    None => {
                        let id = next;
                        next += 1;
                        id
                    }
                };
                columns.push(ColumnPb {
                    unique_id,
                    name: column.name.clone(),
                    column_type: column.column_type.clone(),
                    is_key: column.is_key,
                    is_nullable: column.is_nullable,
                });
            }
            next_unique_id = next;
        }
        debug!(
            "create tablet meta, tablet_id={}, next_unique_id={}",
            request.tablet_id, next_unique_id
        );

        Ok(TabletMetaPb {
            table_id: request.table_id,
            partition_id: request.partition_id,
            tablet_id: request.tablet_id,
            schema_hash: request.tablet_schema.schema_hash,
            shard_id,
            creation_time: unix_seconds(),
            cumulative_layer_point: 0,
            tablet_state: TabletStatePb::Normal as i32,
            schema: Some(TabletSchemaPb {
                columns,
                next_column_unique_id: next_unique_id,
            }),
            rowsets: Vec::new(),
            alter_task: None,
            next_rowset_id: 0,
            inc_rowsets: Vec::new(),
        })
    }

    /// Writes the initial empty rowset covering `[0, request.version]` and
    /// persists the meta with the cumulative layer point placed just past
    /// the initial version.
    fn create_initial_rowset(
        &self,
        tablet: &Arc<Tablet>,
        request: &CreateTabletRequest,
    ) -> OlapResult<()> {
        if request.version < 1 {
            warn!(
                "init version of tablet should be at least 1, version={}",
                request.version
            );
            return Err(OlapError::CeCmdParamsError);
        }
        let version = Version::new(0, request.version);
        debug!("begin to create init version, version={}", version);

        let res: OlapResult<()> = (|| {
            if version.start > version.end {
                warn!("begin should not be larger than end, version={}", version);
                return Err(OlapError::InputParameterError(format!(
                    "invalid initial version {version}"
                )));
            }
            let rowset_id = tablet.next_rowset_id();
            let context = RowsetWriterContext {
                rowset_id,
                tablet_id: tablet.tablet_id(),
                partition_id: tablet.partition_id(),
                tablet_schema_hash: tablet.schema_hash(),
                rowset_type: RowsetTypePb::Alpha,
                rowset_path_prefix: tablet.tablet_path().to_path_buf(),
                tablet_schema: tablet.tablet_schema(),
                rowset_state: RowsetStatePb::Visible,
                data_dir: tablet.data_dir().clone(),
                version,
                version_hash: request.version_hash,
            };
            let mut writer = AlphaRowsetWriter::new();
            writer.init(context)?;
            // No rows are added; the rowset only marks the version range
            // as present.
            writer.flush()?;
            let rowset = writer.build()?;
            if let Err(e) = tablet.add_rowset(&rowset) {
                warn!("fail to add rowset to tablet, tablet={}", tablet.full_name());
                self.add_unused_rowset(rowset);
                return Err(e);
            }
            Ok(())
        })();
        if let Err(e) = res {
            warn!(
                "fail to create init base version, tablet={}, version={}, error={}",
                tablet.full_name(),
                request.version,
                e
            );
            return Err(e);
        }

        tablet.set_cumulative_layer_point(request.version + 1);
        tablet.save_meta().map_err(|e| {
            warn!("fail to save header, tablet={}", tablet.full_name());
            e
        })
    }

    /// Inserts a tablet into the registry, resolving an identity clash by
    /// version/time comparison (or unconditionally when `force`, the
    /// restore path).
    fn add_tablet_unlocked(
        &self,
        map: &mut BTreeMap<TabletId, TableInstances>,
        tablet: Arc<Tablet>,
        update_meta: bool,
        force: bool,
    ) -> OlapResult<()> {
        let tablet_id = tablet.tablet_id();
        let schema_hash = tablet.schema_hash();
        debug!(
            "begin to add tablet, tablet_id={}, schema_hash={}, force={}",
            tablet_id, schema_hash, force
        );

        let Some(existing) = get_tablet_unlocked(map, tablet_id, schema_hash) else {
            info!(
                "not find exist tablet just add it to map, tablet_id={}, schema_hash={}",
                tablet_id, schema_hash
            );
            return self.add_tablet_to_map(map, tablet, update_meta, false, false);
        };

        if !force {
            if existing.tablet_path() == tablet.tablet_path() {
                warn!(
                    "add the same tablet twice! tablet_id={}, schema_hash={}",
                    tablet_id, schema_hash
                );
                return Err(OlapError::EngineInsertExistsTable);
            }
            if Arc::ptr_eq(existing.data_dir(), tablet.data_dir()) {
                warn!(
                    "add tablet with same data dir twice! tablet_id={}, schema_hash={}",
                    tablet_id, schema_hash
                );
                return Err(OlapError::EngineInsertExistsTable);
            }
        }

        let (old_version, old_time) = match existing.rowset_with_max_version() {
            Some(rowset) => (rowset.end_version, rowset.creation_time),
            None => (-1, -1),
        };
        let (new_version, new_time) = match tablet.rowset_with_max_version() {
            Some(rowset) => (rowset.end_version, rowset.creation_time),
            None => {
                // An instance with no rowset can only be a schema-change
                // target, and for those the old instance is dropped before
                // the add; hitting this with an old instance still present
                // is an invariant violation.
                error!(
                    "new tablet is empty and old tablet exists, tablet_id={}, schema_hash={}",
                    tablet_id, schema_hash
                );
                return Err(OlapError::EngineInsertExistsTable);
            }
        };

        // In the restore process all origin files in the tablet dir were
        // already replaced with the downloaded snapshot files before the
        // forced add, so the old instance must keep its files on drop.
        let keep_files = force;
        let res = if force
            || new_version > old_version
            || (new_version == old_version && new_time > old_time)
        {
            self.add_tablet_to_map(map, tablet.clone(), update_meta, keep_files, true)
        } else {
            Err(OlapError::EngineInsertExistsTable)
        };
        warn!(
            "add duplicated tablet. force={}, ok={}, tablet_id={}, schema_hash={}, old_version={}, new_version={}, old_time={}, new_time={}, old_tablet_path={}, new_tablet_path={}",
            force,
            res.is_ok(),
            tablet_id,
            schema_hash,
            old_version,
            new_version,
            old_time,
            new_time,
            existing.tablet_path().display(),
            tablet.tablet_path().display()
        );
        res
    }

    fn add_tablet_to_map(
        &self,
        map: &mut BTreeMap<TabletId, TableInstances>,
        tablet: Arc<Tablet>,
        update_meta: bool,
        keep_files: bool,
        drop_old: bool,
    ) -> OlapResult<()> {
        let tablet_id = tablet.tablet_id();
        let schema_hash = tablet.schema_hash();
        if update_meta {
            // The new tablet's meta must be durable before it is visible.
            let meta = tablet.header_rdlock();
            if let Err(e) =
                TabletMetaManager::save(tablet.data_dir(), tablet_id, schema_hash, &meta)
            {
                warn!(
                    "failed to save new tablet's meta to meta store, tablet_id={}, schema_hash={}",
                    tablet_id, schema_hash
                );
                return Err(e);
            }
        }
        if drop_old {
            // The new tablet is fresher than the current one; delete the
            // current one first.
            if let Err(e) = self.drop_tablet_directly_unlocked(map, tablet_id, schema_hash, keep_files)
            {
                warn!(
                    "failed to drop old tablet when add new tablet, tablet_id={}, schema_hash={}",
                    tablet_id, schema_hash
                );
                return Err(e);
            }
        }
        // Register into the data dir so tablets can be managed from the
        // root-path perspective, e.g. unregistering everything on a bad
        // disk.
        tablet.data_dir().register_tablet(tablet.tablet_info());
        let instances = map.entry(tablet_id).or_default();
        instances.table_arr.push(tablet);
        instances.table_arr.sort_by_key(|t| t.creation_time());
        info!(
            "add tablet to map successfully, tablet_id={}, schema_hash={}",
            tablet_id, schema_hash
        );
        Ok(())
    }

    /// Drops one tablet instance.
    ///
    /// A tablet under an unfinished schema change cannot be dropped while
    /// it is the base side; dropping the derived side (or either side once
    /// finished) also clears the peer's alter task. With
    /// `keep_files=true` the instance leaves the registry but its files
    /// and its durable meta stay as they are (the on-disk state remains
    /// `Normal`, so the tablet is loaded again on restart).
    pub fn drop_tablet(
        &self,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        keep_files: bool,
    ) -> OlapResult<()> {
        let mut map_guard = self.tablet_map.write().expect("tablet map lock");
        let map = &mut *map_guard;
        self.drop_tablet_unlocked(map, tablet_id, schema_hash, keep_files)
    }

    fn drop_tablet_unlocked(
        &self,
        map: &mut BTreeMap<TabletId, TableInstances>,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        keep_files: bool,
    ) -> OlapResult<()> {
        info!(
            "begin to process drop tablet, tablet_id={}, schema_hash={}",
            tablet_id, schema_hash
        );
        increment(&metrics().drop_tablet_requests_total);

        let Some(dropped_tablet) = get_tablet_unlocked(map, tablet_id, schema_hash) else {
            warn!(
                "tablet to drop does not exist already, tablet_id={}, schema_hash={}",
                tablet_id, schema_hash
            );
            return Ok(());
        };

        let Some(alter_task) = dropped_tablet.alter_task() else {
            return self.drop_tablet_directly_unlocked(map, tablet_id, schema_hash, keep_files);
        };

        let is_schema_change_finished =
            alter_task.alter_state() == AlterTabletStatePb::Finished;
        let Some(related_tablet) = get_tablet_unlocked(
            map,
            alter_task.related_tablet_id,
            alter_task.related_schema_hash,
        ) else {
            warn!(
                "drop tablet directly when related tablet not found, tablet_id={}, schema_hash={}",
                alter_task.related_tablet_id, alter_task.related_schema_hash
            );
            return self.drop_tablet_directly_unlocked(map, tablet_id, schema_hash, keep_files);
        };

        if Arc::ptr_eq(&related_tablet, &dropped_tablet) {
            // self-referencing alter task; invalid, treat like a missing peer
            warn!(
                "alter task of tablet points at itself, drop directly, tablet={}",
                dropped_tablet.full_name()
            );
            return self.drop_tablet_directly_unlocked(map, tablet_id, schema_hash, keep_files);
        }

        let is_drop_base_tablet =
            dropped_tablet.creation_time() < related_tablet.creation_time();
        if is_drop_base_tablet && !is_schema_change_finished {
            warn!(
                "base tablet in schema change cannot be dropped, tablet={}",
                dropped_tablet.full_name()
            );
            return Err(OlapError::PreviousSchemaChangeNotFinished);
        }

        // The link must be broken durably before the tablet is dropped: if
        // the process restarts between the two steps, a dangling link to a
        // missing tablet would survive, a dropped link never does. When the
        // save fails the in-memory link is restored and the drop is
        // refused; proceeding would leave the header on disk still naming
        // the dropped peer.
        {
            let mut related_meta = related_tablet.header_wrlock();
            let unlinked_task = related_meta.alter_task.take();
            if let Err(e) = related_tablet.save_meta_with(&related_meta) {
                related_meta.alter_task = unlinked_task;
                error!(
                    "fail to save tablet header, abort drop, tablet={}, error={}",
                    related_tablet.full_name(),
                    e
                );
                return Err(e);
            }
            self.drop_tablet_directly_unlocked(map, tablet_id, schema_hash, keep_files)?;
        }

        info!("finish to drop tablet, tablet_id={}", tablet_id);
        Ok(())
    }

    fn drop_tablet_directly_unlocked(
        &self,
        map: &mut BTreeMap<TabletId, TableInstances>,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        keep_files: bool,
    ) -> OlapResult<()> {
        let Some(dropped_tablet) = get_tablet_unlocked(map, tablet_id, schema_hash) else {
            warn!(
                "fail to drop not existed tablet, tablet_id={}, schema_hash={}",
                tablet_id, schema_hash
            );
            return Err(OlapError::TableNotFound);
        };

        let mut removed = Vec::new();
        if let Some(instances) = map.get_mut(&tablet_id) {
            instances.table_arr.retain(|t| {
                if t.equal(tablet_id, schema_hash) {
                    removed.push(t.clone());
                    false
                } else {
                    true
                }
            });
        }

        for tablet in removed {
            if keep_files {
                continue;
            }
            info!(
                "set tablet to shutdown state and remove it from memory, tablet_id={}, schema_hash={}, tablet_path={}",
                tablet_id,
                schema_hash,
                tablet.tablet_path().display()
            );
            {
                // The state transition has to go through the tablet object:
                // another thread may hold a handle and save the meta too,
                // and a direct store write would be overridden, resurrecting
                // the tablet at restart.
                let mut meta = tablet.header_wrlock();
                meta.set_tablet_state(TabletStatePb::Shutdown);
                if let Err(e) = tablet.save_meta_with(&meta) {
                    warn!(
                        "fail to drop tablet, tablet_id={}, schema_hash={}",
                        tablet_id, schema_hash
                    );
                    return Err(e);
                }
            }
            self.shutdown_tablets
                .lock()
                .expect("shutdown tablets lock")
                .push_back(tablet);
        }

        if map
            .get(&tablet_id)
            .is_some_and(|i| i.table_arr.is_empty())
        {
            map.remove(&tablet_id);
        }

        dropped_tablet
            .data_dir()
            .deregister_tablet(&dropped_tablet.tablet_info());
        Ok(())
    }

    /// Batch eviction of tablets living on a failed storage root. Only the
    /// in-memory registry is touched; no meta writes, no shutdown queue.
    pub fn drop_tablets_on_error_root_path(
        &self,
        tablet_info_vec: &[TabletInfo],
    ) -> OlapResult<()> {
        let mut map_guard = self.tablet_map.write().expect("tablet map lock");
        let map = &mut *map_guard;

        for tablet_info in tablet_info_vec {
            let tablet_id = tablet_info.tablet_id;
            let schema_hash = tablet_info.schema_hash;
            debug!(
                "drop_tablet begin, tablet_id={}, schema_hash={}",
                tablet_id, schema_hash
            );
            if get_tablet_unlocked(map, tablet_id, schema_hash).is_none() {
                warn!(
                    "dropping tablet not exist, tablet_id={}, schema_hash={}",
                    tablet_id, schema_hash
                );
                continue;
            }
            let mut bucket_is_empty = false;
            if let Some(instances) = map.get_mut(&tablet_id) {
                instances
                    .table_arr
                    .retain(|t| !t.equal(tablet_id, schema_hash));
                bucket_is_empty = instances.table_arr.is_empty();
            }
            if bucket_is_empty {
                map.remove(&tablet_id);
            }
        }
        Ok(())
    }

    /// Looks up one tablet instance. With `include_deleted` a registry
    /// miss falls back to the shutdown queue. Tablets on a failed data dir
    /// are never handed out.
    pub fn get_tablet(
        &self,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        include_deleted: bool,
    ) -> Option<Arc<Tablet>> {
        let map = self.tablet_map.read().expect("tablet map lock");
        let mut tablet = get_tablet_unlocked(&map, tablet_id, schema_hash);
        if tablet.is_none() && include_deleted {
            let shutdown_tablets = self.shutdown_tablets.lock().expect("shutdown tablets lock");
            tablet = shutdown_tablets
                .iter()
                .find(|t| t.equal(tablet_id, schema_hash))
                .cloned();
        }

        match tablet {
            Some(t) if !t.is_used() => {
                warn!("tablet cannot be used, tablet_id={}", tablet_id);
                None
            }
            other => other,
        }
    }

    pub fn get_tablets_by_id(&self, tablet_id: TabletId) -> Vec<Arc<Tablet>> {
        let map = self.tablet_map.read().expect("tablet map lock");
        map.get(&tablet_id)
            .map(|i| i.table_arr.clone())
            .unwrap_or_default()
    }

    pub fn check_tablet_id_exist(&self, tablet_id: TabletId) -> bool {
        let map = self.tablet_map.read().expect("tablet map lock");
        check_tablet_id_exist_unlocked(&map, tablet_id)
    }

    /// Installs a tablet deserialized from persisted meta bytes. Shutdown
    /// metas go straight to the shutdown queue and are not registered.
    pub fn load_tablet_from_meta(
        &self,
        data_dir: &Arc<DataDir>,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        meta_binary: &[u8],
        update_meta: bool,
        force: bool,
    ) -> OlapResult<()> {
        let mut map_guard = self.tablet_map.write().expect("tablet map lock");
        let map = &mut *map_guard;

        let tablet_meta = TabletMetaPb::decode(meta_binary).map_err(|_| {
            warn!(
                "parse meta binary failed, tablet_id={}, schema_hash={}",
                tablet_id, schema_hash
            );
            OlapError::HeaderPbParseFailed
        })?;

        let tablet = Tablet::create_tablet_from_meta(tablet_meta, data_dir.clone())?;

        if tablet.tablet_state() == TabletStatePb::Shutdown {
            info!(
                "tablet is to be deleted, skip load it, tablet={}",
                tablet.full_name()
            );
            self.shutdown_tablets
                .lock()
                .expect("shutdown tablets lock")
                .push_back(tablet);
            return Err(OlapError::TableAlreadyDeletedError);
        }

        if tablet.max_version().is_none() && tablet.alter_task().is_none() {
            warn!(
                "tablet not in schema change state without delta is invalid, tablet={}",
                tablet.full_name()
            );
            return Err(OlapError::TableIndexValidateError);
        }

        tablet.init()?;
        if let Err(e) = self.add_tablet_unlocked(map, tablet.clone(), update_meta, force) {
            if e == OlapError::EngineInsertExistsTable {
                warn!("add duplicate tablet, tablet={}", tablet.full_name());
            }
            warn!("failed to add tablet, tablet={}", tablet.full_name());
            return Err(e);
        }
        Ok(())
    }

    /// Loads a tablet from its on-disk header file, re-homing the shard id
    /// from the local path first: the header may have been copied from
    /// another backend whose shard layout differs.
    pub fn load_tablet_from_dir(
        &self,
        data_dir: &Arc<DataDir>,
        tablet_id: TabletId,
        schema_hash: SchemaHash,
        schema_hash_path: &Path,
        force: bool,
    ) -> OlapResult<()> {
        let header_path = schema_hash_path.join(format!("{tablet_id}.hdr"));
        if !header_path.exists() {
            warn!("fail to find header file, header_path={}", header_path.display());
            return Err(OlapError::FileNotExist(header_path.display().to_string()));
        }

        let shard = schema_hash_path
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .and_then(|name| name.parse::<u64>().ok())
            .ok_or_else(|| {
                warn!(
                    "fail to resolve shard from path, path={}",
                    schema_hash_path.display()
                );
                OlapError::EngineLoadIndexTableError(schema_hash_path.display().to_string())
            })?;

        let mut tablet_meta = TabletMetaPb::create_from_file(&header_path).map_err(|_| {
            warn!("fail to load tablet meta, file_path={}", header_path.display());
            OlapError::EngineLoadIndexTableError(header_path.display().to_string())
        })?;
        tablet_meta.shard_id = shard;
        let meta_binary = tablet_meta.encode_to_vec();
        self.load_tablet_from_meta(data_dir, tablet_id, schema_hash, &meta_binary, true, force)
            .map_err(|e| {
                warn!(
                    "fail to load tablet, header_path={}, error={}",
                    header_path.display(),
                    e
                );
                OlapError::EngineLoadIndexTableError(header_path.display().to_string())
            })
    }

    /// Picks the registered tablet with the highest compaction score.
    /// Derived tablets of an in-flight schema change are skipped; they are
    /// still being populated. Ties keep the first-seen tablet.
    pub fn find_best_tablet_to_compaction(
        &self,
        compaction_type: CompactionType,
    ) -> Option<Arc<Tablet>> {
        let map = self.tablet_map.read().expect("tablet map lock");
        let mut highest_score = 0u32;
        let mut best_tablet: Option<Arc<Tablet>> = None;
        for instances in map.values() {
            for tablet in &instances.table_arr {
                if let Some(alter_task) = tablet.alter_task() {
                    if alter_task.alter_state() != AlterTabletStatePb::Finished
                        && alter_task.alter_state() != AlterTabletStatePb::Failed
                    {
                        let related = get_tablet_unlocked(
                            &map,
                            alter_task.related_tablet_id,
                            alter_task.related_schema_hash,
                        );
                        if related
                            .is_some_and(|r| tablet.creation_time() > r.creation_time())
                        {
                            continue;
                        }
                    }
                }
                if !tablet.init_succeeded() || !tablet.can_do_compaction() {
                    continue;
                }

                let meta = tablet.header_rdlock();
                let score = match compaction_type {
                    CompactionType::BaseCompaction => meta.base_compaction_score(),
                    CompactionType::CumulativeCompaction => meta.cumulative_compaction_score(),
                };
                if score > highest_score {
                    highest_score = score;
                    best_tablet = Some(tablet.clone());
                }
            }
        }
        best_tablet
    }

    /// Drains the shutdown queue, moving tablet directories to trash and
    /// removing durable metas. Every branch is best-effort: entries that
    /// cannot be processed now stay queued for the next invocation.
    pub fn start_trash_sweep(&self) {
        {
            let map = self.tablet_map.read().expect("tablet map lock");
            for instances in map.values() {
                for tablet in &instances.table_arr {
                    tablet.delete_expired_inc_rowsets(self.config.inc_rowset_expired_sec);
                }
            }
        }
        self.sweep_unused_rowsets();

        let mut queue = self.shutdown_tablets.lock().expect("shutdown tablets lock");
        let mut index = 0;
        while index < queue.len() {
            if Arc::strong_count(&queue[index]) > 1 {
                // still referenced in another thread; reclaim later
                index += 1;
                continue;
            }
            let tablet = queue[index].clone();
            let tablet_id = tablet.tablet_id();
            let schema_hash = tablet.schema_hash();

            match TabletMetaManager::get_header(tablet.data_dir(), tablet_id, schema_hash) {
                Ok(Some(stored_meta)) => {
                    if stored_meta.tablet_state() != TabletStatePb::Shutdown {
                        // The tablet was re-added concurrently; its files
                        // must not be touched.
                        warn!(
                            "tablet's state changed to normal, skip remove dirs, tablet_id={}, schema_hash={}",
                            tablet_id, schema_hash
                        );
                        queue.remove(index);
                        continue;
                    }
                    if tablet.tablet_path().exists() {
                        let meta_file = tablet
                            .tablet_path()
                            .join(format!("{tablet_id}.hdr"));
                        let snapshot_res = {
                            let meta = tablet.header_rdlock();
                            meta.save_to_file(&meta_file)
                        };
                        if let Err(e) = snapshot_res {
                            warn!(
                                "fail to snapshot tablet meta before trash move, file={}, error={}",
                                meta_file.display(),
                                e
                            );
                            index += 1;
                            continue;
                        }
                        info!(
                            "start to move tablet path to trash, tablet_path={}",
                            tablet.tablet_path().display()
                        );
                        if let Err(e) = tablet.data_dir().move_to_trash(tablet.tablet_path()) {
                            warn!(
                                "failed to move dir to trash, dir={}, error={}",
                                tablet.tablet_path().display(),
                                e
                            );
                            index += 1;
                            continue;
                        }
                    }
                    if let Err(e) =
                        TabletMetaManager::remove(tablet.data_dir(), tablet_id, schema_hash)
                    {
                        warn!(
                            "fail to remove tablet meta from meta store, tablet_id={}, schema_hash={}, error={}",
                            tablet_id, schema_hash, e
                        );
                        index += 1;
                        continue;
                    }
                    info!(
                        "successfully move tablet to trash, tablet_id={}, schema_hash={}, tablet_path={}",
                        tablet_id,
                        schema_hash,
                        tablet.tablet_path().display()
                    );
                    queue.remove(index);
                }
                Ok(None) | Err(_) => {
                    // No usable meta. Keep the entry while the directory
                    // still exists; dropping files without a readable meta
                    // would lose data.
                    if tablet.tablet_path().exists() {
                        warn!(
                            "errors while load meta from store, skip this tablet, tablet_id={}, schema_hash={}",
                            tablet_id, schema_hash
                        );
                        index += 1;
                    } else {
                        info!(
                            "could not find tablet dir, skip move to trash, remove it from gc queue, tablet_id={}, schema_hash={}, tablet_path={}",
                            tablet_id,
                            schema_hash,
                            tablet.tablet_path().display()
                        );
                        queue.remove(index);
                    }
                }
            }
        }
    }

    /// Records a rowset abandoned by a failed creation; the trash sweep
    /// deletes its files once nothing references them.
    pub fn add_unused_rowset(&self, rowset: Rowset) {
        self.unused_rowsets
            .lock()
            .expect("unused rowsets lock")
            .push(rowset);
    }

    fn sweep_unused_rowsets(&self) {
        let mut unused = self.unused_rowsets.lock().expect("unused rowsets lock");
        unused.retain(|rowset| match rowset.remove_files() {
            Ok(()) => false,
            Err(e) => {
                warn!(
                    "fail to remove unused rowset files, rowset_id={}, error={}",
                    rowset.rowset_id(),
                    e
                );
                true
            }
        });
    }

    /// Tries to latch the per-tablet-id schema-change lock. Non-blocking
    /// and non-reentrant; the latch stays held until
    /// `release_schema_change_lock`.
    pub fn try_schema_change_lock(&self, tablet_id: TabletId) -> bool {
        debug!("try_schema_change_lock begin, tablet_id={}", tablet_id);
        let map = self.tablet_map.read().expect("tablet map lock");
        let Some(instances) = map.get(&tablet_id) else {
            warn!("tablet does not exist, tablet_id={}", tablet_id);
            return false;
        };
        instances
            .schema_change_lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub fn release_schema_change_lock(&self, tablet_id: TabletId) {
        debug!("release_schema_change_lock begin, tablet_id={}", tablet_id);
        let map = self.tablet_map.read().expect("tablet map lock");
        match map.get(&tablet_id) {
            Some(instances) => instances.schema_change_lock.store(false, Ordering::Release),
            None => warn!("tablet does not exist, tablet_id={}", tablet_id),
        }
    }

    /// Boot-time recovery: schema-change state survives in the headers
    /// across a restart; every task that is not finished on both sides is
    /// failed so the frontend reissues the job.
    pub fn cancel_unfinished_schema_change(&self) {
        info!("begin to cancel unfinished schema change");
        let mut canceled_num = 0u64;
        let map = self.tablet_map.read().expect("tablet map lock");
        for instances in map.values() {
            for tablet in &instances.table_arr {
                let Some(alter_task) = tablet.alter_task() else {
                    continue;
                };
                let Some(new_tablet) = get_tablet_unlocked(
                    &map,
                    alter_task.related_tablet_id,
                    alter_task.related_schema_hash,
                ) else {
                    warn!(
                        "new tablet created by alter tablet does not exist, tablet={}",
                        tablet.full_name()
                    );
                    continue;
                };

                // A finished task on both sides must survive the restart;
                // clearing it would re-trigger the whole job.
                let new_alter_task = new_tablet.alter_task();
                if alter_task.alter_state() == AlterTabletStatePb::Finished
                    && new_alter_task
                        .is_some_and(|t| t.alter_state() == AlterTabletStatePb::Finished)
                {
                    continue;
                }

                tablet.set_alter_state(AlterTabletStatePb::Failed);
                if let Err(e) = tablet.save_meta() {
                    error!(
                        "fail to save base tablet meta, base_tablet={}, error={}",
                        tablet.full_name(),
                        e
                    );
                    return;
                }
                new_tablet.set_alter_state(AlterTabletStatePb::Failed);
                if let Err(e) = new_tablet.save_meta() {
                    error!(
                        "fail to save new tablet meta, new_tablet={}, error={}",
                        new_tablet.full_name(),
                        e
                    );
                    return;
                }
                debug!(
                    "cancel unfinished alter tablet task, base_tablet={}",
                    tablet.full_name()
                );
                canceled_num += 1;
            }
        }
        info!(
            "finish to cancel unfinished schema change, canceled_num={}",
            canceled_num
        );
    }

    /// Fills the report row for one tablet; `tablet_id` and `schema_hash`
    /// of the row select the tablet.
    pub fn report_tablet_info(&self, tablet_info: &mut TabletReportInfo) -> OlapResult<()> {
        increment(&metrics().report_tablet_requests_total);
        debug!(
            "begin to process report tablet info, tablet_id={}, schema_hash={}",
            tablet_info.tablet_id, tablet_info.schema_hash
        );

        let Some(tablet) = self.get_tablet(tablet_info.tablet_id, tablet_info.schema_hash, false)
        else {
            warn!(
                "can't find tablet, tablet_id={}, schema_hash={}",
                tablet_info.tablet_id, tablet_info.schema_hash
            );
            return Err(OlapError::TableNotFound);
        };
        Self::build_tablet_info(&tablet, tablet_info);
        Ok(())
    }

    /// Builds the report rows for every registered tablet, attaching
    /// expired transaction ids, the storage medium (only meaningful when
    /// more than one medium type is available), the version count, and the
    /// path hash.
    pub fn report_all_tablets_info(
        &self,
        txn_manager: &TxnManager,
    ) -> OlapResult<HashMap<TabletId, Vec<TabletReportInfo>>> {
        debug!("begin to process report all tablets info");
        let map = self.tablet_map.read().expect("tablet map lock");
        increment(&metrics().report_all_tablets_requests_total);

        let medium_type_count = self
            .available_storage_medium_type_count
            .load(Ordering::Acquire);
        let mut tablets_info = HashMap::new();
        for (tablet_id, instances) in map.iter() {
            if instances.table_arr.is_empty() {
                continue;
            }
            let mut infos = Vec::with_capacity(instances.table_arr.len());
            for tablet in &instances.table_arr {
                let mut tablet_info = TabletReportInfo::default();
                Self::build_tablet_info(tablet, &mut tablet_info);
                tablet_info.transaction_ids = txn_manager.get_expire_txns(&tablet.tablet_info());
                if medium_type_count > 1 {
                    tablet_info.storage_medium = Some(tablet.data_dir().storage_medium());
                }
                tablet_info.version_count = tablet.version_count();
                tablet_info.path_hash = tablet.data_dir().path_hash();
                infos.push(tablet_info);
            }
            tablets_info.insert(*tablet_id, infos);
        }
        info!(
            "success to process report all tablets info, tablet_num={}",
            tablets_info.len()
        );
        Ok(tablets_info)
    }

    /// Tablet stats, rebuilt from the first instance of every bucket at
    /// most once per `tablet_stat_cache_update_interval_second`.
    pub fn get_tablet_stat(&self) -> HashMap<TabletId, TabletStat> {
        let current_ms = unix_millis();
        // Rebuild checks run under the exclusive registry lock so only one
        // thread ever rebuilds.
        let map = self.tablet_map.write().expect("tablet map lock");
        let mut cache = self.tablet_stat_cache.lock().expect("tablet stat cache lock");
        let interval_ms = self.config.tablet_stat_cache_update_interval_second * 1000;
        if current_ms - cache.last_update_ms > interval_ms {
            debug!("update tablet stat");
            cache.stats.clear();
            for (tablet_id, instances) in map.iter() {
                let Some(tablet) = instances.table_arr.first() else {
                    continue;
                };
                // only the base tablet's stat is reported
                cache.stats.insert(
                    *tablet_id,
                    TabletStat {
                        tablet_id: *tablet_id,
                        data_size: tablet.tablet_footprint(),
                        row_num: tablet.num_rows(),
                    },
                );
            }
            cache.last_update_ms = current_ms;
        }
        cache.stats.clone()
    }

    /// Folds every registered tablet's footprint into its storage root's
    /// usage info and counts the tablets.
    pub fn update_root_path_info(
        &self,
        path_map: &mut HashMap<String, DataDirInfo>,
        tablet_counter: &mut i64,
    ) {
        let map = self.tablet_map.read().expect("tablet map lock");
        for instances in map.values() {
            for tablet in &instances.table_arr {
                *tablet_counter += 1;
                let data_size = tablet.tablet_footprint();
                let dir_path = tablet.data_dir().path().to_string_lossy().to_string();
                let Some(info) = path_map.get_mut(&dir_path) else {
                    continue;
                };
                if info.is_used {
                    info.data_used_capacity += data_size;
                }
            }
        }
    }

    pub fn update_storage_medium_type_count(&self, storage_medium_type_count: u32) {
        self.available_storage_medium_type_count
            .store(storage_medium_type_count, Ordering::Release);
    }

    /// Extracts `(tablet_id, schema_hash)` from a path below one of the
    /// given storage roots; the schema-hash component may be absent and
    /// defaults to 0.
    pub fn get_tablet_id_and_schema_hash_from_path(
        data_dirs: &[Arc<DataDir>],
        path: &str,
    ) -> Option<(TabletId, SchemaHash)> {
        for data_dir in data_dirs {
            let dir_path = data_dir.path().to_string_lossy();
            if !path.contains(dir_path.as_ref()) {
                continue;
            }
            let pattern = format!(r"{}/data/\d+/(\d+)/?(\d+)?", regex::escape(&dir_path));
            let re = Regex::new(&pattern).ok()?;
            let captures = re.captures(path)?;
            let tablet_id = captures.get(1)?.as_str().parse::<TabletId>().ok()?;
            let schema_hash = captures
                .get(2)
                .and_then(|m| m.as_str().parse::<SchemaHash>().ok())
                .unwrap_or(0);
            return Some((tablet_id, schema_hash));
        }
        None
    }

    pub fn get_rowset_id_from_path(path: &str) -> Option<i64> {
        static ROWSET_ID_RE: OnceLock<Regex> = OnceLock::new();
        let re = ROWSET_ID_RE
            .get_or_init(|| Regex::new(r"/data/\d+/\d+/\d+/(\d+)_.*").expect("rowset id pattern"));
        re.captures(path)?.get(1)?.as_str().parse::<i64>().ok()
    }

    /// Drops all in-memory state. Durable metas and files are untouched.
    pub fn clear(&self) {
        self.tablet_map.write().expect("tablet map lock").clear();
        self.shutdown_tablets
            .lock()
            .expect("shutdown tablets lock")
            .clear();
        self.unused_rowsets
            .lock()
            .expect("unused rowsets lock")
            .clear();
    }

    fn build_tablet_info(tablet: &Arc<Tablet>, tablet_info: &mut TabletReportInfo) {
        let meta = tablet.header_rdlock();
        tablet_info.tablet_id = meta.tablet_id;
        tablet_info.schema_hash = meta.schema_hash;
        tablet_info.row_count = meta.num_rows();
        tablet_info.data_size = meta.tablet_footprint();
        let (version, version_hash) = meta.max_continuous_version_from_beginning();
        tablet_info.version = version.end;
        tablet_info.version_hash = version_hash;
    }
}

#[cfg(test)]
mod tests {
    use super::TabletManager;
    use crate::storage::data_dir::{DataDir, StorageMedium};
    use std::sync::Arc;

    #[test]
    fn tablet_id_and_schema_hash_from_path() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = Arc::new(DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir"));
        let base = root.path().to_string_lossy().to_string();

        let full = format!("{base}/data/12/100/7/1_0.dat");
        assert_eq!(
            TabletManager::get_tablet_id_and_schema_hash_from_path(&[dir.clone()], &full),
            Some((100, 7))
        );

        let tablet_only = format!("{base}/data/12/100");
        assert_eq!(
            TabletManager::get_tablet_id_and_schema_hash_from_path(&[dir.clone()], &tablet_only),
            Some((100, 0))
        );

        assert_eq!(
            TabletManager::get_tablet_id_and_schema_hash_from_path(&[dir], "/elsewhere/data/1/2/3"),
            None
        );
    }

    #[test]
    fn rowset_id_from_path() {
        assert_eq!(
            TabletManager::get_rowset_id_from_path("/d1/data/12/100/7/23_0.dat"),
            Some(23)
        );
        assert_eq!(
            TabletManager::get_rowset_id_from_path("/d1/data/12/100/7/header.hdr"),
            None
        );
    }
}
