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

//! Rowsets and the alpha rowset writer. A rowset is an immutable unit of
//! row data covering a closed version range; its files live inside the
//! owning tablet's schema-hash directory and are named
//! `{rowset_id}_{segment}.dat` / `.idx`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::common::ids::{SchemaHash, TabletId, Version, VersionHash};
use crate::common::status::{OlapError, OlapResult};
use crate::common::time_util::unix_seconds;
use crate::storage::data_dir::DataDir;
use crate::storage::tablet_meta::{RowsetMetaPb, RowsetStatePb, RowsetTypePb, TabletSchemaPb};

#[derive(Clone)]
pub struct RowsetWriterContext {
    pub rowset_id: i64,
    pub tablet_id: TabletId,
    pub partition_id: i64,
    pub tablet_schema_hash: SchemaHash,
    pub rowset_type: RowsetTypePb,
    pub rowset_path_prefix: PathBuf,
    pub tablet_schema: TabletSchemaPb,
    pub rowset_state: RowsetStatePb,
    pub data_dir: Arc<DataDir>,
    pub version: Version,
    pub version_hash: VersionHash,
}

pub struct Rowset {
    meta: RowsetMetaPb,
    rowset_path_prefix: PathBuf,
}

impl Rowset {
    pub fn new(meta: RowsetMetaPb, rowset_path_prefix: PathBuf) -> Self {
        Self {
            meta,
            rowset_path_prefix,
        }
    }

    pub fn rowset_meta(&self) -> &RowsetMetaPb {
        &self.meta
    }

    pub fn rowset_id(&self) -> i64 {
        self.meta.rowset_id
    }

    pub fn version(&self) -> Version {
        self.meta.version()
    }

    pub fn creation_time(&self) -> i64 {
        self.meta.creation_time
    }

    pub fn num_rows(&self) -> i64 {
        self.meta.num_rows
    }

    /// Deletes every file belonging to this rowset (`{rowset_id}_*` inside
    /// the tablet directory). Missing files are fine; a rowset abandoned
    /// mid-write may have produced none.
    pub fn remove_files(&self) -> OlapResult<()> {
        if !self.rowset_path_prefix.exists() {
            return Ok(());
        }
        let file_prefix = format!("{}_", self.meta.rowset_id);
        let entries = std::fs::read_dir(&self.rowset_path_prefix).map_err(|e| {
            OlapError::io(
                &format!("scan rowset dir {}", self.rowset_path_prefix.display()),
                e,
            )
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| {
                OlapError::io(
                    &format!("scan rowset dir {}", self.rowset_path_prefix.display()),
                    e,
                )
            })?;
            let keep = entry
                .file_name()
                .to_str()
                .is_none_or(|name| !name.starts_with(&file_prefix));
            if keep {
                continue;
            }
            std::fs::remove_file(entry.path()).map_err(|e| {
                OlapError::io(&format!("remove {}", entry.path().display()), e)
            })?;
        }
        Ok(())
    }
}

/// Writer for alpha rowsets. Flushing without any added rows is legal and
/// produces an empty rowset, which is how a tablet's initial version is
/// materialized.
pub struct AlphaRowsetWriter {
    context: Option<RowsetWriterContext>,
    row_buf: Vec<u8>,
    num_rows: i64,
    data_size: i64,
    flushed: bool,
}

impl Default for AlphaRowsetWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl AlphaRowsetWriter {
    pub fn new() -> Self {
        Self {
            context: None,
            row_buf: Vec::new(),
            num_rows: 0,
            data_size: 0,
            flushed: false,
        }
    }

    pub fn init(&mut self, context: RowsetWriterContext) -> OlapResult<()> {
        if !context.rowset_path_prefix.is_dir() {
            return Err(OlapError::InputParameterError(format!(
                "rowset path prefix is not a directory: {}",
                context.rowset_path_prefix.display()
            )));
        }
        self.context = Some(context);
        Ok(())
    }

    pub fn add_row(&mut self, row: &[u8]) -> OlapResult<()> {
        if self.context.is_none() {
            return Err(OlapError::InputParameterError(
                "rowset writer is not initialized".to_string(),
            ));
        }
        self.row_buf
            .write_all(&(row.len() as u32).to_le_bytes())
            .and_then(|_| self.row_buf.write_all(row))
            .map_err(|e| OlapError::io("buffer row", e))?;
        self.num_rows += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> OlapResult<()> {
        let context = self.context.as_ref().ok_or_else(|| {
            OlapError::InputParameterError("rowset writer is not initialized".to_string())
        })?;
        let data_file = context
            .rowset_path_prefix
            .join(format!("{}_0.dat", context.rowset_id));
        std::fs::write(&data_file, &self.row_buf)
            .map_err(|e| OlapError::io(&format!("write {}", data_file.display()), e))?;

        let index_file = context
            .rowset_path_prefix
            .join(format!("{}_0.idx", context.rowset_id));
        std::fs::write(&index_file, (self.num_rows as u64).to_le_bytes())
            .map_err(|e| OlapError::io(&format!("write {}", index_file.display()), e))?;

        self.data_size = self.row_buf.len() as i64;
        self.flushed = true;
        Ok(())
    }

    pub fn build(self) -> OlapResult<Rowset> {
        let context = self.context.ok_or_else(|| {
            OlapError::InputParameterError("rowset writer is not initialized".to_string())
        })?;
        if !self.flushed {
            return Err(OlapError::InputParameterError(
                "rowset writer is not flushed".to_string(),
            ));
        }
        let meta = RowsetMetaPb {
            rowset_id: context.rowset_id,
            start_version: context.version.start,
            end_version: context.version.end,
            version_hash: context.version_hash,
            rowset_state: context.rowset_state as i32,
            rowset_type: context.rowset_type as i32,
            creation_time: unix_seconds(),
            num_rows: self.num_rows,
            data_size: self.data_size,
        };
        Ok(Rowset::new(meta, context.rowset_path_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::{AlphaRowsetWriter, RowsetWriterContext};
    use crate::common::ids::Version;
    use crate::storage::data_dir::{DataDir, StorageMedium};
    use crate::storage::tablet_meta::{RowsetStatePb, RowsetTypePb, TabletSchemaPb};
    use std::sync::Arc;

    fn writer_context(dir: &Arc<DataDir>, rowset_id: i64) -> RowsetWriterContext {
        let prefix = dir.schema_hash_path(0, 100, 7);
        std::fs::create_dir_all(&prefix).expect("create tablet dir");
        RowsetWriterContext {
            rowset_id,
            tablet_id: 100,
            partition_id: 10,
            tablet_schema_hash: 7,
            rowset_type: RowsetTypePb::Alpha,
            rowset_path_prefix: prefix,
            tablet_schema: TabletSchemaPb::default(),
            rowset_state: RowsetStatePb::Visible,
            data_dir: dir.clone(),
            version: Version::new(0, 2),
            version_hash: 1234,
        }
    }

    #[test]
    fn flush_without_rows_builds_empty_rowset() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = Arc::new(DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir"));
        let mut writer = AlphaRowsetWriter::new();
        writer.init(writer_context(&dir, 1)).expect("init");
        writer.flush().expect("flush");
        let rowset = writer.build().expect("build");

        assert_eq!(rowset.num_rows(), 0);
        assert_eq!(rowset.version(), Version::new(0, 2));
        assert!(dir.schema_hash_path(0, 100, 7).join("1_0.dat").is_file());
        assert!(dir.schema_hash_path(0, 100, 7).join("1_0.idx").is_file());
    }

    #[test]
    fn added_rows_are_counted_and_removable() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = Arc::new(DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir"));
        let mut writer = AlphaRowsetWriter::new();
        writer.init(writer_context(&dir, 2)).expect("init");
        writer.add_row(b"k1v1").expect("add row");
        writer.add_row(b"k2v2").expect("add row");
        writer.flush().expect("flush");
        let rowset = writer.build().expect("build");
        assert_eq!(rowset.num_rows(), 2);
        assert!(rowset.rowset_meta().data_size > 0);

        rowset.remove_files().expect("remove files");
        assert!(!dir.schema_hash_path(0, 100, 7).join("2_0.dat").exists());
        assert!(!dir.schema_hash_path(0, 100, 7).join("2_0.idx").exists());
    }

    #[test]
    fn build_before_flush_is_rejected() {
        let root = tempfile::tempdir().expect("tempdir");
        let dir = Arc::new(DataDir::new(root.path(), StorageMedium::Hdd).expect("data dir"));
        let mut writer = AlphaRowsetWriter::new();
        writer.init(writer_context(&dir, 3)).expect("init");
        assert!(writer.build().is_err());
    }
}
