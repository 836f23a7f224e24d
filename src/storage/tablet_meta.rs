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

//! Durable tablet metadata. Everything written to the per-directory meta
//! store or to `.hdr` snapshot files is one prost-encoded [`TabletMetaPb`].

use std::path::Path;

use prost::Message;

use crate::common::ids::{Version, VersionHash};
use crate::common::status::{OlapError, OlapResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq, ::prost::Enumeration)]
#[repr(i32)]
pub enum TabletStatePb {
    Normal = 0,
    Shutdown = 1,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ::prost::Enumeration)]
#[repr(i32)]
pub enum AlterTabletStatePb {
    Running = 0,
    Finished = 1,
    Failed = 2,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ::prost::Enumeration)]
#[repr(i32)]
pub enum RowsetStatePb {
    Prepared = 0,
    Committed = 1,
    Visible = 2,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ::prost::Enumeration)]
#[repr(i32)]
pub enum RowsetTypePb {
    Alpha = 0,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ColumnPb {
    #[prost(uint32, tag = "1")]
    pub unique_id: u32,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub column_type: String,
    #[prost(bool, tag = "4")]
    pub is_key: bool,
    #[prost(bool, tag = "5")]
    pub is_nullable: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TabletSchemaPb {
    #[prost(message, repeated, tag = "1")]
    pub columns: Vec<ColumnPb>,
    /// Next unique id handed out for a column added by schema change.
    #[prost(uint32, tag = "2")]
    pub next_column_unique_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowsetMetaPb {
    #[prost(int64, tag = "1")]
    pub rowset_id: i64,
    #[prost(int64, tag = "2")]
    pub start_version: i64,
    #[prost(int64, tag = "3")]
    pub end_version: i64,
    #[prost(int64, tag = "4")]
    pub version_hash: i64,
    #[prost(enumeration = "RowsetStatePb", tag = "5")]
    pub rowset_state: i32,
    #[prost(enumeration = "RowsetTypePb", tag = "6")]
    pub rowset_type: i32,
    #[prost(int64, tag = "7")]
    pub creation_time: i64,
    #[prost(int64, tag = "8")]
    pub num_rows: i64,
    #[prost(int64, tag = "9")]
    pub data_size: i64,
}

impl RowsetMetaPb {
    pub fn version(&self) -> Version {
        Version::new(self.start_version, self.end_version)
    }
}

/// Pairing between a base tablet and its derived tablet while a schema
/// change or rollup is in flight. Holds the peer identity only; the live
/// instance is resolved through the registry at each use.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AlterTaskPb {
    #[prost(int64, tag = "1")]
    pub related_tablet_id: i64,
    #[prost(int32, tag = "2")]
    pub related_schema_hash: i32,
    #[prost(enumeration = "AlterTabletStatePb", tag = "3")]
    pub alter_state: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TabletMetaPb {
    #[prost(int64, tag = "1")]
    pub table_id: i64,
    #[prost(int64, tag = "2")]
    pub partition_id: i64,
    #[prost(int64, tag = "3")]
    pub tablet_id: i64,
    #[prost(int32, tag = "4")]
    pub schema_hash: i32,
    #[prost(uint64, tag = "5")]
    pub shard_id: u64,
    #[prost(int64, tag = "6")]
    pub creation_time: i64,
    #[prost(int64, tag = "7")]
    pub cumulative_layer_point: i64,
    #[prost(enumeration = "TabletStatePb", tag = "8")]
    pub tablet_state: i32,
    #[prost(message, optional, tag = "9")]
    pub schema: Option<TabletSchemaPb>,
    #[prost(message, repeated, tag = "10")]
    pub rowsets: Vec<RowsetMetaPb>,
    #[prost(message, optional, tag = "11")]
    pub alter_task: Option<AlterTaskPb>,
    #[prost(int64, tag = "12")]
    pub next_rowset_id: i64,
    /// Incremental rowsets retained for incremental clone until expiry.
    #[prost(message, repeated, tag = "13")]
    pub inc_rowsets: Vec<RowsetMetaPb>,
}

impl TabletMetaPb {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.tablet_id, self.schema_hash)
    }

    pub fn rowset_with_max_version(&self) -> Option<&RowsetMetaPb> {
        self.rowsets.iter().max_by_key(|r| r.end_version)
    }

    pub fn max_version(&self) -> Option<Version> {
        self.rowset_with_max_version().map(RowsetMetaPb::version)
    }

    /// Longest contiguous version prefix starting at version 0. Returns the
    /// version range of the last rowset in the prefix and its hash, or
    /// `([-1,0], 0)` when no rowset starts at 0.
    pub fn max_continuous_version_from_beginning(&self) -> (Version, VersionHash) {
        let mut sorted: Vec<&RowsetMetaPb> = self.rowsets.iter().collect();
        sorted.sort_by_key(|r| r.start_version);

        let mut last: Option<&RowsetMetaPb> = None;
        for rowset in sorted {
            match last {
                None => {
                    if rowset.start_version != 0 {
                        break;
                    }
                }
                Some(prev) => {
                    if rowset.start_version != prev.end_version + 1 {
                        break;
                    }
                }
            }
            last = Some(rowset);
        }

        match last {
            Some(rowset) => (rowset.version(), rowset.version_hash),
            None => (Version::new(-1, 0), 0),
        }
    }

    pub fn num_rows(&self) -> i64 {
        self.rowsets.iter().map(|r| r.num_rows).sum()
    }

    pub fn tablet_footprint(&self) -> i64 {
        self.rowsets.iter().map(|r| r.data_size).sum()
    }

    pub fn version_count(&self) -> i64 {
        self.rowsets.len() as i64
    }

    /// Rowsets at or above the cumulative layer point, i.e. the deltas the
    /// cumulative compaction would merge.
    pub fn cumulative_compaction_score(&self) -> u32 {
        self.rowsets
            .iter()
            .filter(|r| r.start_version >= self.cumulative_layer_point)
            .count() as u32
    }

    /// Rowsets below the cumulative layer point, i.e. the base pile the base
    /// compaction would rewrite.
    pub fn base_compaction_score(&self) -> u32 {
        self.rowsets
            .iter()
            .filter(|r| r.start_version < self.cumulative_layer_point)
            .count() as u32
    }

    pub fn save_to_file(&self, path: &Path) -> OlapResult<()> {
        std::fs::write(path, self.encode_to_vec())
            .map_err(|e| OlapError::io(&format!("write meta file {}", path.display()), e))
    }

    pub fn create_from_file(path: &Path) -> OlapResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| OlapError::io(&format!("read meta file {}", path.display()), e))?;
        TabletMetaPb::decode(bytes.as_slice()).map_err(|_| OlapError::HeaderPbParseFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::{RowsetMetaPb, RowsetStatePb, RowsetTypePb, TabletMetaPb};

    fn rowset(start: i64, end: i64, version_hash: i64) -> RowsetMetaPb {
        RowsetMetaPb {
            rowset_id: end,
            start_version: start,
            end_version: end,
            version_hash,
            rowset_state: RowsetStatePb::Visible as i32,
            rowset_type: RowsetTypePb::Alpha as i32,
            creation_time: 0,
            num_rows: 0,
            data_size: 0,
        }
    }

    #[test]
    fn max_continuous_version_stops_at_gap() {
        let meta = TabletMetaPb {
            rowsets: vec![rowset(0, 2, 11), rowset(3, 3, 12), rowset(5, 5, 13)],
            ..Default::default()
        };
        let (version, version_hash) = meta.max_continuous_version_from_beginning();
        assert_eq!(version.end, 3);
        assert_eq!(version_hash, 12);
    }

    #[test]
    fn max_continuous_version_requires_version_zero_start() {
        let meta = TabletMetaPb {
            rowsets: vec![rowset(1, 2, 11)],
            ..Default::default()
        };
        let (version, _) = meta.max_continuous_version_from_beginning();
        assert_eq!(version.start, -1);
        assert_eq!(version.end, 0);
    }

    #[test]
    fn compaction_scores_split_on_cumulative_layer_point() {
        let meta = TabletMetaPb {
            cumulative_layer_point: 3,
            rowsets: vec![rowset(0, 2, 1), rowset(3, 3, 2), rowset(4, 4, 3)],
            ..Default::default()
        };
        assert_eq!(meta.base_compaction_score(), 1);
        assert_eq!(meta.cumulative_compaction_score(), 2);
    }
}
