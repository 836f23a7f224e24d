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

//! Plain request and report types exchanged with the frontend-facing
//! service layer. The RPC encoding lives outside this crate.

use crate::common::ids::{SchemaHash, TabletId, VersionHash};
use crate::storage::data_dir::StorageMedium;

#[derive(Clone, Debug)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: String,
    pub is_key: bool,
    pub is_nullable: bool,
}

#[derive(Clone, Debug)]
pub struct CreateTabletSchema {
    pub schema_hash: SchemaHash,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Clone, Debug)]
pub struct CreateTabletRequest {
    pub tablet_id: TabletId,
    pub table_id: i64,
    pub partition_id: i64,
    pub tablet_schema: CreateTabletSchema,
    /// End version of the initial empty rowset; must be at least 1.
    pub version: i64,
    pub version_hash: VersionHash,
}

/// Per-tablet report row sent back to the frontend. `report_tablet_info`
/// fills the first six fields; the full registry walk additionally
/// attaches transactions, medium, version count and path hash.
#[derive(Clone, Debug, Default)]
pub struct TabletReportInfo {
    pub tablet_id: TabletId,
    pub schema_hash: SchemaHash,
    pub row_count: i64,
    pub data_size: i64,
    pub version: i64,
    pub version_hash: VersionHash,
    pub transaction_ids: Vec<i64>,
    pub storage_medium: Option<StorageMedium>,
    pub version_count: i64,
    pub path_hash: i64,
}

#[derive(Clone, Debug, Default)]
pub struct TabletStat {
    pub tablet_id: TabletId,
    pub data_size: i64,
    pub row_num: i64,
}
