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
//! Common utilities and helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;

use novastore::common::app_config::StorageConfig;
use novastore::storage::data_dir::{DataDir, StorageMedium};
use novastore::storage::request::{ColumnSpec, CreateTabletRequest, CreateTabletSchema};
use novastore::TabletManager;

/// One manager over one data dir, both rooted in a scratch directory that
/// lives as long as the fixture.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub data_dir: Arc<DataDir>,
    pub manager: TabletManager,
}

impl TestEnv {
    pub fn new() -> Self {
        let config = StorageConfig::default();
        novastore::novastore_logging::init_from_config(&config);
        let temp_dir = tempfile::tempdir().expect("tempdir");
        let data_dir =
            Arc::new(DataDir::new(temp_dir.path(), StorageMedium::Hdd).expect("data dir"));
        let manager = TabletManager::new(config);
        Self {
            temp_dir,
            data_dir,
            manager,
        }
    }

    pub fn data_dirs(&self) -> Vec<Arc<DataDir>> {
        vec![self.data_dir.clone()]
    }
}

pub fn create_request(tablet_id: i64, schema_hash: i32, version: i64) -> CreateTabletRequest {
    CreateTabletRequest {
        tablet_id,
        table_id: 1,
        partition_id: 10,
        tablet_schema: CreateTabletSchema {
            schema_hash,
            columns: vec![
                ColumnSpec {
                    name: "k1".to_string(),
                    column_type: "INT".to_string(),
                    is_key: true,
                    is_nullable: false,
                },
                ColumnSpec {
                    name: "v1".to_string(),
                    column_type: "BIGINT".to_string(),
                    is_key: false,
                    is_nullable: true,
                },
            ],
        },
        version,
        version_hash: 6789,
    }
}
