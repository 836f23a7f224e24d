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
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Request counters for the storage layer, incremented on operation entry
/// (`*_total`) and on the failure paths (`*_failed`).
#[derive(Debug, Default)]
pub struct StorageMetrics {
    pub create_tablet_requests_total: AtomicU64,
    pub create_tablet_requests_failed: AtomicU64,
    pub drop_tablet_requests_total: AtomicU64,
    pub report_tablet_requests_total: AtomicU64,
    pub report_all_tablets_requests_total: AtomicU64,
}

pub fn metrics() -> &'static StorageMetrics {
    static METRICS: OnceLock<StorageMetrics> = OnceLock::new();
    METRICS.get_or_init(StorageMetrics::default)
}

pub fn increment(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}
