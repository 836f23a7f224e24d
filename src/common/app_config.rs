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
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tablet_stat_cache_update_interval_second() -> i64 {
    300
}

fn default_pending_data_expire_time_sec() -> i64 {
    1800
}

fn default_inc_rowset_expired_sec() -> i64 {
    1800
}

/// Storage-layer configuration. Each engine instance owns one value;
/// there is no process-global config state.
#[derive(Clone, Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Minimum age of the tablet stat cache before `get_tablet_stat`
    /// rebuilds it.
    #[serde(default = "default_tablet_stat_cache_update_interval_second")]
    pub tablet_stat_cache_update_interval_second: i64,

    /// Prepared transactions older than this are reported as expired.
    #[serde(default = "default_pending_data_expire_time_sec")]
    pub pending_data_expire_time_sec: i64,

    /// Incremental rowsets kept for incremental clone are dropped after
    /// this many seconds.
    #[serde(default = "default_inc_rowset_expired_sec")]
    pub inc_rowset_expired_sec: i64,
}

impl StorageConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let cfg: StorageConfig =
            toml::from_str(&s).with_context(|| format!("parse toml: {}", path.display()))?;
        Ok(cfg)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            tablet_stat_cache_update_interval_second:
                default_tablet_stat_cache_update_interval_second(),
            pending_data_expire_time_sec: default_pending_data_expire_time_sec(),
            inc_rowset_expired_sec: default_inc_rowset_expired_sec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StorageConfig;

    #[test]
    fn default_config_has_stat_cache_interval() {
        let cfg = StorageConfig::default();
        assert_eq!(cfg.tablet_stat_cache_update_interval_second, 300);
        assert_eq!(cfg.pending_data_expire_time_sec, 1800);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: StorageConfig =
            toml::from_str("tablet_stat_cache_update_interval_second = 1").expect("parse");
        assert_eq!(cfg.tablet_stat_cache_update_interval_second, 1);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.inc_rowset_expired_sec, 1800);
    }
}
