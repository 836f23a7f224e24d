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
use std::fmt;

/// Tablet id assigned by the frontend. Globally unique within a cluster.
pub type TabletId = i64;

/// Stable hash of a physical column layout. Distinct hashes under one
/// tablet id denote distinct physical layouts of the same logical table.
pub type SchemaHash = i32;

pub type VersionHash = i64;

/// Identity of one tablet instance. Two instances may share a tablet id
/// during a schema change but never the full pair.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TabletInfo {
    pub tablet_id: TabletId,
    pub schema_hash: SchemaHash,
}

impl TabletInfo {
    pub const fn new(tablet_id: TabletId, schema_hash: SchemaHash) -> Self {
        Self {
            tablet_id,
            schema_hash,
        }
    }
}

impl fmt::Display for TabletInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tablet_id, self.schema_hash)
    }
}

/// Closed version range `[start, end]` covered by one rowset.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Version {
    pub start: i64,
    pub end: i64,
}

impl Version {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::{TabletInfo, Version};

    #[test]
    fn tablet_info_display_uses_full_name() {
        assert_eq!(TabletInfo::new(100, 7).to_string(), "100.7");
    }

    #[test]
    fn version_display_uses_range() {
        assert_eq!(Version::new(0, 2).to_string(), "[0-2]");
    }
}
