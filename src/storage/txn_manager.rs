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

//! Minimal transaction bookkeeping: prepared transactions per tablet with
//! their prepare time. Tablet reporting asks for the expired ones so the
//! frontend can clean them up.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::common::ids::TabletInfo;
use crate::common::time_util::unix_seconds;

pub struct TxnManager {
    pending_data_expire_time_sec: i64,
    txns: Mutex<HashMap<TabletInfo, HashMap<i64, i64>>>,
}

impl TxnManager {
    pub fn new(pending_data_expire_time_sec: i64) -> Self {
        Self {
            pending_data_expire_time_sec,
            txns: Mutex::new(HashMap::new()),
        }
    }

    pub fn prepare_txn(&self, txn_id: i64, tablet_info: TabletInfo) {
        let mut txns = self.txns.lock().expect("txn manager lock");
        txns.entry(tablet_info)
            .or_default()
            .insert(txn_id, unix_seconds());
    }

    pub fn delete_txn(&self, txn_id: i64, tablet_info: &TabletInfo) {
        let mut txns = self.txns.lock().expect("txn manager lock");
        if let Some(per_tablet) = txns.get_mut(tablet_info) {
            per_tablet.remove(&txn_id);
            if per_tablet.is_empty() {
                txns.remove(tablet_info);
            }
        }
    }

    /// Transaction ids prepared against the tablet longer ago than the
    /// expire interval, sorted ascending.
    pub fn get_expire_txns(&self, tablet_info: &TabletInfo) -> Vec<i64> {
        let now = unix_seconds();
        let txns = self.txns.lock().expect("txn manager lock");
        let mut expired: Vec<i64> = txns
            .get(tablet_info)
            .map(|per_tablet| {
                per_tablet
                    .iter()
                    .filter(|(_, prepare_time)| now - **prepare_time > self.pending_data_expire_time_sec)
                    .map(|(txn_id, _)| *txn_id)
                    .collect()
            })
            .unwrap_or_default();
        expired.sort_unstable();
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::TxnManager;
    use crate::common::ids::TabletInfo;

    #[test]
    fn fresh_txns_are_not_expired() {
        let manager = TxnManager::new(1800);
        let info = TabletInfo::new(100, 7);
        manager.prepare_txn(9001, info);
        assert!(manager.get_expire_txns(&info).is_empty());
    }

    #[test]
    fn zero_interval_expires_old_txns() {
        let manager = TxnManager::new(-1);
        let info = TabletInfo::new(100, 7);
        manager.prepare_txn(9002, info);
        manager.prepare_txn(9001, info);
        assert_eq!(manager.get_expire_txns(&info), vec![9001, 9002]);

        manager.delete_txn(9001, &info);
        assert_eq!(manager.get_expire_txns(&info), vec![9002]);
    }
}
