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
use thiserror::Error;

/// Error kinds surfaced by the tablet storage layer.
///
/// Callers dispatch on the kind: duplicate-creation conflicts, schema-change
/// ordering violations and already-deleted tablets are expected protocol
/// outcomes, while the `IoError`/`MetaStoreError` carriers report
/// infrastructure failures with the underlying cause attached.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum OlapError {
    #[error("tablet with the same identity is already registered")]
    EngineInsertExistsTable,
    #[error("tablet id already exists with a different schema hash")]
    CeTabletIdExist,
    #[error("invalid create tablet parameters")]
    CeCmdParamsError,
    #[error("tablet not found")]
    TableNotFound,
    #[error("failed to build tablet from meta")]
    TableCreateFromHeaderError,
    #[error("tablet meta is internally inconsistent")]
    TableIndexValidateError,
    #[error("tablet is already marked for deletion")]
    TableAlreadyDeletedError,
    #[error("failed to parse tablet meta protobuf")]
    HeaderPbParseFailed,
    #[error("previous schema change on base tablet is not finished")]
    PreviousSchemaChangeNotFinished,
    #[error("file does not exist: {0}")]
    FileNotExist(String),
    #[error("invalid input parameter: {0}")]
    InputParameterError(String),
    #[error("failed to load tablet from directory: {0}")]
    EngineLoadIndexTableError(String),
    #[error("io failed: {0}")]
    IoError(String),
    #[error("meta store operation failed: {0}")]
    MetaStoreError(String),
}

pub type OlapResult<T> = Result<T, OlapError>;

impl OlapError {
    pub fn io(action: &str, err: std::io::Error) -> Self {
        OlapError::IoError(format!("{action}: {err}"))
    }
}
