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

//! Storage-layer logging. Lines follow the glog layout
//! (`Lyyyymmdd hh:mm:ss.uuuuuu threadid file:line] message`) so the
//! output interleaves cleanly with the backend processes this crate
//! runs inside.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt};

use crate::common::app_config::StorageConfig;

static INIT: OnceLock<()> = OnceLock::new();

fn level_char(level: tracing::Level) -> char {
    match level {
        tracing::Level::ERROR => 'E',
        tracing::Level::WARN => 'W',
        tracing::Level::INFO => 'I',
        tracing::Level::DEBUG => 'D',
        tracing::Level::TRACE => 'T',
    }
}

fn format_glog_timestamp(now: &DateTime<Local>) -> String {
    now.format("%Y%m%d %H:%M:%S%.6f").to_string()
}

fn current_thread_id() -> u64 {
    // ThreadId has no stable numeric accessor; its Debug form does.
    format!("{:?}", std::thread::current().id())
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

struct StorageLogFormatter;

impl<S, N> FormatEvent<S, N> for StorageLogFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(
            writer,
            "{}{} {} {}:{}] ",
            level_char(*metadata.level()),
            format_glog_timestamp(&Local::now()),
            current_thread_id(),
            metadata.file().unwrap_or("unknown"),
            metadata.line().unwrap_or(0),
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Wires the subscriber from the storage config's `log_level`. The value
/// may be a bare level or a full filter expression such as
/// `"novastore=debug,info"`.
pub fn init_from_config(config: &StorageConfig) {
    init_with_level(&config.log_level);
}

pub fn init_with_level(level: &str) {
    INIT.get_or_init(|| {
        // ANSI escapes only when stderr is a terminal; redirected logs
        // stay plain.
        let _ = tracing_fmt()
            .with_env_filter(EnvFilter::new(level))
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .event_format(StorageLogFormatter)
            .try_init();
    });
}

pub fn init() {
    init_with_level("info");
}

pub use tracing::{debug, error, info, trace, warn};

#[cfg(test)]
mod tests {
    use super::{format_glog_timestamp, level_char};
    use chrono::TimeZone;

    #[test]
    fn level_chars_follow_glog() {
        assert_eq!(level_char(tracing::Level::ERROR), 'E');
        assert_eq!(level_char(tracing::Level::WARN), 'W');
        assert_eq!(level_char(tracing::Level::INFO), 'I');
        assert_eq!(level_char(tracing::Level::DEBUG), 'D');
        assert_eq!(level_char(tracing::Level::TRACE), 'T');
    }

    #[test]
    fn timestamp_uses_compact_date_and_microseconds() {
        let ts = chrono::Local
            .with_ymd_and_hms(2026, 8, 2, 5, 4, 3)
            .single()
            .expect("valid local time");
        assert_eq!(format_glog_timestamp(&ts), "20260802 05:04:03.000000");
    }
}
