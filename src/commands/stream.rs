//! Types shared by the stream commands.

use std::time::Duration;

use bytes::Bytes;

use crate::command::{Command, ToArg};
use crate::commands::{array, bytes, ceil_millis, integer, string};
use crate::frame::Frame;
use crate::Error;

/// `MAXLEN`/`MINID` trimming applied by XADD. Exact (`=`) unless made approximate (`~`);
/// `LIMIT` only exists for approximate trimming, so setting it switches the mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamTrim {
    strategy: TrimStrategy,
    exact: bool,
    limit: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrimStrategy {
    /// Evict entries while the stream is longer than this.
    MaxLen(u64),
    /// Evict entries with an id lower than this.
    MinId(String),
}

impl StreamTrim {
    pub fn max_len(len: u64) -> StreamTrim {
        StreamTrim {
            strategy: TrimStrategy::MaxLen(len),
            exact: true,
            limit: None,
        }
    }

    pub fn min_id(id: impl Into<String>) -> StreamTrim {
        StreamTrim {
            strategy: TrimStrategy::MinId(id.into()),
            exact: true,
            limit: None,
        }
    }

    /// Lets the server trim whole nodes only, which may leave a few extra entries.
    pub fn approximate(mut self) -> StreamTrim {
        self.exact = false;
        self
    }

    /// Caps the number of entries evicted by one trim. Implies [`approximate`](Self::approximate).
    pub fn limit(mut self, limit: u64) -> StreamTrim {
        self.exact = false;
        self.limit = Some(limit);
        self
    }

    pub fn strategy(&self) -> &TrimStrategy {
        &self.strategy
    }

    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub fn max_evictions(&self) -> Option<u64> {
        self.limit
    }

    pub(crate) fn push_args(&self, cmd: &mut Command) {
        match &self.strategy {
            TrimStrategy::MaxLen(len) => {
                cmd.push_arg("MAXLEN");
                cmd.push_arg(if self.exact { "=" } else { "~" });
                cmd.push_arg(*len);
            }
            TrimStrategy::MinId(id) => {
                cmd.push_arg("MINID");
                cmd.push_arg(if self.exact { "=" } else { "~" });
                cmd.push_arg(id);
            }
        }
        if let Some(limit) = self.limit {
            cmd.push_arg("LIMIT");
            cmd.push_arg(limit);
        }
    }
}

/// One end of an XRANGE interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamRangeBound {
    /// `-`, the smallest id in the stream.
    Min,
    /// `+`, the greatest id in the stream.
    Max,
    Inclusive(String),
    Exclusive(String),
}

impl StreamRangeBound {
    pub(crate) fn to_arg(&self) -> String {
        match self {
            StreamRangeBound::Min => "-".to_string(),
            StreamRangeBound::Max => "+".to_string(),
            StreamRangeBound::Inclusive(id) => id.clone(),
            StreamRangeBound::Exclusive(id) => format!("({}", id),
        }
    }
}

/// `BLOCK` and `COUNT` for XREAD and XREADGROUP.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamReadOptions {
    /// Wait up to this long for entries. Zero blocks forever, which needs a client without a
    /// request timeout.
    pub block: Option<Duration>,
    /// At most this many entries per stream.
    pub count: Option<u64>,
}

impl StreamReadOptions {
    pub fn block(mut self, block: Duration) -> StreamReadOptions {
        self.block = Some(block);
        self
    }

    pub fn count(mut self, count: u64) -> StreamReadOptions {
        self.count = Some(count);
        self
    }

    pub(crate) fn push_args(&self, cmd: &mut Command) {
        if let Some(block) = self.block {
            cmd.push_arg("BLOCK");
            cmd.push_arg(ceil_millis(block));
        }
        if let Some(count) = self.count {
            cmd.push_arg("COUNT");
            cmd.push_arg(count);
        }
    }
}

/// XREADGROUP options: those of XREAD plus `NOACK`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamReadGroupOptions {
    pub read: StreamReadOptions,
    /// Deliver without adding the entries to the pending entries list.
    pub no_ack: bool,
}

impl StreamReadGroupOptions {
    pub fn block(mut self, block: Duration) -> StreamReadGroupOptions {
        self.read = self.read.block(block);
        self
    }

    pub fn count(mut self, count: u64) -> StreamReadGroupOptions {
        self.read = self.read.count(count);
        self
    }

    pub fn no_ack(mut self) -> StreamReadGroupOptions {
        self.no_ack = true;
        self
    }

    pub(crate) fn push_args(&self, cmd: &mut Command) {
        self.read.push_args(cmd);
        if self.no_ack {
            cmd.push_arg("NOACK");
        }
    }
}

/// XGROUP CREATE options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamGroupOptions {
    /// Create an empty stream when the key does not exist (`MKSTREAM`).
    pub make_stream: bool,
    /// Number of entries the group is considered to have read already (`ENTRIESREAD`, Redis
    /// 7.0 and later).
    pub entries_read: Option<u64>,
}

impl StreamGroupOptions {
    pub fn make_stream(mut self) -> StreamGroupOptions {
        self.make_stream = true;
        self
    }

    pub fn entries_read(mut self, entries_read: u64) -> StreamGroupOptions {
        self.entries_read = Some(entries_read);
        self
    }

    pub(crate) fn push_args(&self, cmd: &mut Command) {
        if self.make_stream {
            cmd.push_arg("MKSTREAM");
        }
        if let Some(entries_read) = self.entries_read {
            cmd.push_arg("ENTRIESREAD");
            cmd.push_arg(entries_read);
        }
    }
}

/// Filters for the extended form of XPENDING.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamPendingOptions {
    /// Only entries idle for at least this long (`IDLE`, Redis 6.2 and later).
    pub min_idle_time: Option<Duration>,
    /// Only entries owned by this consumer.
    pub consumer: Option<Bytes>,
}

impl StreamPendingOptions {
    pub fn min_idle_time(mut self, min_idle_time: Duration) -> StreamPendingOptions {
        self.min_idle_time = Some(min_idle_time);
        self
    }

    pub fn consumer(mut self, consumer: impl ToArg) -> StreamPendingOptions {
        self.consumer = Some(consumer.to_arg());
        self
    }
}

/// XCLAIM options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamClaimOptions {
    /// Idle time to set on the claimed entries. The server resets it to zero otherwise.
    pub idle: Option<Duration>,
    /// Like `idle`, as an absolute Unix time in milliseconds.
    pub idle_unix_time: Option<u64>,
    pub retry_count: Option<u64>,
    /// Claim entries that are not in the pending entries list yet.
    pub force: bool,
}

impl StreamClaimOptions {
    pub fn idle(mut self, idle: Duration) -> StreamClaimOptions {
        self.idle = Some(idle);
        self
    }

    pub fn idle_unix_time(mut self, millis: u64) -> StreamClaimOptions {
        self.idle_unix_time = Some(millis);
        self
    }

    pub fn retry_count(mut self, retry_count: u64) -> StreamClaimOptions {
        self.retry_count = Some(retry_count);
        self
    }

    pub fn force(mut self) -> StreamClaimOptions {
        self.force = true;
        self
    }

    pub(crate) fn push_args(&self, cmd: &mut Command) {
        if let Some(idle) = self.idle {
            cmd.push_arg("IDLE");
            cmd.push_arg(ceil_millis(idle));
        }
        if let Some(time) = self.idle_unix_time {
            cmd.push_arg("TIME");
            cmd.push_arg(time);
        }
        if let Some(retry_count) = self.retry_count {
            cmd.push_arg("RETRYCOUNT");
            cmd.push_arg(retry_count);
        }
        if self.force {
            cmd.push_arg("FORCE");
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: String,
    /// Empty for an entry deleted while it was pending, which XREADGROUP reports without fields.
    pub fields: Vec<(Bytes, Bytes)>,
}

/// Entries read from one stream by XREAD or XREADGROUP.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamRead {
    pub key: Bytes,
    pub entries: Vec<StreamEntry>,
}

impl StreamRead {
    /// Parses `[[key, [entry, ...]], ...]`. A null reply means a blocking read timed out.
    pub(crate) fn from_reply(frame: Frame) -> Result<Vec<StreamRead>, Error> {
        if frame.is_null() {
            return Ok(vec![]);
        }

        array(frame)?
            .into_iter()
            .map(|stream| {
                let [key, entries] = pair(stream, "stream")?;
                Ok::<_, Error>(StreamRead {
                    key: bytes(key)?,
                    entries: array(entries)?
                        .into_iter()
                        .map(StreamEntry::from_frame)
                        .collect::<Result<_, _>>()?,
                })
            })
            .collect()
    }
}

/// The XPENDING summary of a consumer group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSummary {
    pub count: i64,
    pub min_id: Option<String>,
    pub max_id: Option<String>,
    /// Pending entries per consumer.
    pub consumers: Vec<(String, u64)>,
}

impl PendingSummary {
    pub(crate) fn from_frame(frame: Frame) -> Result<PendingSummary, Error> {
        let [count, min_id, max_id, consumers]: [Frame; 4] =
            array(frame)?.try_into().map_err(|parts: Vec<Frame>| Error::UnexpectedReply {
                expected: "pending summary",
                actual: Frame::Array(parts),
            })?;

        let consumers = match consumers {
            Frame::Null => vec![],
            consumers => array(consumers)?
                .into_iter()
                .map(|consumer| {
                    let [name, count] = pair(consumer, "consumer")?;
                    let count = string(count)?;
                    let parsed = count.parse::<u64>().map_err(|_| Error::UnexpectedReply {
                        expected: "pending count",
                        actual: Frame::Bulk(Bytes::from(count)),
                    })?;
                    Ok::<_, Error>((string(name)?, parsed))
                })
                .collect::<Result<_, _>>()?,
        };

        Ok(PendingSummary {
            count: integer(count)?,
            min_id: optional_string(min_id)?,
            max_id: optional_string(max_id)?,
            consumers,
        })
    }
}

/// One row of the extended XPENDING form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEntry {
    pub id: String,
    pub consumer: String,
    /// Time since the entry was last delivered.
    pub idle: Duration,
    pub deliveries: u64,
}

impl PendingEntry {
    pub(crate) fn from_frame(frame: Frame) -> Result<PendingEntry, Error> {
        let [id, consumer, idle, deliveries]: [Frame; 4] =
            array(frame)?.try_into().map_err(|parts: Vec<Frame>| Error::UnexpectedReply {
                expected: "pending entry",
                actual: Frame::Array(parts),
            })?;

        Ok(PendingEntry {
            id: string(id)?,
            consumer: string(consumer)?,
            idle: Duration::from_millis(non_negative(idle)?),
            deliveries: non_negative(deliveries)?,
        })
    }
}

fn pair(frame: Frame, expected: &'static str) -> Result<[Frame; 2], Error> {
    array(frame)?
        .try_into()
        .map_err(|parts: Vec<Frame>| Error::UnexpectedReply {
            expected,
            actual: Frame::Array(parts),
        })
}

fn optional_string(frame: Frame) -> Result<Option<String>, Error> {
    match frame {
        Frame::Null => Ok(None),
        frame => string(frame).map(Some),
    }
}

fn non_negative(frame: Frame) -> Result<u64, Error> {
    let i = integer(frame)?;
    u64::try_from(i).map_err(|_| Error::UnexpectedReply {
        expected: "non-negative integer",
        actual: Frame::Integer(i),
    })
}

impl StreamEntry {
    /// Parses `[id, [field, value, ...]]`.
    pub(crate) fn from_frame(frame: Frame) -> Result<StreamEntry, Error> {
        let [id, fields] = pair(frame, "stream entry")?;

        if fields.is_null() {
            return Ok(StreamEntry {
                id: string(id)?,
                fields: vec![],
            });
        }

        let mut flat = array(fields)?.into_iter();
        let mut fields = Vec::with_capacity(flat.len() / 2);
        while let Some(field) = flat.next() {
            let Some(value) = flat.next() else {
                return Err(Error::UnexpectedReply {
                    expected: "field value",
                    actual: field,
                });
            };
            fields.push((bytes(field)?, bytes(value)?));
        }

        Ok(StreamEntry {
            id: string(id)?,
            fields,
        })
    }
}
