//! Size-bounded batching of traffic records.
//!
//! A [`PendingBatch`] collects records in arrival order and serializes them
//! as one JSON array. Each record is encoded once on arrival; the size of
//! the array is tracked from those encodings so that the limit check does
//! not re-serialize the whole batch.

use crate::json;
use crate::traffic::TrafficRecord;

use super::error::PublishError;

/// One serialized datagram ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// ASCII JSON payload.
    pub payload: Vec<u8>,
    /// Number of traffic records in the payload.
    pub records: usize,
}

impl Datagram {
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    record: TrafficRecord,
    json: Vec<u8>,
}

/// Ordered records awaiting publication as one JSON array.
#[derive(Debug, Clone)]
pub struct PendingBatch {
    entries: Vec<Entry>,
    /// Sum of the encoded record lengths.
    content_len: usize,
    /// Maximum serialized size of a flushed array.
    limit: usize,
}

impl PendingBatch {
    /// Create an empty batch with the given serialized size limit in bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            content_len: 0,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records currently buffered, in arrival order.
    pub fn records(&self) -> impl Iterator<Item = &TrafficRecord> {
        self.entries.iter().map(|entry| &entry.record)
    }

    /// Serialized size of the batch as a JSON array.
    pub fn serialized_len(&self) -> usize {
        Self::array_len(self.entries.len(), self.content_len)
    }

    /// `[` + records joined by `,` + `]`
    fn array_len(count: usize, content_len: usize) -> usize {
        2 + content_len + count.saturating_sub(1)
    }

    /// Append a record, flushing first if it would push the batch over the limit.
    ///
    /// Returns the datagrams to send, in order:
    /// - nothing, if the record fits;
    /// - the previous batch, if appending would exceed the limit;
    /// - the record alone as a batch of one, if its array is over the limit
    ///   by itself. Such a datagram is larger than the limit.
    pub fn push(&mut self, record: TrafficRecord) -> Result<Vec<Datagram>, PublishError> {
        let json = json::to_ascii_vec(&record)?;
        let mut out = Vec::new();

        let grown = Self::array_len(self.entries.len() + 1, self.content_len + json.len());
        if grown > self.limit {
            if let Some(previous) = self.take() {
                out.push(previous);
            }
        }

        self.content_len += json.len();
        self.entries.push(Entry { record, json });

        if self.serialized_len() > self.limit {
            // A single record that does not fit on its own.
            out.extend(self.take());
        }

        Ok(out)
    }

    /// Serialize the batch and clear it. `None` if empty.
    pub fn take(&mut self) -> Option<Datagram> {
        if self.entries.is_empty() {
            return None;
        }

        let mut payload = Vec::with_capacity(self.serialized_len());
        payload.push(b'[');
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                payload.push(b',');
            }
            payload.extend_from_slice(&entry.json);
        }
        payload.push(b']');

        let records = self.entries.len();
        self.entries.clear();
        self.content_len = 0;

        Some(Datagram { payload, records })
    }
}
