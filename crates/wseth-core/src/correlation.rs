//! Request correlation: id allocation and the table of pending calls.
//!
//! Responses may arrive in any order relative to the requests that caused
//! them. Each outstanding request is keyed by its id, so resolution never
//! depends on arrival order.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::error::ClientError;
use crate::request::{JsonRpcError, JsonRpcResponse};

/// Monotonic request-id allocator. Ids start at 1 and are never reused for
/// the lifetime of a connection.
#[derive(Debug, Default)]
pub struct RequestIds {
    last: u64,
}

impl RequestIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id.
    pub fn next_id(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// The most recently allocated id (0 before the first call).
    pub fn last(&self) -> u64 {
        self.last
    }
}

struct PendingEntry<C> {
    continuation: C,
    registered_at: Instant,
}

/// Outstanding requests, keyed by id.
///
/// `C` is whatever the owner needs to finish the call: a reply channel for a
/// caller, or an internal follow-up for client-issued requests.
pub struct CorrelationTable<C> {
    pending: HashMap<u64, PendingEntry<C>>,
}

impl<C> Default for CorrelationTable<C> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
        }
    }
}

impl<C> CorrelationTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending request. At most one entry may exist per id.
    pub fn register(&mut self, id: u64, continuation: C) -> Result<(), ClientError> {
        if self.pending.contains_key(&id) {
            return Err(ClientError::DuplicateId(id));
        }
        self.pending.insert(
            id,
            PendingEntry {
                continuation,
                registered_at: Instant::now(),
            },
        );
        Ok(())
    }

    /// Remove and return the continuation for `id`, if still pending.
    pub fn take(&mut self, id: u64) -> Option<C> {
        self.pending.remove(&id).map(|e| e.continuation)
    }

    /// Match a response to its pending request.
    ///
    /// Returns the continuation together with the call's outcome. A response
    /// for an unknown id (already resolved, or never issued) is dropped.
    pub fn resolve(
        &mut self,
        response: JsonRpcResponse,
    ) -> Option<(C, Result<Value, JsonRpcError>)> {
        let Some(id) = response.id.as_number() else {
            tracing::debug!(id = %response.id, "dropping response with non-numeric id");
            return None;
        };
        match self.take(id) {
            Some(continuation) => Some((continuation, response.into_result())),
            None => {
                tracing::debug!(id, "dropping response for unknown request id");
                None
            }
        }
    }

    /// Remove every entry registered longer ago than `horizon`.
    pub fn expire(&mut self, horizon: Duration, now: Instant) -> Vec<(u64, C)> {
        let stale: Vec<u64> = self
            .pending
            .iter()
            .filter(|(_, e)| now.saturating_duration_since(e.registered_at) >= horizon)
            .map(|(id, _)| *id)
            .collect();
        stale
            .into_iter()
            .filter_map(|id| self.take(id).map(|c| (id, c)))
            .collect()
    }

    /// Remove every pending entry, e.g. when the connection closes.
    pub fn drain(&mut self) -> Vec<(u64, C)> {
        self.pending
            .drain()
            .map(|(id, e)| (id, e.continuation))
            .collect()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.pending.contains_key(&id)
    }

    /// Number of outstanding requests.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is outstanding.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RpcId;
    use serde_json::json;

    fn ok(id: u64, result: Value) -> JsonRpcResponse {
        JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: RpcId::Number(id),
            result: Some(result),
            error: None,
        }
    }

    #[test]
    fn ids_strictly_increase() {
        let mut ids = RequestIds::new();
        assert_eq!(ids.last(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
        assert_eq!(ids.last(), 3);
    }

    #[test]
    fn resolves_out_of_order() {
        let mut table = CorrelationTable::new();
        table.register(1, "first").unwrap();
        table.register(2, "second").unwrap();

        let (c, res) = table.resolve(ok(2, json!("0x2"))).unwrap();
        assert_eq!(c, "second");
        assert_eq!(res.unwrap(), json!("0x2"));

        let (c, res) = table.resolve(ok(1, json!("0x1"))).unwrap();
        assert_eq!(c, "first");
        assert_eq!(res.unwrap(), json!("0x1"));
        assert!(table.is_empty());
    }

    #[test]
    fn error_response_rejects() {
        let mut table = CorrelationTable::new();
        table.register(5, ()).unwrap();
        let resp = JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: RpcId::Number(5),
            result: None,
            error: Some(JsonRpcError {
                code: -32601,
                message: "method not found".into(),
                data: None,
            }),
        };
        let ((), res) = table.resolve(resp).unwrap();
        assert_eq!(res.unwrap_err().code, -32601);
    }

    #[test]
    fn duplicate_response_is_dropped() {
        let mut table = CorrelationTable::new();
        table.register(1, ()).unwrap();
        assert!(table.resolve(ok(1, json!(null))).is_some());
        assert!(table.resolve(ok(1, json!(null))).is_none());
        assert!(table.resolve(ok(99, json!(null))).is_none());
    }

    #[test]
    fn duplicate_registration_is_refused() {
        let mut table = CorrelationTable::new();
        table.register(1, ()).unwrap();
        assert!(matches!(table.register(1, ()), Err(ClientError::DuplicateId(1))));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn expire_removes_only_stale_entries() {
        let mut table = CorrelationTable::new();
        table.register(1, ()).unwrap();
        let now = Instant::now();
        assert!(table.expire(Duration::from_secs(60), now).is_empty());
        let later = now + Duration::from_secs(61);
        let expired = table.expire(Duration::from_secs(60), later);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].0, 1);
        assert!(!table.contains(1));
    }

    #[test]
    fn drain_empties_table() {
        let mut table = CorrelationTable::new();
        table.register(1, ()).unwrap();
        table.register(2, ()).unwrap();
        assert_eq!(table.drain().len(), 2);
        assert!(table.is_empty());
    }
}
