//! Subscription routing.
//!
//! The node pushes events tagged with the id it assigned at `eth_subscribe`
//! time. The router maps that id back to the caller's logical channel name
//! (e.g. `"newHeads"`), under which the client re-emits the payload.

use std::collections::HashMap;

use serde_json::Value;

/// A unique subscription ID returned by `eth_subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub String);

impl SubscriptionId {
    /// Interpret an `eth_subscribe` result. Nodes return a hex string; some
    /// return a bare number.
    pub fn from_result(result: &Value) -> Option<Self> {
        match result {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SubscriptionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SubscriptionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server subscription id → logical channel name.
///
/// Owned by the connection task; never shared.
#[derive(Debug, Default)]
pub struct EventRouter {
    routes: HashMap<SubscriptionId, String>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a confirmed subscription.
    pub fn register(&mut self, id: SubscriptionId, channel: impl Into<String>) {
        self.routes.insert(id, channel.into());
    }

    /// Channel name for a pushed event, if the subscription is known.
    pub fn route(&self, id: &SubscriptionId) -> Option<&str> {
        self.routes.get(id).map(String::as_str)
    }

    /// Forget a subscription (after `eth_unsubscribe`).
    pub fn remove(&mut self, id: &SubscriptionId) -> Option<String> {
        self.routes.remove(id)
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if there are no active subscriptions.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_and_route() {
        let mut router = EventRouter::new();
        let id = SubscriptionId("0xdeadbeef".into());
        router.register(id.clone(), "newHeads");
        assert_eq!(router.route(&id), Some("newHeads"));
        assert_eq!(router.route(&SubscriptionId::from("0xother")), None);
    }

    #[test]
    fn remove_subscription() {
        let mut router = EventRouter::new();
        let id = SubscriptionId("0x1".into());
        router.register(id.clone(), "logs");
        assert_eq!(router.len(), 1);
        assert_eq!(router.remove(&id).as_deref(), Some("logs"));
        assert!(router.is_empty());
    }

    #[test]
    fn several_ids_per_channel() {
        let mut router = EventRouter::new();
        router.register("0xa".into(), "logs");
        router.register("0xb".into(), "logs");
        router.register("0xc".into(), "newHeads");
        assert_eq!(router.route(&"0xa".into()), Some("logs"));
        assert_eq!(router.route(&"0xb".into()), Some("logs"));

        router.remove(&"0xa".into());
        assert_eq!(router.route(&"0xa".into()), None);
        assert_eq!(router.route(&"0xb".into()), Some("logs"));
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn subscription_id_from_result() {
        assert_eq!(
            SubscriptionId::from_result(&json!("0x9cef478923ff08bf67fde6c64013158d")),
            Some(SubscriptionId::from("0x9cef478923ff08bf67fde6c64013158d"))
        );
        assert_eq!(SubscriptionId::from_result(&json!(7)), Some(SubscriptionId::from("7")));
        assert_eq!(SubscriptionId::from_result(&json!(null)), None);
        assert_eq!(SubscriptionId::from_result(&json!("")), None);
    }
}
