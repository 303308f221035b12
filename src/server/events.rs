//! # Event Broadcaster
//!
//! Push-based fan-out to connected subscribers. Three channel kinds:
//! per-admin unicast, per-player unicast, and broadcast to all players.
//!
//! Each subscriber holds exactly one live sink; subscribing again under the
//! same id replaces the previous sink with no queuing or replay. Delivery
//! is best-effort and fire-and-forget: a failed write silently drops that
//! subscriber and never surfaces to the publisher. Events published while
//! a subscriber is disconnected are lost.

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;

/// A named event with a JSON payload, as delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    pub name: String,
    pub payload: Value,
}

impl GameEvent {
    pub fn new(name: &str, payload: Value) -> Self {
        Self {
            name: name.to_string(),
            payload,
        }
    }
}

/// Raised by a sink whose transport is gone.
#[derive(Debug, Error)]
#[error("subscriber sink is closed")]
pub struct SinkClosed;

/// One subscriber's outgoing half. The broadcaster only ever needs to
/// push; whatever carries the bytes (a long-lived HTTP response, a test
/// channel) lives behind this trait.
pub trait EventSink: Send {
    fn deliver(&self, event: &GameEvent) -> Result<(), SinkClosed>;
}

impl EventSink for mpsc::UnboundedSender<GameEvent> {
    fn deliver(&self, event: &GameEvent) -> Result<(), SinkClosed> {
        self.send(event.clone()).map_err(|_| SinkClosed)
    }
}

/// Owned subscriber maps. Constructed per server instance.
#[derive(Default)]
pub struct EventBroadcaster {
    admins: HashMap<String, Box<dyn EventSink>>,
    players: HashMap<String, Box<dyn EventSink>>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin_count(&self) -> usize {
        self.admins.len()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Register an admin sink, replacing any previous sink for the same id.
    /// The new subscriber gets an immediate connection confirmation.
    pub fn subscribe_admin(&mut self, admin_id: &str, sink: Box<dyn EventSink>) {
        let hello = GameEvent::new("connected", serde_json::json!({ "channel": "admin" }));
        let _ = sink.deliver(&hello);
        self.admins.insert(admin_id.to_string(), sink);
    }

    /// Register a player sink, replacing any previous sink for the same id.
    pub fn subscribe_player(&mut self, player_id: &str, sink: Box<dyn EventSink>) {
        let hello = GameEvent::new("connected", serde_json::json!({ "channel": "player" }));
        let _ = sink.deliver(&hello);
        self.players.insert(player_id.to_string(), sink);
    }

    pub fn unsubscribe_admin(&mut self, admin_id: &str) {
        self.admins.remove(admin_id);
    }

    pub fn unsubscribe_player(&mut self, player_id: &str) {
        self.players.remove(player_id);
    }

    /// Unicast to one player. A dead sink is removed, never reported.
    pub fn to_player(&mut self, player_id: &str, name: &str, payload: Value) {
        let event = GameEvent::new(name, payload);
        if let Some(sink) = self.players.get(player_id) {
            if sink.deliver(&event).is_err() {
                debug!("dropping stale player subscriber {}", player_id);
                self.players.remove(player_id);
            }
        }
    }

    /// Fan out to every connected admin.
    pub fn to_admins(&mut self, name: &str, payload: Value) {
        let event = GameEvent::new(name, payload);
        let dead: Vec<String> = self
            .admins
            .iter()
            .filter(|(_, sink)| sink.deliver(&event).is_err())
            .map(|(id, _)| id.clone())
            .collect();
        for id in dead {
            debug!("dropping stale admin subscriber {}", id);
            self.admins.remove(&id);
        }
    }

    /// Fan out to every connected player.
    pub fn to_all_players(&mut self, name: &str, payload: Value) {
        let event = GameEvent::new(name, payload);
        let dead: Vec<String> = self
            .players
            .iter()
            .filter(|(_, sink)| sink.deliver(&event).is_err())
            .map(|(id, _)| id.clone())
            .collect();
        for id in dead {
            debug!("dropping stale player subscriber {}", id);
            self.players.remove(&id);
        }
    }

    /// Pulse every connected sink so dead transports surface. Independent
    /// of event publishing; runs on its own period.
    pub fn keepalive(&mut self) {
        let pulse = GameEvent::new("keepalive", Value::Null);
        let dead_admins: Vec<String> = self
            .admins
            .iter()
            .filter(|(_, sink)| sink.deliver(&pulse).is_err())
            .map(|(id, _)| id.clone())
            .collect();
        for id in dead_admins {
            self.admins.remove(&id);
        }
        let dead_players: Vec<String> = self
            .players
            .iter()
            .filter(|(_, sink)| sink.deliver(&pulse).is_err())
            .map(|(id, _)| id.clone())
            .collect();
        for id in dead_players {
            self.players.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_sink() -> (Box<dyn EventSink>, mpsc::UnboundedReceiver<GameEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Box::new(tx), rx)
    }

    #[test]
    fn subscribe_confirms_connection() {
        let mut bus = EventBroadcaster::new();
        let (sink, mut rx) = channel_sink();
        bus.subscribe_player("p1", sink);
        let hello = rx.try_recv().expect("confirmation");
        assert_eq!(hello.name, "connected");
    }

    #[test]
    fn resubscribe_replaces_the_old_sink() {
        let mut bus = EventBroadcaster::new();
        let (first, mut first_rx) = channel_sink();
        let (second, mut second_rx) = channel_sink();
        bus.subscribe_player("p1", first);
        bus.subscribe_player("p1", second);
        assert_eq!(bus.player_count(), 1);

        bus.to_player("p1", "ping", Value::Null);
        first_rx.try_recv().expect("old hello");
        assert!(first_rx.try_recv().is_err());
        second_rx.try_recv().expect("new hello");
        let delivered = second_rx.try_recv().expect("event");
        assert_eq!(delivered.name, "ping");
    }

    #[test]
    fn dead_sinks_are_silently_removed() {
        let mut bus = EventBroadcaster::new();
        let (sink, rx) = channel_sink();
        bus.subscribe_player("p1", sink);
        drop(rx);
        bus.to_player("p1", "ping", Value::Null);
        assert_eq!(bus.player_count(), 0);
        // Publishing to the gone subscriber again is a quiet no-op.
        bus.to_player("p1", "ping", Value::Null);
    }

    #[test]
    fn admin_fanout_reaches_every_admin() {
        let mut bus = EventBroadcaster::new();
        let (a, mut a_rx) = channel_sink();
        let (b, mut b_rx) = channel_sink();
        bus.subscribe_admin("a1", a);
        bus.subscribe_admin("a2", b);
        bus.to_admins("newPlayer", serde_json::json!({ "username": "ana" }));
        a_rx.try_recv().expect("hello");
        b_rx.try_recv().expect("hello");
        assert_eq!(a_rx.try_recv().expect("event").name, "newPlayer");
        assert_eq!(b_rx.try_recv().expect("event").name, "newPlayer");
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let mut bus = EventBroadcaster::new();
        let (sink, mut rx) = channel_sink();
        bus.subscribe_player("p1", sink);
        rx.try_recv().expect("hello");
        for i in 0..5 {
            bus.to_player("p1", "seq", serde_json::json!(i));
        }
        for i in 0..5 {
            let event = rx.try_recv().expect("event");
            assert_eq!(event.payload, serde_json::json!(i));
        }
    }

    #[test]
    fn keepalive_prunes_dead_connections() {
        let mut bus = EventBroadcaster::new();
        let (live, mut live_rx) = channel_sink();
        let (dead, dead_rx) = channel_sink();
        bus.subscribe_player("live", live);
        bus.subscribe_player("dead", dead);
        drop(dead_rx);
        bus.keepalive();
        assert_eq!(bus.player_count(), 1);
        live_rx.try_recv().expect("hello");
        assert_eq!(live_rx.try_recv().expect("pulse").name, "keepalive");
    }
}
