// /////////////////////////////////////////////////////////////////////////////
// Gauge Lifecycle RS
// Copyright (c) 2026 Meridian Metrology Systems, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # In-Process Event Bus
//!
//! Synchronous publish/subscribe for cross-component reactions. Subscribers
//! run on the publishing task in subscription order; delivery is
//! best-effort; a panicking subscriber is caught and logged without
//! aborting the publisher or the remaining subscribers.
//!
//! Services publish after their transaction commits, so subscribers only
//! ever observe durable state.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error};

use gauge_lifecycle_domain::GaugeEvent;

/// A registered event consumer. Implementations must not assume delivery
/// order across publishers and must tolerate redelivery-free semantics
/// (missed events are not replayed).
pub trait EventSubscriber: Send + Sync {
    /// Stable name used for unsubscription and diagnostics.
    fn name(&self) -> &str;

    fn on_event(&self, event: &GaugeEvent);
}

/// The process-wide bus. Cheap to clone behind an `Arc`.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber; typically done once at startup.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        debug!(subscriber = subscriber.name(), "event subscriber registered");
        self.subscribers.write().push(subscriber);
    }

    /// Removes a subscriber by name. Rarely used.
    pub fn unsubscribe(&self, name: &str) {
        self.subscribers.write().retain(|s| s.name() != name);
    }

    /// Dispatches one event to every subscriber, isolating panics.
    pub fn publish(&self, event: &GaugeEvent) {
        let subscribers = self.subscribers.read().clone();
        for subscriber in subscribers {
            let result = catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event)));
            if result.is_err() {
                error!(
                    subscriber = subscriber.name(),
                    event = event.name(),
                    "event subscriber panicked"
                );
            }
        }
    }

    /// Publishes a batch in order.
    pub fn publish_all(&self, events: &[GaugeEvent]) {
        for event in events {
            self.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauge_lifecycle_domain::{AssetCreatedEvent, EquipmentType, EventMeta};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        name: String,
        seen: AtomicUsize,
    }

    impl EventSubscriber for Counter {
        fn name(&self) -> &str {
            &self.name
        }

        fn on_event(&self, _event: &GaugeEvent) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicker;

    impl EventSubscriber for Panicker {
        fn name(&self) -> &str {
            "panicker"
        }

        fn on_event(&self, _event: &GaugeEvent) {
            panic!("subscriber bug");
        }
    }

    fn sample_event() -> GaugeEvent {
        GaugeEvent::AssetCreated(AssetCreatedEvent {
            meta: EventMeta::now(),
            gauge_ref: 1,
            equipment_type: EquipmentType::HandTool,
        })
    }

    #[test]
    fn test_subscribers_receive_in_order() {
        let bus = EventBus::new();
        let counter = Arc::new(Counter {
            name: "counter".to_string(),
            seen: AtomicUsize::new(0),
        });
        bus.subscribe(counter.clone());

        bus.publish(&sample_event());
        bus.publish_all(&[sample_event(), sample_event()]);
        assert_eq!(counter.seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_panicking_subscriber_does_not_stop_dispatch() {
        let bus = EventBus::new();
        let counter = Arc::new(Counter {
            name: "counter".to_string(),
            seen: AtomicUsize::new(0),
        });
        bus.subscribe(Arc::new(Panicker));
        bus.subscribe(counter.clone());

        bus.publish(&sample_event());
        assert_eq!(
            counter.seen.load(Ordering::SeqCst),
            1,
            "later subscribers still run"
        );
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let counter = Arc::new(Counter {
            name: "counter".to_string(),
            seen: AtomicUsize::new(0),
        });
        bus.subscribe(counter.clone());
        bus.unsubscribe("counter");
        bus.publish(&sample_event());
        assert_eq!(counter.seen.load(Ordering::SeqCst), 0);
    }
}
