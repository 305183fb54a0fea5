// SPDX-License-Identifier: MIT
// Copyright 2026 The PixPro Authors

//! Single-flight coordination keyed by operation.
//!
//! The first caller for a key becomes the leader and performs the work;
//! callers arriving while the leader is running become followers and wait
//! for the leader's outcome. When the leader drains, the key returns to
//! idle and every follower receives a clone of the outcome in arrival order.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::hash::Hash;
use tokio::sync::oneshot;

/// In-flight operations and their waiting continuations.
pub struct SingleFlight<K, T>
where
    K: Eq + Hash + Clone,
{
    inflight: DashMap<K, Vec<oneshot::Sender<T>>>,
}

/// Role assigned by [`SingleFlight::start_or_join`].
pub enum Flight<'a, K, T>
where
    K: Eq + Hash + Clone,
{
    /// No operation was running; the caller must perform it and drain.
    Leader(FlightLeader<'a, K, T>),
    /// An operation is running; await the receiver for its outcome.
    ///
    /// The receiver errors if the leader is dropped without draining.
    Follower(oneshot::Receiver<T>),
}

/// Handle held by the caller performing the operation.
///
/// Dropping it without calling [`FlightLeader::drain`] returns the key to
/// idle and wakes followers with a receive error.
pub struct FlightLeader<'a, K, T>
where
    K: Eq + Hash + Clone,
{
    flights: &'a SingleFlight<K, T>,
    key: Option<K>,
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    pub fn new() -> Self {
        Self {
            inflight: DashMap::new(),
        }
    }

    /// Become the leader for `key`, or join the operation already running.
    pub fn start_or_join(&self, key: K) -> Flight<'_, K, T> {
        match self.inflight.entry(key.clone()) {
            Entry::Occupied(mut waiting) => {
                let (tx, rx) = oneshot::channel();
                waiting.get_mut().push(tx);
                Flight::Follower(rx)
            }
            Entry::Vacant(slot) => {
                slot.insert(Vec::new());
                Flight::Leader(FlightLeader {
                    flights: self,
                    key: Some(key),
                })
            }
        }
    }

    /// Whether an operation for `key` is currently running.
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.inflight.contains_key(key)
    }

    /// Number of followers queued behind the running operation for `key`.
    pub fn waiting(&self, key: &K) -> usize {
        self.inflight.get(key).map(|w| w.len()).unwrap_or(0)
    }

    /// Settle `key`: return it to idle and deliver `outcome` to all waiters.
    ///
    /// Returns the number of waiters that were still listening.
    fn drain(&self, key: &K, outcome: T) -> usize {
        let waiters = self
            .inflight
            .remove(key)
            .map(|(_, waiters)| waiters)
            .unwrap_or_default();

        waiters
            .into_iter()
            .filter(|tx| !tx.is_closed())
            .map(|tx| tx.send(outcome.clone()).is_ok())
            .filter(|delivered| *delivered)
            .count()
    }
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> FlightLeader<'_, K, T>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    /// Publish the outcome to every follower and return to idle.
    pub fn drain(mut self, outcome: T) -> usize {
        match self.key.take() {
            Some(key) => self.flights.drain(&key, outcome),
            None => 0,
        }
    }
}

impl<K, T> Drop for FlightLeader<'_, K, T>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            // Dropping the senders wakes followers with RecvError.
            self.flights.inflight.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_caller_leads_later_callers_follow() {
        let flights: SingleFlight<&str, u32> = SingleFlight::new();

        let leader = flights.start_or_join("refresh");
        assert!(matches!(leader, Flight::Leader(_)));
        assert!(flights.is_in_flight(&"refresh"));

        let follower = flights.start_or_join("refresh");
        assert!(matches!(follower, Flight::Follower(_)));
        assert_eq!(flights.waiting(&"refresh"), 1);

        // Other keys are independent.
        assert!(matches!(flights.start_or_join("other"), Flight::Leader(_)));
    }

    #[tokio::test]
    async fn test_drain_delivers_to_all_followers() {
        let flights: SingleFlight<&str, Result<u32, String>> = SingleFlight::new();

        let Flight::Leader(leader) = flights.start_or_join("refresh") else {
            panic!("first caller should lead");
        };

        let mut receivers = Vec::new();
        for _ in 0..5 {
            match flights.start_or_join("refresh") {
                Flight::Follower(rx) => receivers.push(rx),
                Flight::Leader(_) => panic!("only one leader per window"),
            }
        }

        assert_eq!(leader.drain(Ok(7)), 5);
        assert!(!flights.is_in_flight(&"refresh"));

        for rx in receivers {
            assert_eq!(rx.await.unwrap(), Ok(7));
        }
    }

    #[tokio::test]
    async fn test_drain_propagates_failure() {
        let flights: SingleFlight<&str, Result<(), String>> = SingleFlight::new();

        let Flight::Leader(leader) = flights.start_or_join("refresh") else {
            panic!("first caller should lead");
        };
        let Flight::Follower(rx) = flights.start_or_join("refresh") else {
            panic!("second caller should follow");
        };

        leader.drain(Err("refresh failed".to_string()));
        assert_eq!(rx.await.unwrap(), Err("refresh failed".to_string()));
    }

    #[tokio::test]
    async fn test_dropped_leader_releases_followers() {
        let flights: SingleFlight<&str, u32> = SingleFlight::new();

        let leader = flights.start_or_join("refresh");
        let Flight::Follower(rx) = flights.start_or_join("refresh") else {
            panic!("second caller should follow");
        };

        drop(leader);

        assert!(rx.await.is_err());
        assert!(!flights.is_in_flight(&"refresh"));
        assert!(matches!(flights.start_or_join("refresh"), Flight::Leader(_)));
    }

    #[tokio::test]
    async fn test_closed_followers_are_skipped() {
        let flights: SingleFlight<&str, u32> = SingleFlight::new();

        let Flight::Leader(leader) = flights.start_or_join("refresh") else {
            panic!("first caller should lead");
        };
        let Flight::Follower(gone) = flights.start_or_join("refresh") else {
            panic!("second caller should follow");
        };
        let Flight::Follower(kept) = flights.start_or_join("refresh") else {
            panic!("third caller should follow");
        };
        drop(gone);

        assert_eq!(leader.drain(1), 1);
        assert_eq!(kept.await.unwrap(), 1);
    }
}
