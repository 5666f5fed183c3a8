// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::model::Quote;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Full, ordered replacement of the quote set.
    Snapshot(Vec<Quote>),
    Failed(String),
}

/// Publishing side of the push subscription. Each publish fans out to every
/// live subscriber; disconnected ones are dropped on the way.
#[derive(Debug, Default)]
pub struct QuoteFeed {
    subscribers: RefCell<Vec<Sender<FeedEvent>>>,
}

impl QuoteFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.borrow_mut().push(tx);
        Subscription { rx: Some(rx) }
    }

    /// Subscribes and queues `initial` for the new subscriber only.
    pub fn subscribe_with(&self, initial: FeedEvent) -> Subscription {
        let (tx, rx) = mpsc::channel();
        let alive = tx.send(initial).is_ok();
        if alive {
            self.subscribers.borrow_mut().push(tx);
        }
        Subscription { rx: Some(rx) }
    }

    pub fn publish(&self, event: FeedEvent) -> usize {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

/// Receiving side of the feed. Dropping it or calling [`Subscription::close`]
/// tears the subscription down.
#[derive(Debug)]
pub struct Subscription {
    rx: Option<Receiver<FeedEvent>>,
}

impl Subscription {
    /// Pending events in delivery order, without blocking.
    pub fn drain(&mut self) -> Vec<FeedEvent> {
        let Some(rx) = &self.rx else {
            return Vec::new();
        };

        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.rx = None;
                    break;
                }
            }
        }
        events
    }

    /// Only the newest pending event; earlier snapshots are superseded anyway.
    pub fn latest(&mut self) -> Option<FeedEvent> {
        self.drain().pop()
    }

    pub fn is_open(&self) -> bool {
        self.rx.is_some()
    }

    pub fn close(&mut self) {
        self.rx = None;
    }
}
