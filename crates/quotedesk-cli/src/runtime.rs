// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use quotedesk_app::{FeedEvent, QuoteFormInput, QuoteId, QuoteStatus, Subscription};
use quotedesk_db::Store;
use time::{Date, OffsetDateTime};

pub struct DbRuntime<'a> {
    store: &'a Store,
    feed: Subscription,
    validity_days: i64,
    clock: fn() -> Date,
}

fn utc_today() -> Date {
    OffsetDateTime::now_utc().date()
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store, validity_days: i64) -> Self {
        Self::with_clock(store, validity_days, utc_today)
    }

    /// `clock` supplies the date new quotes start their validity window from.
    pub fn with_clock(store: &'a Store, validity_days: i64, clock: fn() -> Date) -> Self {
        Self {
            store,
            feed: store.subscribe(),
            validity_days,
            clock,
        }
    }
}

impl quotedesk_tui::AppRuntime for DbRuntime<'_> {
    fn poll_feed(&mut self) -> Vec<FeedEvent> {
        self.feed.drain()
    }

    fn create_quote(&mut self, input: &QuoteFormInput) -> Result<QuoteId> {
        let id = self.store.create_quote(input)?;
        tracing::info!(quote_id = %id, client = %input.client.name, "quote created");
        Ok(id)
    }

    fn replace_quote(&mut self, id: QuoteId, input: &QuoteFormInput) -> Result<()> {
        self.store.replace_quote(id, input)?;
        tracing::info!(quote_id = %id, items = input.items.len(), "quote replaced");
        Ok(())
    }

    fn update_status(&mut self, id: QuoteId, status: QuoteStatus) -> Result<()> {
        self.store.update_status(id, status)?;
        tracing::info!(quote_id = %id, status = status.as_str(), "quote status changed");
        Ok(())
    }

    fn delete_quote(&mut self, id: QuoteId) -> Result<()> {
        self.store.delete_quote(id)?;
        tracing::info!(quote_id = %id, "quote deleted");
        Ok(())
    }

    fn today(&self) -> Date {
        (self.clock)()
    }

    fn validity_days(&self) -> i64 {
        self.validity_days
    }

    fn close_feed(&mut self) {
        self.feed.close();
    }
}
