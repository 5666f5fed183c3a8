// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::feed::Subscription;
use crate::forms::QuoteFormInput;
use crate::ids::QuoteId;
use crate::model::{Quote, QuoteStatus};

/// Document store holding quotes. Implementations assign ids, numbers and
/// creation timestamps, persist totals derived from the items, and push a full
/// snapshot to subscribers after every successful write.
pub trait QuoteStore {
    fn create_quote(&self, input: &QuoteFormInput) -> Result<QuoteId>;
    /// Full replace; number, status and creation time are kept.
    fn replace_quote(&self, id: QuoteId, input: &QuoteFormInput) -> Result<()>;
    fn update_status(&self, id: QuoteId, status: QuoteStatus) -> Result<()>;
    fn delete_quote(&self, id: QuoteId) -> Result<()>;
    /// Newest first.
    fn list_quotes(&self) -> Result<Vec<Quote>>;
    /// The current set is delivered immediately, then again after each write.
    fn subscribe(&self) -> Subscription;
}
