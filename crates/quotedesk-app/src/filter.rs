// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::QuoteId;
use crate::model::{Quote, StatusFilter};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuoteQuery {
    pub search: String,
    pub status: StatusFilter,
}

impl QuoteQuery {
    pub fn new(search: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.search.is_empty() && self.status == StatusFilter::All
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        matches_search(quote, &self.search) && self.status.matches(quote.status)
    }
}

/// Case-insensitive substring match on client name, company, or number.
/// The term is used as typed; only an empty term matches everything.
pub fn matches_search(quote: &Quote, term: &str) -> bool {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
    contains(&quote.client.name)
        || quote.client.company.as_deref().is_some_and(contains)
        || (!quote.number.is_empty() && contains(&quote.number))
}

/// Quotes passing `query`, in input order.
pub fn filter_quotes<'a>(quotes: &'a [Quote], query: &QuoteQuery) -> Vec<&'a Quote> {
    quotes.iter().filter(|quote| query.matches(quote)).collect()
}

/// Last full quote set delivered by the store feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuoteCache {
    quotes: Vec<Quote>,
    loaded: bool,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes;
        self.loaded = true;
    }

    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Whether any snapshot has arrived yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: QuoteId) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.id == id)
    }

    pub fn visible(&self, query: &QuoteQuery) -> Vec<&Quote> {
        filter_quotes(&self.quotes, query)
    }
}
