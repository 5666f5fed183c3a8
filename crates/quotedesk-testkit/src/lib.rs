// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use quotedesk_app::{
    Client, DEFAULT_NUMBER_PREFIX, FeedEvent, LineItem, Quote, QuoteFeed, QuoteFormInput,
    QuoteId, QuoteStatus, QuoteStore, Subscription, format_quote_number,
};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use time::macros::{date, datetime};
use time::{Date, Duration, OffsetDateTime};

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];

const COMPANY_ADJECTIVES: [&str; 12] = [
    "Premier",
    "Central",
    "Reliable",
    "Bright",
    "Quality",
    "Summit",
    "Eagle",
    "Heritage",
    "Greenleaf",
    "Northwind",
    "Hartley",
    "Apex",
];
const COMPANY_NOUNS: [&str; 8] = [
    "Logistics",
    "Foods",
    "Design",
    "Dental",
    "Builders",
    "Media",
    "Textiles",
    "Consulting",
];
const COMPANY_SUFFIXES: [&str; 5] = ["Co", "Group", "LLC", "Inc", "Partners"];

const EMAIL_DOMAINS: [&str; 4] = ["example.com", "example.org", "mail.test", "corp.test"];

const ITEM_DESCRIPTIONS: [&str; 16] = [
    "Website redesign",
    "Logo package",
    "Monthly hosting",
    "On-site installation",
    "Network cabling",
    "Printer toner",
    "Office chairs",
    "Standing desk",
    "Training session",
    "Support hours",
    "Security audit",
    "Data migration",
    "Annual license",
    "Shipping and handling",
    "Product photography",
    "Copywriting",
];

const FIXTURE_DATE: Date = date!(2026 - 02 - 19);
const FIXTURE_DATETIME: OffsetDateTime = datetime!(2026-02-19 12:34:56 UTC);

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of plausible quote content.
#[derive(Debug, Clone)]
pub struct QuoteFaker {
    rng: DeterministicRng,
}

impl QuoteFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn client(&mut self) -> Client {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let company = if self.rng.bool() {
            Some(format!(
                "{} {} {}",
                self.pick(&COMPANY_ADJECTIVES),
                self.pick(&COMPANY_NOUNS),
                self.pick(&COMPANY_SUFFIXES),
            ))
        } else {
            None
        };
        let email = if self.int_range(1, 10) <= 7 {
            Some(format!(
                "{}.{}@{}",
                first.to_lowercase(),
                last.to_lowercase(),
                self.pick(&EMAIL_DOMAINS)
            ))
        } else {
            None
        };

        Client {
            name: format!("{first} {last}"),
            company,
            email,
        }
    }

    pub fn line_item(&mut self) -> LineItem {
        let cents = self.int_range(500, 250_000);
        LineItem {
            description: self.pick(&ITEM_DESCRIPTIONS).to_owned(),
            quantity: self.int_range(1, 12) as f64,
            price: cents as f64 / 100.0,
        }
    }

    /// Valid input with one to four items, valid for one to six weeks after `today`.
    pub fn quote_input(&mut self, today: Date) -> QuoteFormInput {
        let count = self.int_range(1, 4) as usize;
        let items = (0..count).map(|_| self.line_item()).collect();
        let days = self.int_range(7, 45);
        QuoteFormInput {
            client: self.client(),
            items,
            valid_until: today.checked_add(Duration::days(days)).unwrap_or(today),
        }
    }

    pub fn status(&mut self) -> QuoteStatus {
        QuoteStatus::ALL[self.rng.int_n(QuoteStatus::ALL.len())]
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }
}

/// Creates `count` quotes in `store` and spreads them across the statuses.
pub fn seed_demo_quotes<S>(
    store: &S,
    faker: &mut QuoteFaker,
    today: Date,
    count: usize,
) -> Result<Vec<QuoteId>>
where
    S: QuoteStore + ?Sized,
{
    let mut ids = Vec::with_capacity(count);
    for index in 0..count {
        let input = faker.quote_input(today);
        let id = store
            .create_quote(&input)
            .with_context(|| format!("seed demo quote {}", index + 1))?;
        let status = faker.status();
        if status != QuoteStatus::Pending {
            store
                .update_status(id, status)
                .with_context(|| format!("set status of demo quote {id}"))?;
        }
        ids.push(id);
    }
    Ok(ids)
}

/// In-memory [`QuoteStore`] with a deterministic clock and switchable
/// failures, for exercising callers without SQLite.
#[derive(Debug)]
pub struct MemoryStore {
    quotes: RefCell<Vec<Quote>>,
    feed: QuoteFeed,
    next_id: Cell<i64>,
    next_sequence: Cell<i64>,
    clock: Cell<OffsetDateTime>,
    write_failure: RefCell<Option<String>>,
    read_failure: RefCell<Option<String>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            quotes: RefCell::new(Vec::new()),
            feed: QuoteFeed::new(),
            next_id: Cell::new(1),
            next_sequence: Cell::new(1),
            clock: Cell::new(FIXTURE_DATETIME),
            write_failure: RefCell::new(None),
            read_failure: RefCell::new(None),
        }
    }

    /// Every write fails with `message` until [`MemoryStore::restore_writes`].
    pub fn fail_writes(&self, message: &str) {
        *self.write_failure.borrow_mut() = Some(message.to_owned());
    }

    pub fn restore_writes(&self) {
        *self.write_failure.borrow_mut() = None;
    }

    /// Listing fails and subscribers receive [`FeedEvent::Failed`].
    pub fn fail_reads(&self, message: &str) {
        *self.read_failure.borrow_mut() = Some(message.to_owned());
        self.publish();
    }

    /// Clears a read failure and pushes a fresh snapshot.
    pub fn restore_reads(&self) {
        *self.read_failure.borrow_mut() = None;
        self.publish();
    }

    pub fn subscriber_count(&self) -> usize {
        self.feed.subscriber_count()
    }

    fn check_writable(&self) -> Result<()> {
        if let Some(message) = self.write_failure.borrow().as_ref() {
            bail!("{message}");
        }
        Ok(())
    }

    fn tick(&self) -> OffsetDateTime {
        let now = self.clock.get();
        self.clock.set(now + Duration::seconds(1));
        now
    }

    fn with_quote<F>(&self, id: QuoteId, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Quote),
    {
        self.check_writable()?;
        {
            let mut quotes = self.quotes.borrow_mut();
            let Some(quote) = quotes.iter_mut().find(|quote| quote.id == id) else {
                bail!("quote {id} not found -- it may have been deleted; refresh and retry");
            };
            apply(quote);
        }
        self.publish();
        Ok(())
    }

    fn current_event(&self) -> FeedEvent {
        match self.list_quotes() {
            Ok(quotes) => FeedEvent::Snapshot(quotes),
            Err(error) => FeedEvent::Failed(format!("{error:#}")),
        }
    }

    fn publish(&self) {
        self.feed.publish(self.current_event());
    }
}

impl QuoteStore for MemoryStore {
    fn create_quote(&self, input: &QuoteFormInput) -> Result<QuoteId> {
        self.check_writable()?;
        input.validate()?;

        let id = QuoteId::new(self.next_id.get());
        self.next_id.set(id.get() + 1);
        let sequence = self.next_sequence.get();
        self.next_sequence.set(sequence + 1);
        let now = self.tick();

        self.quotes.borrow_mut().push(Quote {
            id,
            number: format_quote_number(DEFAULT_NUMBER_PREFIX, sequence),
            client: input.client.clone(),
            items: input.items.clone(),
            valid_until: input.valid_until,
            totals: input.totals(),
            status: QuoteStatus::Pending,
            created_at: now,
            updated_at: now,
        });
        self.publish();
        Ok(id)
    }

    fn replace_quote(&self, id: QuoteId, input: &QuoteFormInput) -> Result<()> {
        input.validate()?;
        let now = self.tick();
        self.with_quote(id, |quote| {
            quote.client = input.client.clone();
            quote.items = input.items.clone();
            quote.valid_until = input.valid_until;
            quote.totals = input.totals();
            quote.updated_at = now;
        })
    }

    fn update_status(&self, id: QuoteId, status: QuoteStatus) -> Result<()> {
        let now = self.tick();
        self.with_quote(id, |quote| {
            quote.status = status;
            quote.updated_at = now;
        })
    }

    fn delete_quote(&self, id: QuoteId) -> Result<()> {
        self.check_writable()?;
        {
            let mut quotes = self.quotes.borrow_mut();
            let before = quotes.len();
            quotes.retain(|quote| quote.id != id);
            if quotes.len() == before {
                bail!("quote {id} not found -- it may already be deleted");
            }
        }
        self.publish();
        Ok(())
    }

    fn list_quotes(&self) -> Result<Vec<Quote>> {
        if let Some(message) = self.read_failure.borrow().as_ref() {
            bail!("{message}");
        }
        let mut quotes = self.quotes.borrow().clone();
        quotes.sort_by(|left, right| {
            right
                .created_at
                .cmp(&left.created_at)
                .then(right.id.cmp(&left.id))
        });
        Ok(quotes)
    }

    fn subscribe(&self) -> Subscription {
        self.feed.subscribe_with(self.current_event())
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("quotedesk.db");
    Ok((dir, db_path))
}

/// Stable "today" for tests that derive dates.
pub fn fixture_date() -> Date {
    FIXTURE_DATE
}

pub fn fixture_datetime() -> &'static str {
    "2026-02-19T12:34:56Z"
}

/// Valid single-item input for `name`.
pub fn simple_input(name: &str, description: &str, quantity: f64, price: f64) -> QuoteFormInput {
    QuoteFormInput {
        client: Client {
            name: name.to_owned(),
            company: None,
            email: None,
        },
        items: vec![LineItem {
            description: description.to_owned(),
            quantity,
            price,
        }],
        valid_until: FIXTURE_DATE + Duration::days(30),
    }
}
