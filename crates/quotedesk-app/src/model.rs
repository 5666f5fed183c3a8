// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum QuoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl QuoteStatus {
    /// Every status, in cycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub const fn advance(self) -> Self {
        match self {
            Self::Pending => Self::Approved,
            Self::Approved => Self::Rejected,
            Self::Rejected => Self::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    InvalidState(String),
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidState(raw) => write!(
                f,
                "invalid quote status {raw:?}; expected one of pending, approved, rejected"
            ),
        }
    }
}

impl std::error::Error for StatusError {}

/// Advances a status read from storage or user input. Unknown values are
/// rejected rather than restarting the cycle.
pub fn advance_status(raw: &str) -> Result<QuoteStatus, StatusError> {
    QuoteStatus::parse(raw)
        .map(QuoteStatus::advance)
        .ok_or_else(|| StatusError::InvalidState(raw.to_owned()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(QuoteStatus),
}

impl StatusFilter {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            other => QuoteStatus::parse(other).map(Self::Only),
        }
    }

    pub fn matches(self, status: QuoteStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    /// all -> pending -> approved -> rejected -> all
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Only(QuoteStatus::Pending),
            Self::Only(QuoteStatus::Rejected) => Self::All,
            Self::Only(status) => Self::Only(status.advance()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Client {
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub price: f64,
}

impl LineItem {
    pub fn total(&self) -> f64 {
        self.quantity * self.price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub number: String,
    pub client: Client,
    pub items: Vec<LineItem>,
    pub valid_until: Date,
    pub totals: Totals,
    pub status: QuoteStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
