// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::editor::LineItemDraft;
use crate::model::{LineItem, Totals};
use crate::validation::parse_number;

pub const TAX_RATE: f64 = 0.16;

impl Totals {
    pub fn from_subtotal(subtotal: f64) -> Self {
        let tax = subtotal * TAX_RATE;
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

pub fn compute_totals<'a, I>(items: I) -> Totals
where
    I: IntoIterator<Item = &'a LineItem>,
{
    Totals::from_subtotal(items.into_iter().map(LineItem::total).sum())
}

/// Totals over rows still being typed. A row whose quantity or price does not
/// parse contributes zero; validation rejects it on submit.
pub fn compute_draft_totals(rows: &[LineItemDraft]) -> Totals {
    Totals::from_subtotal(rows.iter().map(draft_row_total).sum())
}

pub fn draft_row_total(row: &LineItemDraft) -> f64 {
    match (parse_number(&row.quantity), parse_number(&row.price)) {
        (Ok(quantity), Ok(price)) => quantity * price,
        _ => 0.0,
    }
}
