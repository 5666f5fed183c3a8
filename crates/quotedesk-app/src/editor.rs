// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{LineItem, Totals};
use crate::totals::compute_draft_totals;

pub const DEFAULT_QUANTITY: &str = "1";
pub const DEFAULT_PRICE: &str = "0";

/// One line-item row as typed, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemDraft {
    pub description: String,
    pub quantity: String,
    pub price: String,
}

impl LineItemDraft {
    pub fn blank() -> Self {
        Self {
            description: String::new(),
            quantity: DEFAULT_QUANTITY.to_owned(),
            price: DEFAULT_PRICE.to_owned(),
        }
    }

    pub fn field(&self, field: LineField) -> &str {
        match field {
            LineField::Description => &self.description,
            LineField::Quantity => &self.quantity,
            LineField::Price => &self.price,
        }
    }

    fn field_mut(&mut self, field: LineField) -> &mut String {
        match field {
            LineField::Description => &mut self.description,
            LineField::Quantity => &mut self.quantity,
            LineField::Price => &mut self.price,
        }
    }
}

impl From<&LineItem> for LineItemDraft {
    fn from(item: &LineItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: item.quantity.to_string(),
            price: item.price.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Description,
    Quantity,
    Price,
}

impl LineField {
    pub const ALL: [Self; 3] = [Self::Description, Self::Quantity, Self::Price];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Quantity => "qty",
            Self::Price => "price",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    LastRow,
    RowOutOfRange { index: usize, len: usize },
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LastRow => f.write_str("a quote needs at least one line item"),
            Self::RowOutOfRange { index, len } => {
                write!(f, "line item {} does not exist ({len} rows)", index + 1)
            }
        }
    }
}

impl std::error::Error for EditError {}

/// Line items of the quote being edited. Never empty; every mutation returns
/// the recomputed totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteEditor {
    rows: Vec<LineItemDraft>,
}

impl Default for QuoteEditor {
    fn default() -> Self {
        Self {
            rows: vec![LineItemDraft::blank()],
        }
    }
}

impl QuoteEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: &[LineItem]) -> Self {
        if items.is_empty() {
            return Self::default();
        }
        Self {
            rows: items.iter().map(LineItemDraft::from).collect(),
        }
    }

    pub fn rows(&self) -> &[LineItemDraft] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn totals(&self) -> Totals {
        compute_draft_totals(&self.rows)
    }

    pub fn add_row(&mut self, description: &str, quantity: &str, price: &str) -> Totals {
        self.rows.push(LineItemDraft {
            description: description.to_owned(),
            quantity: quantity.to_owned(),
            price: price.to_owned(),
        });
        self.totals()
    }

    pub fn add_blank_row(&mut self) -> Totals {
        self.add_row("", DEFAULT_QUANTITY, DEFAULT_PRICE)
    }

    pub fn remove_row(&mut self, index: usize) -> Result<Totals, EditError> {
        self.check_index(index)?;
        if self.rows.len() == 1 {
            return Err(EditError::LastRow);
        }
        self.rows.remove(index);
        Ok(self.totals())
    }

    pub fn update_row(
        &mut self,
        index: usize,
        field: LineField,
        value: &str,
    ) -> Result<Totals, EditError> {
        self.check_index(index)?;
        let target = self.rows[index].field_mut(field);
        target.clear();
        target.push_str(value);
        Ok(self.totals())
    }

    fn check_index(&self, index: usize) -> Result<(), EditError> {
        if index >= self.rows.len() {
            return Err(EditError::RowOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }
}
