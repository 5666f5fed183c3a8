// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use time::{Date, Duration};

use crate::editor::{LineField, QuoteEditor};
use crate::model::{Client, LineItem, Quote, Totals};
use crate::totals::compute_totals;
use crate::validation::{format_date, parse_date, parse_price, parse_quantity};

const SECONDS_PER_DAY: i64 = 86_400;

/// Validated quote content, ready to be written to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteFormInput {
    pub client: Client,
    pub items: Vec<LineItem>,
    pub valid_until: Date,
}

impl QuoteFormInput {
    pub fn validate(&self) -> Result<()> {
        if self.client.name.trim().is_empty() {
            bail!("client name is required -- enter a name and retry");
        }
        if self.items.is_empty() {
            bail!("a quote needs at least one line item -- add a row and retry");
        }
        for (index, item) in self.items.iter().enumerate() {
            let line = index + 1;
            if item.description.trim().is_empty() {
                bail!("line {line} description is required -- describe the item and retry");
            }
            if !item.quantity.is_finite() || item.quantity <= 0.0 {
                bail!("line {line} quantity must be positive");
            }
            if !item.price.is_finite() || item.price < 0.0 {
                bail!("line {line} price cannot be negative");
            }
        }
        Ok(())
    }

    pub fn totals(&self) -> Totals {
        compute_totals(&self.items)
    }
}

/// Editor-side state of a quote: raw client fields plus line-item rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDraft {
    pub client_name: String,
    pub client_company: String,
    pub client_email: String,
    pub valid_until: String,
    pub editor: QuoteEditor,
}

impl QuoteDraft {
    /// A window that overflows the calendar falls back to `today`.
    pub fn blank(today: Date, validity_days: i64) -> Self {
        let valid_until = validity_days
            .checked_mul(SECONDS_PER_DAY)
            .map(Duration::seconds)
            .and_then(|window| today.checked_add(window))
            .unwrap_or(today);
        Self {
            client_name: String::new(),
            client_company: String::new(),
            client_email: String::new(),
            valid_until: format_date(valid_until),
            editor: QuoteEditor::new(),
        }
    }

    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            client_name: quote.client.name.clone(),
            client_company: quote.client.company.clone().unwrap_or_default(),
            client_email: quote.client.email.clone().unwrap_or_default(),
            valid_until: format_date(quote.valid_until),
            editor: QuoteEditor::from_items(&quote.items),
        }
    }

    pub fn to_form_input(&self) -> Result<QuoteFormInput> {
        let valid_until = parse_date(&self.valid_until).map_err(|error| {
            anyhow!("valid-until {error} -- use {}", crate::validation::DATE_LAYOUT)
        })?;

        let mut items = Vec::with_capacity(self.editor.len());
        for (index, row) in self.editor.rows().iter().enumerate() {
            let line = index + 1;
            let quantity = parse_quantity(row.field(LineField::Quantity))
                .map_err(|error| anyhow!("line {line} quantity: {error}"))?;
            let price = parse_price(row.field(LineField::Price))
                .map_err(|error| anyhow!("line {line} price: {error}"))?;
            items.push(LineItem {
                description: row.description.trim().to_owned(),
                quantity,
                price,
            });
        }

        let input = QuoteFormInput {
            client: Client {
                name: self.client_name.trim().to_owned(),
                company: non_empty(&self.client_company),
                email: non_empty(&self.client_email),
            },
            items,
            valid_until,
        };
        input.validate()?;
        Ok(input)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{QuoteDraft, QuoteFormInput};
    use crate::editor::LineField;
    use crate::model::{Client, LineItem};
    use time::{Date, Month};

    fn today() -> Date {
        Date::from_calendar_date(2026, Month::March, 1).expect("valid date")
    }

    fn filled_draft() -> QuoteDraft {
        let mut draft = QuoteDraft::blank(today(), 30);
        draft.client_name = " Acme ".to_owned();
        draft.client_company = "  ".to_owned();
        draft.client_email = "ops@acme.test".to_owned();
        draft
            .editor
            .update_row(0, LineField::Description, "Site survey")
            .expect("row 0 exists");
        draft
            .editor
            .update_row(0, LineField::Price, "120")
            .expect("row 0 exists");
        draft
    }

    #[test]
    fn blank_draft_defaults_validity_window() {
        let draft = QuoteDraft::blank(today(), 30);
        assert_eq!(draft.valid_until, "2026-03-31");
        assert_eq!(draft.editor.len(), 1);
    }

    #[test]
    fn blank_draft_survives_oversized_validity_window() {
        let draft = QuoteDraft::blank(today(), 200_000_000_000_000);
        assert_eq!(draft.valid_until, "2026-03-01");

        let draft = QuoteDraft::blank(today(), i64::MAX);
        assert_eq!(draft.valid_until, "2026-03-01");
    }

    #[test]
    fn draft_converts_to_trimmed_form_input() {
        let input = filled_draft().to_form_input().expect("valid draft");
        assert_eq!(input.client.name, "Acme");
        assert_eq!(input.client.company, None);
        assert_eq!(input.client.email.as_deref(), Some("ops@acme.test"));
        assert_eq!(input.items.len(), 1);
        assert_eq!(input.items[0].quantity, 1.0);
        assert_eq!(input.totals().subtotal, 120.0);
    }

    #[test]
    fn draft_rejects_missing_client_name() {
        let mut draft = filled_draft();
        draft.client_name = String::new();
        let error = draft.to_form_input().expect_err("empty name should fail");
        assert!(error.to_string().contains("client name is required"));
    }

    #[test]
    fn draft_rejects_malformed_price_instead_of_zeroing() {
        let mut draft = filled_draft();
        draft
            .editor
            .update_row(0, LineField::Price, "12o")
            .expect("row 0 exists");
        let error = draft.to_form_input().expect_err("bad price should fail");
        assert_eq!(error.to_string(), "line 1 price: invalid number");
    }

    #[test]
    fn draft_rejects_zero_quantity_and_bad_date() {
        let mut draft = filled_draft();
        draft
            .editor
            .update_row(0, LineField::Quantity, "0")
            .expect("row 0 exists");
        assert!(draft.to_form_input().is_err());

        let mut draft = filled_draft();
        draft.valid_until = "next week".to_owned();
        let error = draft.to_form_input().expect_err("bad date should fail");
        assert!(error.to_string().contains("YYYY-MM-DD"));
    }

    #[test]
    fn draft_rejects_blank_description() {
        let mut draft = filled_draft();
        draft.editor.add_row("", "1", "5");
        let error = draft.to_form_input().expect_err("blank description should fail");
        assert!(error.to_string().contains("line 2 description is required"));
    }

    #[test]
    fn form_validation_rejects_empty_items() {
        let input = QuoteFormInput {
            client: Client {
                name: "Acme".to_owned(),
                company: None,
                email: None,
            },
            items: Vec::new(),
            valid_until: today(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn form_validation_rejects_negative_price() {
        let input = QuoteFormInput {
            client: Client {
                name: "Acme".to_owned(),
                company: None,
                email: None,
            },
            items: vec![LineItem {
                description: "Refund".to_owned(),
                quantity: 1.0,
                price: -5.0,
            }],
            valid_until: today(),
        };
        assert!(input.validate().is_err());
    }
}
