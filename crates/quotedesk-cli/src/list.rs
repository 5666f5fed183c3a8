// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use quotedesk_app::{Quote, QuoteQuery, filter_quotes, format_date, format_money};
use std::fmt::Write;

/// Plain-text quote table for `--list`.
pub fn render_quote_list(quotes: &[Quote], query: &QuoteQuery) -> String {
    let visible = filter_quotes(quotes, query);
    let mut output = String::new();

    if quotes.is_empty() {
        output.push_str("no quotes yet\n");
        return output;
    }
    if visible.is_empty() {
        let _ = writeln!(
            output,
            "no matches for search {:?} with status {}",
            query.search,
            query.status.as_str()
        );
        let _ = writeln!(output, "0 of {} quotes", quotes.len());
        return output;
    }

    let _ = writeln!(
        output,
        "{:<12} {:<24} {:<9} {:>14} {:<10}",
        "NUMBER", "CLIENT", "STATUS", "TOTAL", "VALID"
    );
    for quote in &visible {
        let _ = writeln!(
            output,
            "{:<12} {:<24} {:<9} {:>14} {:<10}",
            quote.number,
            client_label(quote),
            quote.status.as_str(),
            format_money(quote.totals.total),
            format_date(quote.valid_until)
        );
    }
    let _ = writeln!(output, "{} of {} quotes", visible.len(), quotes.len());
    output
}

fn client_label(quote: &Quote) -> String {
    let label = match quote.client.company.as_deref() {
        Some(company) if !company.trim().is_empty() => {
            format!("{} ({company})", quote.client.name)
        }
        _ => quote.client.name.clone(),
    };
    truncate(&label, 24)
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_owned();
    }
    let mut shortened: String = value.chars().take(width.saturating_sub(1)).collect();
    shortened.push('~');
    shortened
}
