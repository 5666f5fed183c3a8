// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use quotedesk_app::{
    AppCommand, AppMode, AppState, EditError, FeedEvent, LineField, Quote, QuoteCache, QuoteDraft,
    QuoteFormInput, QuoteId, QuoteStatus, TAX_RATE, draft_row_total, format_date, format_money,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::Date;

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const EMPTY_FIELD: &str = "-";

/// Everything the UI needs from the outside world: the store's push feed,
/// the four writes, and the clock used to prefill new quotes.
pub trait AppRuntime {
    /// Feed events received since the last call, oldest first.
    fn poll_feed(&mut self) -> Vec<FeedEvent>;
    fn create_quote(&mut self, input: &QuoteFormInput) -> Result<QuoteId>;
    fn replace_quote(&mut self, id: QuoteId, input: &QuoteFormInput) -> Result<()>;
    fn update_status(&mut self, id: QuoteId, status: QuoteStatus) -> Result<()>;
    fn delete_quote(&mut self, id: QuoteId) -> Result<()>;
    fn today(&self) -> Date;
    fn validity_days(&self) -> i64;
    fn close_feed(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    ClientName,
    Company,
    Email,
    ValidUntil,
}

impl HeaderField {
    const ALL: [Self; 4] = [Self::ClientName, Self::Company, Self::Email, Self::ValidUntil];

    const fn label(self) -> &'static str {
        match self {
            Self::ClientName => "client",
            Self::Company => "company",
            Self::Email => "email",
            Self::ValidUntil => "valid until",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditorFocus {
    Header(HeaderField),
    Item { row: usize, field: LineField },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct EditorUiState {
    /// `None` while composing a new quote.
    target: Option<QuoteId>,
    number: Option<String>,
    draft: QuoteDraft,
    focus: EditorFocus,
    error: Option<String>,
}

impl EditorUiState {
    fn new_quote(today: Date, validity_days: i64) -> Self {
        Self {
            target: None,
            number: None,
            draft: QuoteDraft::blank(today, validity_days),
            focus: EditorFocus::Header(HeaderField::ClientName),
            error: None,
        }
    }

    fn for_quote(quote: &Quote) -> Self {
        Self {
            target: Some(quote.id),
            number: Some(quote.number.clone()),
            draft: QuoteDraft::from_quote(quote),
            focus: EditorFocus::Header(HeaderField::ClientName),
            error: None,
        }
    }

    fn focus_order(&self) -> Vec<EditorFocus> {
        let mut order = HeaderField::ALL
            .iter()
            .copied()
            .map(EditorFocus::Header)
            .collect::<Vec<_>>();
        for row in 0..self.draft.editor.len() {
            for field in LineField::ALL {
                order.push(EditorFocus::Item { row, field });
            }
        }
        order
    }

    fn move_focus(&mut self, delta: isize) {
        let order = self.focus_order();
        let len = order.len() as isize;
        let current = order
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.focus = order[next];
    }

    fn header_value(&self, field: HeaderField) -> &str {
        match field {
            HeaderField::ClientName => &self.draft.client_name,
            HeaderField::Company => &self.draft.client_company,
            HeaderField::Email => &self.draft.client_email,
            HeaderField::ValidUntil => &self.draft.valid_until,
        }
    }

    fn header_value_mut(&mut self, field: HeaderField) -> &mut String {
        match field {
            HeaderField::ClientName => &mut self.draft.client_name,
            HeaderField::Company => &mut self.draft.client_company,
            HeaderField::Email => &mut self.draft.client_email,
            HeaderField::ValidUntil => &mut self.draft.valid_until,
        }
    }

    fn edit_focused<F>(&mut self, edit: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut String),
    {
        self.error = None;
        match self.focus {
            EditorFocus::Header(field) => {
                edit(self.header_value_mut(field));
                Ok(())
            }
            EditorFocus::Item { row, field } => {
                let mut value = self
                    .draft
                    .editor
                    .rows()
                    .get(row)
                    .map(|item| item.field(field).to_owned())
                    .unwrap_or_default();
                edit(&mut value);
                self.draft.editor.update_row(row, field, &value).map(|_| ())
            }
        }
    }

    fn add_row(&mut self) {
        self.draft.editor.add_blank_row();
        self.focus = EditorFocus::Item {
            row: self.draft.editor.len() - 1,
            field: LineField::Description,
        };
    }

    fn remove_row(&mut self, row: usize) -> Result<(), EditError> {
        self.draft.editor.remove_row(row)?;
        let last = self.draft.editor.len() - 1;
        self.focus = EditorFocus::Item {
            row: row.min(last),
            field: LineField::Description,
        };
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    cache: QuoteCache,
    /// Index into the visible (filtered) list.
    selected: usize,
    detail: Option<QuoteId>,
    editor: Option<EditorUiState>,
    pending_delete: Option<QuoteId>,
    status_token: u64,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        sync_feed(state, runtime, &mut view_data);
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    runtime.close_feed();
    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn sync_feed<R: AppRuntime>(state: &mut AppState, runtime: &mut R, view_data: &mut ViewData) {
    for event in runtime.poll_feed() {
        match event {
            FeedEvent::Snapshot(quotes) => {
                tracing::trace!(count = quotes.len(), "received quote snapshot");
                view_data.cache.replace(quotes);
                state.dispatch(AppCommand::FeedRecovered);
            }
            FeedEvent::Failed(error) => {
                tracing::warn!(%error, "quote feed failed");
                state.dispatch(AppCommand::FeedFailed(error));
            }
        }
    }
    reconcile_view(state, view_data);
}

fn reconcile_view(state: &mut AppState, view_data: &mut ViewData) {
    clamp_selection(state, view_data);

    if let Some(id) = view_data.detail
        && view_data.cache.get(id).is_none()
    {
        view_data.detail = None;
        if state.mode == AppMode::Detail {
            state.dispatch(AppCommand::ExitToNav);
        }
    }

    if let Some(id) = view_data.pending_delete
        && view_data.cache.get(id).is_none()
    {
        view_data.pending_delete = None;
        if state.mode == AppMode::ConfirmDelete {
            state.dispatch(AppCommand::ExitToNav);
        }
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn bump_status_token(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    bump_status_token(view_data, internal_tx);
}

fn emit_failure(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: String,
) {
    tracing::warn!(%message, "write failed");
    state.dispatch(AppCommand::WriteFailed(message));
    bump_status_token(view_data, internal_tx);
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match state.mode {
        AppMode::Nav => return handle_nav_key(state, runtime, view_data, internal_tx, key),
        AppMode::Search => handle_search_key(state, view_data, key),
        AppMode::Detail => handle_detail_key(state, runtime, view_data, internal_tx, key),
        AppMode::Editor => handle_editor_key(state, runtime, view_data, internal_tx, key),
        AppMode::ConfirmDelete => {
            handle_confirm_delete_key(state, runtime, view_data, internal_tx, key);
        }
    }
    false
}

fn handle_nav_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
            move_selection(state, view_data, 1);
        }
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
            move_selection(state, view_data, -1);
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
            view_data.selected = 0;
        }
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
            view_data.selected = visible_count(state, view_data).saturating_sub(1);
        }
        (KeyCode::Char('/'), _) => {
            state.dispatch(AppCommand::SetMode(AppMode::Search));
        }
        (KeyCode::Char('f'), KeyModifiers::NONE) => {
            state.dispatch(AppCommand::CycleStatusFilter);
            bump_status_token(view_data, internal_tx);
            view_data.selected = 0;
        }
        (KeyCode::Char('c'), KeyModifiers::NONE) => {
            state.dispatch(AppCommand::ClearFilters);
            bump_status_token(view_data, internal_tx);
            view_data.selected = 0;
        }
        (KeyCode::Char('n'), KeyModifiers::NONE) => {
            view_data.editor = Some(EditorUiState::new_quote(
                runtime.today(),
                runtime.validity_days(),
            ));
            state.dispatch(AppCommand::SetMode(AppMode::Editor));
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => match selected_quote_id(state, view_data) {
            Some(id) => open_editor_for(state, view_data, internal_tx, id),
            None => emit_status(state, view_data, internal_tx, "no quote selected"),
        },
        (KeyCode::Char('s'), KeyModifiers::NONE) => match selected_quote_id(state, view_data) {
            Some(id) => advance_quote_status(state, runtime, view_data, internal_tx, id),
            None => emit_status(state, view_data, internal_tx, "no quote selected"),
        },
        (KeyCode::Char('d'), KeyModifiers::NONE) => match selected_quote_id(state, view_data) {
            Some(id) => request_delete(state, view_data, id),
            None => emit_status(state, view_data, internal_tx, "no quote selected"),
        },
        (KeyCode::Enter, _) => {
            if let Some(id) = selected_quote_id(state, view_data) {
                view_data.detail = Some(id);
                state.dispatch(AppCommand::SetMode(AppMode::Detail));
            }
        }
        _ => {}
    }
    false
}

fn handle_search_key(state: &mut AppState, view_data: &mut ViewData, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Enter, _) => {
            state.dispatch(AppCommand::ExitToNav);
        }
        (KeyCode::Backspace, _) => {
            state.dispatch(AppCommand::PopSearchChar);
            view_data.selected = 0;
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
            state.dispatch(AppCommand::SetSearch(String::new()));
            view_data.selected = 0;
        }
        (KeyCode::Char(ch), modifiers) if is_text_input(modifiers) => {
            state.dispatch(AppCommand::PushSearchChar(ch));
            view_data.selected = 0;
        }
        _ => {}
    }
}

fn handle_detail_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(id) = view_data.detail else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Enter, _) | (KeyCode::Char('q'), KeyModifiers::NONE) => {
            view_data.detail = None;
            state.dispatch(AppCommand::ExitToNav);
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            view_data.detail = None;
            open_editor_for(state, view_data, internal_tx, id);
        }
        (KeyCode::Char('s'), KeyModifiers::NONE) => {
            advance_quote_status(state, runtime, view_data, internal_tx, id);
        }
        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            view_data.detail = None;
            request_delete(state, view_data, id);
        }
        _ => {}
    }
}

fn handle_editor_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(editor) = view_data.editor.as_mut() else {
        state.dispatch(AppCommand::ExitToNav);
        return;
    };

    let outcome = match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            view_data.editor = None;
            state.dispatch(AppCommand::ExitToNav);
            emit_status(state, view_data, internal_tx, "edit canceled");
            return;
        }
        (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
            submit_editor(state, runtime, view_data, internal_tx);
            return;
        }
        (KeyCode::Tab, _) | (KeyCode::Enter, _) => {
            editor.move_focus(1);
            Ok(())
        }
        (KeyCode::BackTab, _) => {
            editor.move_focus(-1);
            Ok(())
        }
        (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
            editor.add_row();
            Ok(())
        }
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => match editor.focus {
            EditorFocus::Item { row, .. } => editor.remove_row(row),
            EditorFocus::Header(_) => {
                emit_status(
                    state,
                    view_data,
                    internal_tx,
                    "move to a line item to remove it",
                );
                return;
            }
        },
        (KeyCode::Backspace, _) => editor.edit_focused(|value| {
            value.pop();
        }),
        (KeyCode::Char(ch), modifiers) if is_text_input(modifiers) => {
            editor.edit_focused(|value| value.push(ch))
        }
        _ => Ok(()),
    };

    if let Err(error) = outcome {
        let message = match error {
            EditError::LastRow => "a quote needs at least one line item".to_owned(),
            other => other.to_string(),
        };
        emit_status(state, view_data, internal_tx, message);
    }
}

fn submit_editor<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let Some(editor) = view_data.editor.as_mut() else {
        return;
    };
    let target = editor.target;
    let input = match editor.draft.to_form_input() {
        Ok(input) => input,
        Err(error) => {
            let message = format!("{error:#}");
            editor.error = Some(message.clone());
            emit_status(state, view_data, internal_tx, message);
            return;
        }
    };

    let saved = match target {
        Some(id) => runtime.replace_quote(id, &input).map(|()| id),
        None => runtime.create_quote(&input),
    };
    match saved {
        Ok(id) => {
            view_data.editor = None;
            state.dispatch(AppCommand::ExitToNav);
            sync_feed(state, runtime, view_data);
            select_quote(state, view_data, id);
            emit_status(state, view_data, internal_tx, "quote saved");
        }
        Err(error) => {
            emit_failure(
                state,
                view_data,
                internal_tx,
                format!("save failed: {error:#}"),
            );
        }
    }
}

fn handle_confirm_delete_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let pending = view_data.pending_delete.take();
    state.dispatch(AppCommand::ExitToNav);

    let Some(id) = pending else {
        return;
    };
    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        emit_status(state, view_data, internal_tx, "delete canceled");
        return;
    }

    match runtime.delete_quote(id) {
        Ok(()) => {
            sync_feed(state, runtime, view_data);
            emit_status(state, view_data, internal_tx, "quote deleted");
        }
        Err(error) => emit_failure(
            state,
            view_data,
            internal_tx,
            format!("delete failed: {error:#}"),
        ),
    }
}

fn open_editor_for(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    id: QuoteId,
) {
    let Some(quote) = view_data.cache.get(id) else {
        state.dispatch(AppCommand::ExitToNav);
        emit_status(state, view_data, internal_tx, "quote no longer exists");
        return;
    };
    view_data.editor = Some(EditorUiState::for_quote(quote));
    state.dispatch(AppCommand::SetMode(AppMode::Editor));
}

fn advance_quote_status<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    id: QuoteId,
) {
    let Some((number, current)) = view_data
        .cache
        .get(id)
        .map(|quote| (quote.number.clone(), quote.status))
    else {
        emit_status(state, view_data, internal_tx, "quote no longer exists");
        return;
    };

    let next = current.advance();
    match runtime.update_status(id, next) {
        Ok(()) => {
            sync_feed(state, runtime, view_data);
            emit_status(
                state,
                view_data,
                internal_tx,
                format!("{number} is now {}", next.as_str()),
            );
        }
        Err(error) => emit_failure(
            state,
            view_data,
            internal_tx,
            format!("status update failed: {error:#}"),
        ),
    }
}

fn request_delete(state: &mut AppState, view_data: &mut ViewData, id: QuoteId) {
    view_data.pending_delete = Some(id);
    state.dispatch(AppCommand::SetMode(AppMode::ConfirmDelete));
}

fn is_text_input(modifiers: KeyModifiers) -> bool {
    modifiers == KeyModifiers::NONE || modifiers == KeyModifiers::SHIFT
}

fn visible_quotes<'a>(state: &AppState, view_data: &'a ViewData) -> Vec<&'a Quote> {
    view_data.cache.visible(&state.query)
}

fn visible_count(state: &AppState, view_data: &ViewData) -> usize {
    visible_quotes(state, view_data).len()
}

fn selected_quote_id(state: &AppState, view_data: &ViewData) -> Option<QuoteId> {
    visible_quotes(state, view_data)
        .get(view_data.selected)
        .map(|quote| quote.id)
}

fn select_quote(state: &AppState, view_data: &mut ViewData, id: QuoteId) {
    if let Some(index) = visible_quotes(state, view_data)
        .iter()
        .position(|quote| quote.id == id)
    {
        view_data.selected = index;
    }
}

fn move_selection(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let count = visible_count(state, view_data);
    if count == 0 {
        view_data.selected = 0;
        return;
    }
    let next = view_data.selected as isize + delta;
    view_data.selected = next.clamp(0, count as isize - 1) as usize;
}

fn clamp_selection(state: &AppState, view_data: &mut ViewData) {
    let count = visible_count(state, view_data);
    view_data.selected = view_data.selected.min(count.saturating_sub(1));
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let header = Paragraph::new(filter_summary_text(state))
        .block(Block::default().title("quotedesk").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    render_quote_table(frame, layout[1], state, view_data);

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[2]);

    match state.mode {
        AppMode::Detail => {
            if let Some(quote) = view_data.detail.and_then(|id| view_data.cache.get(id)) {
                let area = centered_rect(72, 70, frame.area());
                frame.render_widget(Clear, area);
                let detail = Paragraph::new(render_detail_text(quote)).block(
                    Block::default()
                        .title(format!("quote {}", quote.number))
                        .borders(Borders::ALL),
                );
                frame.render_widget(detail, area);
            }
        }
        AppMode::Editor => {
            if let Some(editor) = &view_data.editor {
                let area = centered_rect(84, 84, frame.area());
                frame.render_widget(Clear, area);
                let form = Paragraph::new(render_editor_text(editor)).block(
                    Block::default()
                        .title(editor_title(editor))
                        .borders(Borders::ALL)
                        .style(Style::default().fg(Color::Cyan)),
                );
                frame.render_widget(form, area);
            }
        }
        AppMode::ConfirmDelete => {
            let area = centered_rect(50, 24, frame.area());
            frame.render_widget(Clear, area);
            let confirm = Paragraph::new(render_confirm_delete_text(view_data)).block(
                Block::default()
                    .title("delete")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
            frame.render_widget(confirm, area);
        }
        AppMode::Nav | AppMode::Search => {}
    }
}

fn render_quote_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let block = Block::default()
        .title(list_title(state, view_data))
        .borders(Borders::ALL);

    if let Some(message) = empty_list_text(state, view_data) {
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(
        ["number", "client", "company", "status", "total", "valid until"].map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        }),
    );

    let rows = visible_quotes(state, view_data)
        .into_iter()
        .enumerate()
        .map(|(index, quote)| {
            let row_style = if index == view_data.selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(quote.number.clone()),
                Cell::from(quote.client.name.clone()),
                Cell::from(
                    quote
                        .client
                        .company
                        .clone()
                        .unwrap_or_else(|| EMPTY_FIELD.to_owned()),
                ),
                Cell::from(quote.status.as_str())
                    .style(Style::default().fg(status_color(quote.status))),
                Cell::from(format_money(quote.totals.total)),
                Cell::from(format_date(quote.valid_until)),
            ])
            .style(row_style)
        });

    let widths = [
        Constraint::Length(11),
        Constraint::Min(16),
        Constraint::Min(16),
        Constraint::Length(9),
        Constraint::Length(14),
        Constraint::Length(11),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn status_color(status: QuoteStatus) -> Color {
    match status {
        QuoteStatus::Pending => Color::Yellow,
        QuoteStatus::Approved => Color::Green,
        QuoteStatus::Rejected => Color::Red,
    }
}

fn list_title(state: &AppState, view_data: &ViewData) -> String {
    format!(
        "quotes {}/{}",
        visible_count(state, view_data),
        view_data.cache.len()
    )
}

fn empty_list_text(state: &AppState, view_data: &ViewData) -> Option<&'static str> {
    if !view_data.cache.is_loaded() {
        return Some("loading quotes...");
    }
    if view_data.cache.is_empty() {
        return Some("no quotes yet -- press n to create one");
    }
    if visible_count(state, view_data) == 0 {
        return Some("no matches -- press c to clear filters");
    }
    None
}

fn filter_summary_text(state: &AppState) -> String {
    let search = if state.mode == AppMode::Search {
        format!("{}_", state.query.search)
    } else if state.query.search.is_empty() {
        EMPTY_FIELD.to_owned()
    } else {
        state.query.search.clone()
    };
    format!(
        "search: {search} | status: {}",
        state.query.status.as_str()
    )
}

fn status_text(state: &AppState) -> String {
    let mode = match state.mode {
        AppMode::Nav => "NAV",
        AppMode::Search => "SEARCH",
        AppMode::Detail => "DETAIL",
        AppMode::Editor => "EDIT",
        AppMode::ConfirmDelete => "DELETE",
    };
    let hints = match state.mode {
        AppMode::Nav => {
            "j/k move | enter open | n new | e edit | s status | d delete | / search | f filter | c clear | q quit"
        }
        AppMode::Search => "type to search | ctrl+u clear | enter/esc done",
        AppMode::Detail => "e edit | s status | d delete | esc close",
        AppMode::Editor => {
            "tab/shift+tab field | ctrl+a add row | ctrl+x remove row | ctrl+s save | esc cancel"
        }
        AppMode::ConfirmDelete => "y delete | any other key cancel",
    };
    match state.notice_text() {
        Some(notice) => format!("{mode} | {notice} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn editor_title(editor: &EditorUiState) -> String {
    match &editor.number {
        Some(number) => format!("edit {number}"),
        None => "new quote".to_owned(),
    }
}

fn focus_marker(focused: bool) -> &'static str {
    if focused { "> " } else { "  " }
}

fn tax_percent() -> i64 {
    (TAX_RATE * 100.0).round() as i64
}

fn render_editor_text(editor: &EditorUiState) -> String {
    let mut lines = Vec::new();
    for field in HeaderField::ALL {
        let focused = editor.focus == EditorFocus::Header(field);
        let value = editor.header_value(field);
        let shown = if focused {
            format!("[{value}]")
        } else {
            value.to_owned()
        };
        lines.push(format!(
            "{}{:<12} {shown}",
            focus_marker(focused),
            field.label()
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "  {:<3} {:<28} {:>8} {:>12} {:>14}",
        "#", "description", "qty", "price", "total"
    ));
    for (row, item) in editor.draft.editor.rows().iter().enumerate() {
        let focused_field = match editor.focus {
            EditorFocus::Item { row: focus_row, field } if focus_row == row => Some(field),
            _ => None,
        };
        let cell = |field: LineField| {
            let value = item.field(field);
            if focused_field == Some(field) {
                format!("[{value}]")
            } else {
                value.to_owned()
            }
        };
        lines.push(format!(
            "{}{:<3} {:<28} {:>8} {:>12} {:>14}",
            focus_marker(focused_field.is_some()),
            row + 1,
            cell(LineField::Description),
            cell(LineField::Quantity),
            cell(LineField::Price),
            format_money(draft_row_total(item)),
        ));
    }

    let totals = editor.draft.editor.totals();
    lines.push(String::new());
    lines.push(format!("subtotal  {:>14}", format_money(totals.subtotal)));
    lines.push(format!("tax {:>3}%  {:>14}", tax_percent(), format_money(totals.tax)));
    lines.push(format!("total     {:>14}", format_money(totals.total)));

    if let Some(error) = &editor.error {
        lines.push(String::new());
        lines.push(format!("! {error}"));
    }
    lines.join("\n")
}

fn render_detail_text(quote: &Quote) -> String {
    let optional = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or(EMPTY_FIELD)
            .to_owned()
    };

    let mut lines = vec![
        format!("client       {}", quote.client.name),
        format!("company      {}", optional(&quote.client.company)),
        format!("email        {}", optional(&quote.client.email)),
        format!("status       {}", quote.status.as_str()),
        format!("valid until  {}", format_date(quote.valid_until)),
        format!("created      {}", format_date(quote.created_at.date())),
        String::new(),
        format!(
            "{:<3} {:<28} {:>8} {:>12} {:>14}",
            "#", "description", "qty", "price", "total"
        ),
    ];
    for (index, item) in quote.items.iter().enumerate() {
        lines.push(format!(
            "{:<3} {:<28} {:>8} {:>12} {:>14}",
            index + 1,
            item.description,
            item.quantity,
            format_money(item.price),
            format_money(item.total()),
        ));
    }
    lines.push(String::new());
    lines.push(format!("subtotal  {:>14}", format_money(quote.totals.subtotal)));
    lines.push(format!(
        "tax {:>3}%  {:>14}",
        tax_percent(),
        format_money(quote.totals.tax)
    ));
    lines.push(format!("total     {:>14}", format_money(quote.totals.total)));
    lines.join("\n")
}

fn render_confirm_delete_text(view_data: &ViewData) -> String {
    match view_data
        .pending_delete
        .and_then(|id| view_data.cache.get(id))
    {
        Some(quote) => format!(
            "delete quote {} for {}?\n\npress y to delete, any other key to cancel",
            quote.number, quote.client.name
        ),
        None => "quote no longer exists; press any key".to_owned(),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, EditorFocus, HeaderField, InternalEvent, ViewData, empty_list_text,
        handle_key_event, list_title, process_internal_events, render, render_detail_text,
        render_editor_text, status_text, sync_feed,
    };
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use quotedesk_app::{
        AppMode, AppState, FeedEvent, LineField, QuoteFormInput, QuoteId, QuoteStatus,
        QuoteStore, StatusFilter, Subscription,
    };
    use quotedesk_testkit::{MemoryStore, fixture_date, simple_input};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use time::Date;

    struct TestRuntime {
        store: MemoryStore,
        feed: Subscription,
        feed_closed: bool,
    }

    impl TestRuntime {
        fn new() -> Self {
            let store = MemoryStore::new();
            let feed = store.subscribe();
            Self {
                store,
                feed,
                feed_closed: false,
            }
        }

        fn with_quotes(inputs: &[QuoteFormInput]) -> Self {
            let runtime = Self::new();
            for input in inputs {
                runtime
                    .store
                    .create_quote(input)
                    .expect("seed quote should be valid");
            }
            runtime
        }
    }

    impl AppRuntime for TestRuntime {
        fn poll_feed(&mut self) -> Vec<FeedEvent> {
            self.feed.drain()
        }

        fn create_quote(&mut self, input: &QuoteFormInput) -> anyhow::Result<QuoteId> {
            self.store.create_quote(input)
        }

        fn replace_quote(&mut self, id: QuoteId, input: &QuoteFormInput) -> anyhow::Result<()> {
            self.store.replace_quote(id, input)
        }

        fn update_status(&mut self, id: QuoteId, status: QuoteStatus) -> anyhow::Result<()> {
            self.store.update_status(id, status)
        }

        fn delete_quote(&mut self, id: QuoteId) -> anyhow::Result<()> {
            self.store.delete_quote(id)
        }

        fn today(&self) -> Date {
            fixture_date()
        }

        fn validity_days(&self) -> i64 {
            30
        }

        fn close_feed(&mut self) {
            self.feed.close();
            self.feed_closed = true;
        }
    }

    struct Harness {
        state: AppState,
        runtime: TestRuntime,
        view_data: ViewData,
        tx: mpsc::Sender<InternalEvent>,
        rx: mpsc::Receiver<InternalEvent>,
    }

    impl Harness {
        fn new(runtime: TestRuntime) -> Self {
            let (tx, rx) = mpsc::channel();
            let mut harness = Self {
                state: AppState::default(),
                runtime,
                view_data: ViewData::default(),
                tx,
                rx,
            };
            harness.sync();
            harness
        }

        fn sync(&mut self) {
            sync_feed(&mut self.state, &mut self.runtime, &mut self.view_data);
            process_internal_events(&mut self.state, &mut self.view_data, &self.rx);
        }

        fn press_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
            let quit = handle_key_event(
                &mut self.state,
                &mut self.runtime,
                &mut self.view_data,
                &self.tx,
                KeyEvent::new(code, modifiers),
            );
            self.sync();
            quit
        }

        fn press(&mut self, code: KeyCode) -> bool {
            self.press_with(code, KeyModifiers::NONE)
        }

        fn ctrl(&mut self, ch: char) -> bool {
            self.press_with(KeyCode::Char(ch), KeyModifiers::CONTROL)
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyCode::Char(ch));
            }
        }

        fn replace_field(&mut self, text: &str) {
            let current_len = match self.view_data.editor.as_ref().map(|editor| editor.focus) {
                Some(EditorFocus::Header(field)) => self
                    .view_data
                    .editor
                    .as_ref()
                    .map_or(0, |editor| editor.header_value(field).chars().count()),
                Some(EditorFocus::Item { row, field }) => {
                    self.view_data.editor.as_ref().map_or(0, |editor| {
                        editor.draft.editor.rows()[row].field(field).chars().count()
                    })
                }
                None => 0,
            };
            for _ in 0..current_len {
                self.press(KeyCode::Backspace);
            }
            self.type_text(text);
        }

        fn notice(&self) -> Option<&str> {
            self.state.notice_text()
        }

        fn visible_numbers(&self) -> Vec<String> {
            self.view_data
                .cache
                .visible(&self.state.query)
                .into_iter()
                .map(|quote| quote.number.clone())
                .collect()
        }
    }

    fn sample_runtime() -> TestRuntime {
        let mut beta = simple_input("Beta", "Gadget", 1.0, 5.5);
        beta.client.company = Some("Corp".to_owned());
        TestRuntime::with_quotes(&[
            simple_input("Acme", "Widget", 2.0, 10.0),
            beta,
            simple_input("Gamma", "Gizmo", 3.0, 1.0),
        ])
    }

    #[test]
    fn initial_snapshot_fills_the_list_newest_first() {
        let harness = Harness::new(sample_runtime());
        assert_eq!(
            harness.visible_numbers(),
            vec!["COT-000003", "COT-000002", "COT-000001"]
        );
        assert_eq!(list_title(&harness.state, &harness.view_data), "quotes 3/3");
        assert_eq!(empty_list_text(&harness.state, &harness.view_data), None);
    }

    #[test]
    fn empty_store_shows_empty_state() {
        let harness = Harness::new(TestRuntime::new());
        assert_eq!(
            empty_list_text(&harness.state, &harness.view_data),
            Some("no quotes yet -- press n to create one")
        );
    }

    #[test]
    fn list_shows_loading_before_first_snapshot() {
        let view_data = ViewData::default();
        assert_eq!(
            empty_list_text(&AppState::default(), &view_data),
            Some("loading quotes...")
        );
    }

    #[test]
    fn q_quits_from_nav_and_ctrl_q_quits_anywhere() {
        let mut harness = Harness::new(TestRuntime::new());
        assert!(harness.press(KeyCode::Char('q')));

        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.state.mode, AppMode::Editor);
        assert!(!harness.press(KeyCode::Char('q')));
        assert!(harness.ctrl('q'));
    }

    #[test]
    fn search_mode_filters_by_company_and_shows_no_matches() {
        let mut harness = Harness::new(sample_runtime());

        harness.press(KeyCode::Char('/'));
        assert_eq!(harness.state.mode, AppMode::Search);
        harness.type_text("CORP");
        assert_eq!(harness.visible_numbers(), vec!["COT-000002"]);
        assert_eq!(list_title(&harness.state, &harness.view_data), "quotes 1/3");

        harness.type_text("zzz");
        assert_eq!(
            empty_list_text(&harness.state, &harness.view_data),
            Some("no matches -- press c to clear filters")
        );

        harness.press(KeyCode::Esc);
        assert_eq!(harness.state.mode, AppMode::Nav);
        harness.press(KeyCode::Char('c'));
        assert_eq!(harness.visible_numbers().len(), 3);
        assert_eq!(harness.notice(), Some("filters cleared"));
    }

    #[test]
    fn status_filter_cycles_and_combines_with_search() {
        let mut harness = Harness::new(sample_runtime());

        harness.press(KeyCode::Char('f'));
        assert_eq!(
            harness.state.query.status,
            StatusFilter::Only(QuoteStatus::Pending)
        );
        assert_eq!(harness.visible_numbers().len(), 3);
        assert_eq!(harness.notice(), Some("status: pending"));

        harness.press(KeyCode::Char('f'));
        assert!(harness.visible_numbers().is_empty());
    }

    #[test]
    fn s_advances_status_of_selected_quote() {
        let mut harness = Harness::new(sample_runtime());
        harness.press(KeyCode::Char('j'));

        harness.press(KeyCode::Char('s'));
        let quote = harness
            .view_data
            .cache
            .all()
            .iter()
            .find(|quote| quote.number == "COT-000002")
            .cloned()
            .expect("quote should exist");
        assert_eq!(quote.status, QuoteStatus::Approved);
        assert_eq!(harness.notice(), Some("COT-000002 is now approved"));

        harness.press(KeyCode::Char('s'));
        harness.press(KeyCode::Char('s'));
        let status = harness
            .view_data
            .cache
            .get(quote.id)
            .map(|quote| quote.status);
        assert_eq!(status, Some(QuoteStatus::Pending));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut harness = Harness::new(sample_runtime());

        harness.press(KeyCode::Char('d'));
        assert_eq!(harness.state.mode, AppMode::ConfirmDelete);
        harness.press(KeyCode::Char('n'));
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.notice(), Some("delete canceled"));
        assert_eq!(harness.visible_numbers().len(), 3);

        harness.press(KeyCode::Char('d'));
        harness.press(KeyCode::Char('y'));
        assert_eq!(harness.notice(), Some("quote deleted"));
        assert_eq!(harness.visible_numbers(), vec!["COT-000002", "COT-000001"]);
    }

    #[test]
    fn write_failure_is_reported_and_list_unchanged() {
        let mut harness = Harness::new(sample_runtime());
        harness.runtime.store.fail_writes("backend unavailable");

        harness.press(KeyCode::Char('d'));
        harness.press(KeyCode::Char('y'));
        assert_eq!(
            harness.notice(),
            Some("delete failed: backend unavailable")
        );
        assert_eq!(harness.visible_numbers().len(), 3);

        harness.press(KeyCode::Char('s'));
        assert_eq!(
            harness.notice(),
            Some("status update failed: backend unavailable")
        );
        assert!(
            harness
                .view_data
                .cache
                .all()
                .iter()
                .all(|quote| quote.status == QuoteStatus::Pending)
        );
    }

    #[test]
    fn feed_failure_is_persistent_until_next_snapshot() {
        let mut harness = Harness::new(sample_runtime());

        harness.runtime.store.fail_reads("permission denied");
        harness.sync();
        assert_eq!(
            harness.notice(),
            Some("quote list may be stale: permission denied")
        );
        assert_eq!(harness.visible_numbers().len(), 3);

        harness.runtime.store.restore_reads();
        harness.sync();
        assert_eq!(harness.notice(), None);
    }

    #[test]
    fn new_quote_flow_computes_live_totals_and_saves() {
        let mut harness = Harness::new(TestRuntime::new());

        harness.press(KeyCode::Char('n'));
        harness.type_text("Acme");
        for _ in HeaderField::ALL.iter().skip(1) {
            harness.press(KeyCode::Tab);
        }
        assert_eq!(
            harness.view_data.editor.as_ref().map(|editor| editor.focus),
            Some(EditorFocus::Header(HeaderField::ValidUntil))
        );
        harness.press(KeyCode::Tab);
        harness.type_text("Widget");
        harness.press(KeyCode::Tab);
        harness.replace_field("2");
        harness.press(KeyCode::Tab);
        harness.replace_field("10.00");

        harness.ctrl('a');
        assert_eq!(
            harness.view_data.editor.as_ref().map(|editor| editor.focus),
            Some(EditorFocus::Item {
                row: 1,
                field: LineField::Description
            })
        );
        harness.type_text("Shipping");
        harness.press(KeyCode::Tab);
        harness.press(KeyCode::Tab);
        harness.replace_field("5.50");

        let text = harness
            .view_data
            .editor
            .as_ref()
            .map(render_editor_text)
            .unwrap_or_default();
        assert!(text.contains("$25.50"), "{text}");
        assert!(text.contains("$4.08"), "{text}");
        assert!(text.contains("$29.58"), "{text}");
        assert!(text.contains("tax  16%"), "{text}");

        harness.ctrl('s');
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert!(harness.view_data.editor.is_none());
        assert_eq!(harness.notice(), Some("quote saved"));

        let quotes = harness.view_data.cache.all();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].client.name, "Acme");
        assert_eq!(quotes[0].items.len(), 2);
        assert!((quotes[0].totals.total - 29.58).abs() < 1e-9);
    }

    #[test]
    fn garbage_numbers_count_as_zero_live_but_block_save() {
        let mut harness = Harness::new(TestRuntime::new());

        harness.press(KeyCode::Char('n'));
        harness.type_text("Acme");
        for _ in 0..4 {
            harness.press(KeyCode::Tab);
        }
        harness.type_text("Widget");
        harness.press(KeyCode::Tab);
        harness.replace_field("abc");
        harness.press(KeyCode::Tab);
        harness.replace_field("10");

        let text = harness
            .view_data
            .editor
            .as_ref()
            .map(render_editor_text)
            .unwrap_or_default();
        assert!(text.contains("$0.00"), "{text}");

        harness.ctrl('s');
        assert_eq!(harness.state.mode, AppMode::Editor);
        assert_eq!(harness.notice(), Some("line 1 quantity: invalid number"));
        assert!(
            harness
                .view_data
                .editor
                .as_ref()
                .and_then(|editor| editor.error.as_deref())
                .is_some()
        );
        assert!(harness.view_data.cache.is_empty());
    }

    #[test]
    fn missing_client_name_blocks_save() {
        let mut harness = Harness::new(TestRuntime::new());
        harness.press(KeyCode::Char('n'));
        for _ in 0..4 {
            harness.press(KeyCode::Tab);
        }
        harness.type_text("Widget");

        harness.ctrl('s');
        assert_eq!(harness.state.mode, AppMode::Editor);
        assert!(
            harness
                .notice()
                .is_some_and(|notice| notice.contains("client name is required"))
        );
    }

    #[test]
    fn last_row_cannot_be_removed() {
        let mut harness = Harness::new(TestRuntime::new());
        harness.press(KeyCode::Char('n'));
        for _ in 0..4 {
            harness.press(KeyCode::Tab);
        }

        harness.ctrl('x');
        assert_eq!(
            harness.notice(),
            Some("a quote needs at least one line item")
        );
        assert_eq!(
            harness
                .view_data
                .editor
                .as_ref()
                .map(|editor| editor.draft.editor.len()),
            Some(1)
        );

        harness.ctrl('a');
        harness.ctrl('x');
        assert_eq!(
            harness
                .view_data
                .editor
                .as_ref()
                .map(|editor| editor.draft.editor.len()),
            Some(1)
        );
    }

    #[test]
    fn edit_replaces_quote_and_keeps_number_and_status() {
        let mut harness = Harness::new(sample_runtime());
        harness.press(KeyCode::Char('s'));

        harness.press(KeyCode::Char('e'));
        assert_eq!(harness.state.mode, AppMode::Editor);
        harness.replace_field("Gamma Labs");
        harness.ctrl('s');

        assert_eq!(harness.notice(), Some("quote saved"));
        let quote = harness.view_data.cache.all()[0].clone();
        assert_eq!(quote.number, "COT-000003");
        assert_eq!(quote.client.name, "Gamma Labs");
        assert_eq!(quote.status, QuoteStatus::Approved);
        assert_eq!(harness.view_data.cache.len(), 3);
    }

    #[test]
    fn escape_cancels_editor_without_writing() {
        let mut harness = Harness::new(sample_runtime());
        harness.press(KeyCode::Char('e'));
        harness.replace_field("Changed");
        harness.press(KeyCode::Esc);

        assert_eq!(harness.state.mode, AppMode::Nav);
        assert_eq!(harness.notice(), Some("edit canceled"));
        assert_eq!(harness.view_data.cache.all()[0].client.name, "Gamma");
    }

    #[test]
    fn detail_overlay_shows_items_and_closes_when_quote_disappears() {
        let mut harness = Harness::new(sample_runtime());
        harness.press(KeyCode::Char('G'));
        harness.press(KeyCode::Enter);
        assert_eq!(harness.state.mode, AppMode::Detail);

        let id = harness.view_data.detail.expect("detail should be open");
        let text = harness
            .view_data
            .cache
            .get(id)
            .map(render_detail_text)
            .unwrap_or_default();
        assert!(text.contains("client       Acme"), "{text}");
        assert!(text.contains("Widget"), "{text}");
        assert!(text.contains("$23.20"), "{text}");

        harness
            .runtime
            .store
            .delete_quote(id)
            .expect("delete should succeed");
        harness.sync();
        assert_eq!(harness.state.mode, AppMode::Nav);
        assert!(harness.view_data.detail.is_none());
    }

    #[test]
    fn selection_is_clamped_when_list_shrinks() {
        let mut harness = Harness::new(sample_runtime());
        harness.press(KeyCode::Char('G'));
        assert_eq!(harness.view_data.selected, 2);

        let oldest = harness.view_data.cache.all()[2].id;
        harness
            .runtime
            .store
            .delete_quote(oldest)
            .expect("delete should succeed");
        harness.sync();
        assert_eq!(harness.view_data.selected, 1);
    }

    #[test]
    fn status_text_combines_mode_notice_and_hints() {
        let mut harness = Harness::new(sample_runtime());
        let idle = status_text(&harness.state);
        assert!(idle.starts_with("NAV | j/k move"));

        harness.press(KeyCode::Char('f'));
        let text = status_text(&harness.state);
        assert!(text.starts_with("NAV | status: pending | "), "{text}");
    }

    #[test]
    fn stale_clear_tokens_are_ignored() {
        let mut harness = Harness::new(sample_runtime());
        harness.press(KeyCode::Char('f'));
        harness.press(KeyCode::Char('f'));

        harness
            .tx
            .send(InternalEvent::ClearStatus { token: 1 })
            .expect("channel open");
        harness.sync();
        assert_eq!(harness.notice(), Some("status: approved"));

        let current = harness.view_data.status_token;
        harness
            .tx
            .send(InternalEvent::ClearStatus { token: current })
            .expect("channel open");
        harness.sync();
        assert_eq!(harness.notice(), None);
    }

    #[test]
    fn render_draws_every_mode_without_panicking() {
        let mut harness = Harness::new(sample_runtime());
        let mut terminal =
            Terminal::new(TestBackend::new(120, 40)).expect("test terminal should build");

        for key in [
            KeyCode::Enter,
            KeyCode::Esc,
            KeyCode::Char('d'),
            KeyCode::Esc,
            KeyCode::Char('n'),
        ] {
            terminal
                .draw(|frame| render(frame, &harness.state, &harness.view_data))
                .expect("draw should succeed");
            harness.press(key);
        }
        terminal
            .draw(|frame| render(frame, &harness.state, &harness.view_data))
            .expect("draw should succeed");
        assert_eq!(harness.state.mode, AppMode::Editor);
    }

    #[test]
    fn close_feed_is_part_of_the_runtime_contract() {
        let mut runtime = TestRuntime::new();
        runtime.close_feed();
        assert!(runtime.feed_closed);
        assert!(!runtime.feed.is_open());
        assert_eq!(runtime.store.subscriber_count(), 1);
        runtime
            .store
            .create_quote(&simple_input("Acme", "Widget", 1.0, 1.0))
            .expect("create should succeed");
        assert_eq!(runtime.store.subscriber_count(), 0);
    }
}
