// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::filter::QuoteQuery;
use crate::model::StatusFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Search,
    Detail,
    Editor,
    ConfirmDelete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Cleared by the UI after a short delay.
    Transient,
    /// Stays until the condition behind it goes away.
    Persistent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub query: QuoteQuery,
    pub notice: Option<Notice>,
    pub feed_error: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            query: QuoteQuery::default(),
            notice: None,
            feed_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SetMode(AppMode),
    ExitToNav,
    SetSearch(String),
    PushSearchChar(char),
    PopSearchChar,
    SetStatusFilter(StatusFilter),
    CycleStatusFilter,
    ClearFilters,
    SetStatus(String),
    WriteFailed(String),
    FeedFailed(String),
    FeedRecovered,
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    QueryChanged,
    NoticeUpdated(Notice),
    NoticeCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SetMode(mode) => {
                self.mode = mode;
                vec![AppEvent::ModeChanged(mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetSearch(search) => {
                self.query.search = search;
                vec![AppEvent::QueryChanged]
            }
            AppCommand::PushSearchChar(ch) => {
                self.query.search.push(ch);
                vec![AppEvent::QueryChanged]
            }
            AppCommand::PopSearchChar => {
                if self.query.search.pop().is_none() {
                    return Vec::new();
                }
                vec![AppEvent::QueryChanged]
            }
            AppCommand::SetStatusFilter(filter) => {
                self.query.status = filter;
                vec![AppEvent::QueryChanged]
            }
            AppCommand::CycleStatusFilter => {
                self.query.status = self.query.status.next();
                let label = format!("status: {}", self.query.status.as_str());
                vec![AppEvent::QueryChanged, self.set_notice(NoticeKind::Transient, label)]
            }
            AppCommand::ClearFilters => {
                self.query = QuoteQuery::default();
                vec![
                    AppEvent::QueryChanged,
                    self.set_notice(NoticeKind::Transient, "filters cleared".to_owned()),
                ]
            }
            AppCommand::SetStatus(message) => {
                vec![self.set_notice(NoticeKind::Transient, message)]
            }
            AppCommand::WriteFailed(message) => {
                vec![self.set_notice(NoticeKind::Transient, message)]
            }
            AppCommand::FeedFailed(error) => {
                let message = format!("quote list may be stale: {error}");
                self.feed_error = Some(message.clone());
                vec![self.set_notice(NoticeKind::Persistent, message)]
            }
            AppCommand::FeedRecovered => {
                if self.feed_error.take().is_none() {
                    return Vec::new();
                }
                self.clear_notice_of(NoticeKind::Persistent)
            }
            AppCommand::ClearStatus => self.clear_notice_of(NoticeKind::Transient),
        }
    }

    /// Current notice text, with a standing feed failure taking over once a
    /// transient notice expires.
    pub fn notice_text(&self) -> Option<&str> {
        self.notice
            .as_ref()
            .map(|notice| notice.message.as_str())
            .or(self.feed_error.as_deref())
    }

    fn set_notice(&mut self, kind: NoticeKind, message: String) -> AppEvent {
        let notice = Notice { kind, message };
        self.notice = Some(notice.clone());
        AppEvent::NoticeUpdated(notice)
    }

    fn clear_notice_of(&mut self, kind: NoticeKind) -> Vec<AppEvent> {
        match &self.notice {
            Some(notice) if notice.kind == kind => {
                self.notice = None;
                vec![AppEvent::NoticeCleared]
            }
            _ => Vec::new(),
        }
    }
}
