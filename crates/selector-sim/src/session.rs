//! Scripted selector session
//!
//! Wires a [`Selector`] to the JSON catalog, replays script steps against it
//! and collects what a user would have seen.

use crate::catalog::{JsonCatalog, LocalCreator};
use crate::script::Step;
use anyhow::{bail, Context};
use parking_lot::Mutex;
use selector_core::{
    Collaborators, EntityAdapter, Item, Notification, NotificationKind, NotificationSink,
    ResultPage, SearchOutcome, Selector, SelectorConfig, SubmitOutcome, TracingNotifier,
};
use serde::Serialize;
use std::sync::Arc;

/// Notification sink that logs and keeps every message
#[derive(Default)]
pub(crate) struct NoticeLog {
    lines: Mutex<Vec<Notice>>,
}

/// One toast as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Notice {
    pub(crate) error: bool,
    pub(crate) message: String,
}

impl NoticeLog {
    fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl NotificationSink for NoticeLog {
    fn notify(&self, notification: &Notification) {
        TracingNotifier.notify(notification);
        self.lines.lock().push(Notice {
            error: notification.kind() == NotificationKind::Error,
            message: notification.to_string(),
        });
    }
}

/// Final state of a session
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SessionReport {
    pub(crate) kind: String,
    pub(crate) selected: Vec<Item>,
    pub(crate) results: ResultPage,
    pub(crate) notices: Vec<Notice>,
}

impl SessionReport {
    /// Human readable summary
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!(
            "Results (page {} of {}, {} total):\n",
            self.results.current_page,
            self.results.total_pages().max(1),
            self.results.total_count
        ));
        for item in &self.results.items {
            out.push_str(&format!("  {} <{}>\n", item.name, item.uri));
        }

        out.push_str(&format!("Selected {} ({}):\n", self.kind, self.selected.len()));
        for item in &self.selected {
            out.push_str(&format!("  {} <{}>\n", item.name, item.uri));
        }

        if !self.notices.is_empty() {
            out.push_str("Notifications:\n");
            for notice in &self.notices {
                let tag = if notice.error { "error" } else { "ok" };
                out.push_str(&format!("  [{tag}] {}\n", notice.message));
            }
        }

        out
    }
}

/// Selector plus the fakes it talks to
pub(crate) struct Session<A: EntityAdapter> {
    selector: Selector<A>,
    notices: Arc<NoticeLog>,
}

impl<A: EntityAdapter> Session<A> {
    /// Build a session over catalog records
    ///
    /// # Errors
    /// Fails if the configuration is invalid.
    pub(crate) fn new(
        config: SelectorConfig,
        records: Vec<A::Record>,
        selected: Vec<Item>,
    ) -> anyhow::Result<Self> {
        let catalog = Arc::new(JsonCatalog::<A>::new(records));
        tracing::info!(kind = %A::KIND, records = catalog.record_count(), "catalog loaded");

        let notices = Arc::new(NoticeLog::default());
        let collaborators: Collaborators<A::Record> = Collaborators {
            catalog: catalog.clone(),
            preferred: catalog,
            creator: Arc::new(LocalCreator),
            notifier: notices.clone(),
            listener: Arc::new(|items: &[Item]| {
                tracing::info!(count = items.len(), "selection changed");
            }),
        };

        let selector = Selector::new(config, collaborators, selected)
            .context("building selector")?;

        Ok(Self { selector, notices })
    }

    /// Replay steps in order
    ///
    /// # Errors
    /// Fails on a toggle of an item not on display, a custom item while the
    /// picker is closed, or a submission the selector refuses. Remote failures are reported as notifications.
    pub(crate) async fn run(&self, steps: &[Step]) -> anyhow::Result<()> {
        for step in steps {
            tracing::debug!(?step, "running step");
            self.apply(step).await?;
        }
        Ok(())
    }

    async fn apply(&self, step: &Step) -> anyhow::Result<()> {
        let outcome = match step {
            Step::Open => self.selector.open().await,
            Step::Close => {
                self.selector.close();
                return Ok(());
            }
            Step::Search(term) => self.selector.search(term).await,
            Step::Page(page) => self.selector.change_page(*page).await,
            Step::Filter(filters) => self.selector.set_filters(filters.clone()).await,
            Step::Preferred(uris) => self.selector.set_preferred_uris(uris.clone()).await,
            Step::PreferredOnly(flag) => self.selector.set_preferred_only(*flag).await,
            Step::Toggle(uri) => {
                let page = self.selector.result_page();
                let Some(item) = page.items.iter().find(|item| item.uri == *uri) else {
                    bail!("'{uri}' is not among the displayed results");
                };
                self.selector.toggle_selection(item);
                return Ok(());
            }
            Step::Remove(key) => {
                if self.selector.remove_one(key).is_none() {
                    tracing::warn!(%key, "nothing selected under that key");
                }
                return Ok(());
            }
            Step::Clear => {
                self.selector.remove_all();
                return Ok(());
            }
            Step::Custom(draft) => {
                if !self.selector.open_custom_form() {
                    bail!("the custom item form needs an open picker");
                }
                let outcome = self.selector.submit_custom_item(draft.clone()).await?;
                if let SubmitOutcome::Failed(errors) = &outcome {
                    for message in errors.messages() {
                        tracing::warn!(%message, "custom item rejected");
                    }
                    self.selector.cancel_custom_form();
                }
                return Ok(());
            }
        };

        if outcome == SearchOutcome::Ignored {
            tracing::warn!(?step, "step not permitted in the current mode");
        }
        Ok(())
    }

    /// Snapshot of what the user sees now
    pub(crate) fn report(&self) -> SessionReport {
        SessionReport {
            kind: A::KIND.to_string(),
            selected: self.selector.selected_items(),
            results: self.selector.result_page(),
            notices: self.notices.drain(),
        }
    }
}
