//! Terminal stand-in for the browser page: dispatches events and commits views.

use std::io::{self, Write};

use roster_core::{RegistrationPage, RegistrationView, RosterController, ViewUpdate};
use shared::{domain::SortKey, protocol::PageEvent};
use storage::KeyValueStore;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Html,
}

pub enum Flow {
    Continue,
    Quit,
}

pub struct Page<S> {
    pub roster: RosterController<S>,
    pub registration: RegistrationPage<S>,
    pub mode: OutputMode,
}

impl<S: KeyValueStore> Page<S> {
    pub async fn start(&mut self, out: &mut impl Write) -> io::Result<()> {
        let update = self.roster.initialize().await;
        commit_update(out, &update, self.mode)?;
        match self.registration.load().await {
            Ok(view) => commit_registration(out, &view),
            Err(err) => {
                warn!(error = %err, "registration: failed to read stored user");
                Ok(())
            }
        }
    }

    pub async fn handle(&mut self, event: PageEvent, out: &mut impl Write) -> io::Result<Flow> {
        match event {
            PageEvent::Search { query } => {
                let update = self.roster.submit_search(&query);
                commit_update(out, &update, self.mode)?;
            }
            PageEvent::ChangeSort { key } => {
                match key.map(|raw| raw.parse::<SortKey>()).transpose() {
                    Ok(key) => {
                        let update = self.roster.change_sort(key);
                        commit_update(out, &update, self.mode)?;
                    }
                    Err(err) => writeln!(out, "[search] {err}")?,
                }
            }
            PageEvent::Clear => {
                let update = self.roster.clear();
                commit_update(out, &update, self.mode)?;
            }
            PageEvent::AddStudent(form) => {
                let update = self.roster.submit_add(&form).await;
                commit_update(out, &update, self.mode)?;
            }
            PageEvent::List => {
                let tree = roster_core::render(self.roster.store().list());
                writeln!(out, "{}", tree.to_text())?;
            }
            PageEvent::ShowHtml => {
                let tree = roster_core::render(self.roster.store().list());
                writeln!(out, "{}", tree.to_html())?;
            }
            PageEvent::Register(form) => match self.registration.submit(&form).await {
                Ok(view) => commit_registration(out, &view)?,
                Err(err) => writeln!(out, "[register] {err}")?,
            },
            PageEvent::SignOut => match self.registration.sign_out().await {
                Ok(view) => commit_registration(out, &view)?,
                Err(err) => writeln!(out, "[register] sign out failed: {err}")?,
            },
            PageEvent::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

pub fn commit_update(out: &mut impl Write, update: &ViewUpdate, mode: OutputMode) -> io::Result<()> {
    if let Some(display) = &update.display {
        let body = match mode {
            OutputMode::Text => display.to_text(),
            OutputMode::Html => display.to_html(),
        };
        if !body.is_empty() {
            writeln!(out, "{body}")?;
        }
    }
    if let Some(status) = &update.search_status {
        writeln!(out, "[search] {status}")?;
    }
    if let Some(status) = &update.add_status {
        writeln!(out, "[add] {status}")?;
    }
    if update.reset_add_form {
        writeln!(out, "[add] form reset")?;
    }
    if let Some(error) = &update.error {
        writeln!(out, "[error] {}: {}", error.code, error.message)?;
    }
    Ok(())
}

pub fn commit_registration(out: &mut impl Write, view: &RegistrationView) -> io::Result<()> {
    match &view.greeting {
        Some(greeting) => writeln!(out, "[user] {greeting}")?,
        None => writeln!(out, "[user] not registered")?,
    }
    if let Some(notice) = view.notice {
        writeln!(out, "[user] {notice}")?;
    }
    if view.show_form {
        writeln!(out, "[user] registration form shown")?;
    }
    if view.show_signout {
        writeln!(out, "[user] sign out available")?;
    }
    Ok(())
}
