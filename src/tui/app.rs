use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::users::UserApi;
use crate::users::models::{Field, UserRecord};
use crate::users::store::{Completion, Outcome, Request, UserManager, execute};

/// Focusable slot inside the form pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSlot {
    Input(Field),
    Submit,
}

impl FormSlot {
    const ORDER: [FormSlot; 6] = [
        FormSlot::Input(Field::Name),
        FormSlot::Input(Field::Email),
        FormSlot::Input(Field::Phone),
        FormSlot::Input(Field::Street),
        FormSlot::Input(Field::City),
        FormSlot::Submit,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|s| *s == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Form,
    Table,
}

/// Interactive state of the user manager screen.
///
/// Key handling only touches local state and returns the requests it wants
/// sent; `App::dispatch` runs those on the tokio runtime and the results come
/// back through `drain_completions` on the UI thread.
pub struct App {
    pub manager: UserManager,
    pub pane: Pane,
    pub slot: FormSlot,
    pub table_state: TableState,
    pub filter: String,
    pub filtering: bool,
    pub should_quit: bool,
    api: Arc<dyn UserApi>,
    handle: Handle,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl App {
    pub fn new(api: Arc<dyn UserApi>, handle: Handle, lock_name_on_edit: bool) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            manager: UserManager::new(lock_name_on_edit),
            pane: Pane::Form,
            slot: FormSlot::Input(Field::Name),
            table_state: TableState::default(),
            filter: String::new(),
            filtering: false,
            should_quit: false,
            api,
            handle,
            tx,
            rx,
        }
    }

    /// Kick off the initial fetch
    pub fn start(&mut self) {
        let request = self.manager.start_loading();
        self.dispatch(request);
    }

    /// Send `request` in the background. Nothing tracks it after this; its
    /// completion is merged whenever it arrives.
    pub fn dispatch(&self, request: Request) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let completion = execute(api.as_ref(), request).await;
            let _ = tx.send(completion);
        });
    }

    /// Apply every completion that has arrived. Returns true if any did.
    pub fn drain_completions(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.rx.try_recv() {
            self.on_completion(completion);
            changed = true;
        }
        changed
    }

    pub fn on_completion(&mut self, completion: Completion) -> Outcome {
        let outcome = self.manager.apply(completion);
        if matches!(outcome, Outcome::Created(_) | Outcome::Updated(_)) && self.pane == Pane::Form {
            self.slot = FormSlot::Input(Field::Name);
        }
        self.clamp_selection();
        outcome
    }

    /// Records currently shown in the table
    pub fn visible(&self) -> Vec<&UserRecord> {
        self.manager.filtered(&self.filter)
    }

    /// Record under the cursor. None while a fetch is in flight, since the
    /// table only shows the loading row then.
    pub fn selected_record(&self) -> Option<UserRecord> {
        if self.manager.is_loading() {
            return None;
        }
        let index = self.table_state.selected()?;
        self.visible().get(index).map(|record| (*record).clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None if self.pane == Pane::Table => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    /// Handle one key press; returns the request to send, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Request> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c')) {
            self.should_quit = true;
            return None;
        }
        if key.code == KeyCode::F(2) || (ctrl && matches!(key.code, KeyCode::Char('t'))) {
            self.toggle_pane();
            return None;
        }

        match self.pane {
            Pane::Form => self.handle_form_key(key),
            Pane::Table if self.filtering => {
                self.handle_filter_key(key);
                None
            }
            Pane::Table => self.handle_table_key(key),
        }
    }

    fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Form => Pane::Table,
            Pane::Table => Pane::Form,
        };
        self.filtering = false;
        self.clamp_selection();
    }

    fn move_slot(&mut self, forward: bool) {
        let len = FormSlot::ORDER.len();
        let mut pos = self.slot.position();
        // Skip over locked inputs
        for _ in 0..len {
            pos = if forward {
                (pos + 1) % len
            } else {
                (pos + len - 1) % len
            };
            let candidate = FormSlot::ORDER[pos];
            if let FormSlot::Input(field) = candidate
                && self.manager.is_locked(field)
            {
                continue;
            }
            self.slot = candidate;
            return;
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Request> {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.move_slot(true),
            KeyCode::BackTab | KeyCode::Up => self.move_slot(false),
            KeyCode::Enter => return self.manager.prepare_submit(),
            KeyCode::Esc => {
                if self.manager.draft().is_editing() {
                    self.manager.reset_draft();
                    self.slot = FormSlot::Input(Field::Name);
                }
            }
            KeyCode::Backspace => {
                if let FormSlot::Input(field) = self.slot
                    && let Some(value) = self.manager.field_mut(field)
                {
                    value.pop();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let FormSlot::Input(field) = self.slot
                    && let Some(value) = self.manager.field_mut(field)
                {
                    value.push(c);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> Option<Request> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Tab => self.toggle_pane(),
            KeyCode::Down | KeyCode::Char('j') => self.select_offset(1),
            KeyCode::Up | KeyCode::Char('k') => self.select_offset(-1),
            KeyCode::Char('/') => self.filtering = true,
            KeyCode::Char('r') => return Some(self.manager.start_loading()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(record) = self.selected_record() {
                    self.manager.begin_edit(&record);
                    self.pane = Pane::Form;
                    self.slot = FormSlot::Input(Field::Name);
                    if self.manager.is_locked(Field::Name) {
                        self.move_slot(true);
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(record) = self.selected_record() {
                    return Some(self.manager.prepare_remove(record.id));
                }
            }
            _ => {}
        }
        None
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear();
                self.filtering = false;
            }
            KeyCode::Enter => self.filtering = false,
            KeyCode::Backspace => {
                self.filter.pop();
            }
            KeyCode::Char(c) => self.filter.push(c),
            _ => {}
        }
        self.table_state
            .select(if self.visible().is_empty() { None } else { Some(0) });
    }

    fn select_offset(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.table_state.select(Some(next));
    }
}
