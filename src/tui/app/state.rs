use crate::cards::Card;
use crate::config::TableConfig;
use crate::coordinator::{TableSnapshot, TurnCoordinator};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::events::{ChannelObserver, TableEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Scene {
    Menu,
    Table,
}

/// High-level input actions for the TUI controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputAction {
    MenuNext,
    MenuPrev,
    MenuInc,
    MenuDec,
    MenuApply,
    ToggleHelp,
    SelectNext,
    SelectPrev,
    SelectSlot(usize),
    Play,
    Fold,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct AppState {
    pub scene: Scene,
    pub started: Instant,
    // Table settings being edited in the menu
    pub config: TableConfig,
    pub menu_index: usize,
    coordinator: Option<TurnCoordinator>,
    events: Option<Receiver<TableEvent>>,
    table: Option<TableSnapshot>,
    // Index into the human hand
    selected: usize,
    status: Option<String>,
    help_open: bool,
    // First fold press on a running game only asks
    fold_pending: bool,
    action_error: Option<String>,
    action_error_at: Option<Instant>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

impl AppState {
    const ACTION_ERROR_TTL: Duration = Duration::from_secs(3);

    pub fn new(config: TableConfig) -> Self {
        Self {
            scene: Scene::Menu,
            started: Instant::now(),
            config,
            menu_index: 0,
            coordinator: None,
            events: None,
            table: None,
            selected: 0,
            status: None,
            help_open: false,
            fold_pending: false,
            action_error: None,
            action_error_at: None,
        }
    }

    pub fn table(&self) -> Option<&TableSnapshot> {
        self.table.as_ref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_card(&self) -> Option<Card> {
        self.table.as_ref()?.human_hand().get(self.selected).copied()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    /// A fold was requested and waits for a second press.
    pub fn fold_pending(&self) -> bool {
        self.fold_pending
    }

    pub fn is_human_turn(&self) -> bool {
        self.table.as_ref().is_some_and(TableSnapshot::is_human_turn)
    }

    pub fn is_finished(&self) -> bool {
        self.table.as_ref().is_some_and(TableSnapshot::is_finished)
    }

    pub(crate) fn close_help(&mut self) {
        self.help_open = false;
    }

    fn set_action_error(&mut self, message: String) {
        self.action_error = Some(message);
        self.action_error_at = Some(Instant::now());
    }

    fn clear_action_error(&mut self) {
        self.action_error = None;
        self.action_error_at = None;
    }

    /// Returns true when the input changed the game itself.
    pub fn handle_input(&mut self, action: InputAction) -> bool {
        let confirming = std::mem::take(&mut self.fold_pending);
        match action {
            InputAction::ToggleHelp => {
                if self.scene == Scene::Table {
                    self.help_open = !self.help_open;
                }
                false
            }
            InputAction::MenuNext => {
                if self.scene == Scene::Menu {
                    self.menu_next();
                }
                false
            }
            InputAction::MenuPrev => {
                if self.scene == Scene::Menu {
                    self.menu_prev();
                }
                false
            }
            InputAction::MenuInc => {
                if self.scene == Scene::Menu {
                    self.menu_inc();
                }
                false
            }
            InputAction::MenuDec => {
                if self.scene == Scene::Menu {
                    self.menu_dec();
                }
                false
            }
            InputAction::MenuApply => self.scene == Scene::Menu && self.apply_menu(),
            InputAction::SelectNext => {
                self.move_selection(1);
                false
            }
            InputAction::SelectPrev => {
                self.move_selection(-1);
                false
            }
            InputAction::SelectSlot(idx) => {
                let len = self.hand_len();
                if self.scene == Scene::Table && idx < len {
                    self.selected = idx;
                }
                false
            }
            InputAction::Play => self.scene == Scene::Table && self.play_selected(),
            InputAction::Fold => {
                if self.scene != Scene::Table {
                    return false;
                }
                if confirming || self.is_finished() {
                    self.fold();
                    true
                } else {
                    self.fold_pending = true;
                    false
                }
            }
        }
    }

    fn hand_len(&self) -> usize {
        self.table.as_ref().map_or(0, |t| t.human_hand().len())
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.hand_len();
        if self.scene != Scene::Table || len == 0 {
            return;
        }
        let next = (self.selected as isize + delta).rem_euclid(len as isize);
        self.selected = next as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.hand_len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Deal a new game with the menu settings and start the CPU worker.
    pub(crate) fn start_table(&mut self) -> bool {
        self.leave_table();
        let mut coordinator = match TurnCoordinator::from_config(&self.config) {
            Ok(c) => c,
            Err(err) => {
                self.set_action_error(err.to_string());
                return false;
            }
        };
        let (observer, events) = ChannelObserver::pair();
        coordinator.add_observer(Arc::new(observer));
        if let Err(err) = coordinator.start() {
            warn!(%err, "could not start cpu worker");
            self.set_action_error(format!("could not start CPU players: {err}"));
            return false;
        }
        info!(players = self.config.players, "table opened");
        self.table = Some(coordinator.snapshot());
        self.coordinator = Some(coordinator);
        self.events = Some(events);
        self.selected = 0;
        self.help_open = false;
        self.fold_pending = false;
        self.clear_action_error();
        self.status = Some(if self.table.as_ref().is_some_and(human_out) {
            "You had no playable card.".to_string()
        } else {
            "Your turn.".to_string()
        });
        self.scene = Scene::Table;
        true
    }

    // Stops the worker before the receiver is dropped.
    fn leave_table(&mut self) {
        if let Some(mut coordinator) = self.coordinator.take() {
            coordinator.stop();
        }
        self.events = None;
        self.table = None;
        self.selected = 0;
    }

    fn play_selected(&mut self) -> bool {
        let Some(card) = self.selected_card() else {
            return false;
        };
        let Some(coordinator) = self.coordinator.as_ref() else {
            return false;
        };
        match coordinator.submit_human_move(card) {
            Ok(outcome) => {
                self.table = Some(coordinator.snapshot());
                self.clear_action_error();
                self.status = Some(format!(
                    "You played {}, the sum is {}.",
                    card.face(),
                    outcome.table_sum
                ));
                self.clamp_selection();
                true
            }
            Err(err) => {
                debug!(%card, %err, "move refused");
                self.set_action_error(err.to_string());
                false
            }
        }
    }

    fn fold(&mut self) {
        info!("player left the table");
        self.leave_table();
        self.status = None;
        self.clear_action_error();
        self.open_menu();
    }

    /// Apply queued table events and expire stale errors. Called once per tick.
    pub fn on_tick(&mut self) {
        if let Some(at) = self.action_error_at {
            if at.elapsed() >= Self::ACTION_ERROR_TTL {
                self.clear_action_error();
            }
        }
        let Some(events) = self.events.as_ref() else {
            return;
        };
        let pending: Vec<TableEvent> = events.try_iter().collect();
        for event in pending {
            self.apply_event(event);
        }
        self.clamp_selection();
    }

    fn apply_event(&mut self, event: TableEvent) {
        match event {
            TableEvent::Refresh(table) => self.accept_table(table),
            TableEvent::Winner(table) => {
                let human_won =
                    table.winner.and_then(|w| table.seats.get(w)).is_some_and(|s| s.human);
                self.status = Some(match table.winner_name() {
                    _ if human_won => "You win!".to_string(),
                    Some(name) => format!("{name} wins."),
                    None => "Game over.".to_string(),
                });
                self.accept_table(table);
            }
            TableEvent::HumanTurn => self.status = Some("Your turn.".to_string()),
        }
    }

    // A snapshot taken directly after a human move can be newer than queued events.
    fn accept_table(&mut self, table: TableSnapshot) {
        let was_out = match self.table.as_ref() {
            Some(current) if table.is_older_than(current) => return,
            Some(current) => human_out(current),
            None => false,
        };
        if !was_out && human_out(&table) && !table.is_finished() {
            info!("human seat eliminated");
            self.status = Some("You are out: no playable card. The CPUs play on.".to_string());
        }
        self.table = Some(table);
    }
}

fn human_out(table: &TableSnapshot) -> bool {
    table.seats.iter().any(|s| s.human && s.eliminated)
}

impl Drop for AppState {
    fn drop(&mut self) {
        self.leave_table();
    }
}
