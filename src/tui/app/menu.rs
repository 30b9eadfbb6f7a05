use crate::game::{MAX_PLAYERS, MIN_PLAYERS};

use super::{AppState, Scene};

const DELAY_STEP_MS: u64 = 250;
const DELAY_CAP_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Players,
    MinDelayMs,
    MaxDelayMs,
}

const MENU_ITEMS: [MenuItem; 3] = [MenuItem::Players, MenuItem::MinDelayMs, MenuItem::MaxDelayMs];

impl MenuItem {
    fn display(self, app: &AppState) -> String {
        match self {
            MenuItem::Players => format!("Players: {}", app.config.players),
            MenuItem::MinDelayMs => format!("CPU Min Delay (ms): {}", app.config.min_delay_ms),
            MenuItem::MaxDelayMs => format!("CPU Max Delay (ms): {}", app.config.max_delay_ms),
        }
    }

    fn inc(self, app: &mut AppState) {
        let cfg = &mut app.config;
        match self {
            MenuItem::Players => {
                if cfg.players < MAX_PLAYERS {
                    cfg.players += 1;
                }
            }
            MenuItem::MinDelayMs => {
                cfg.min_delay_ms = (cfg.min_delay_ms + DELAY_STEP_MS).min(DELAY_CAP_MS);
                if cfg.max_delay_ms < cfg.min_delay_ms {
                    cfg.max_delay_ms = cfg.min_delay_ms;
                }
            }
            MenuItem::MaxDelayMs => {
                cfg.max_delay_ms = (cfg.max_delay_ms + DELAY_STEP_MS).min(DELAY_CAP_MS);
            }
        }
    }

    fn dec(self, app: &mut AppState) {
        let cfg = &mut app.config;
        match self {
            MenuItem::Players => {
                if cfg.players > MIN_PLAYERS {
                    cfg.players -= 1;
                }
            }
            MenuItem::MinDelayMs => {
                cfg.min_delay_ms = cfg.min_delay_ms.saturating_sub(DELAY_STEP_MS);
            }
            MenuItem::MaxDelayMs => {
                cfg.max_delay_ms = cfg.max_delay_ms.saturating_sub(DELAY_STEP_MS);
                if cfg.min_delay_ms > cfg.max_delay_ms {
                    cfg.min_delay_ms = cfg.max_delay_ms;
                }
            }
        }
    }
}

impl AppState {
    pub fn menu_items_display(&self) -> Vec<String> {
        MENU_ITEMS.iter().map(|item| item.display(self)).collect()
    }

    pub fn open_menu(&mut self) {
        self.close_help();
        self.menu_index = 0;
        self.scene = Scene::Menu;
    }

    /// Deal with the edited settings. Returns whether the table opened.
    pub fn apply_menu(&mut self) -> bool {
        self.config.players = self.config.players.clamp(MIN_PLAYERS, MAX_PLAYERS);
        self.start_table()
    }

    pub fn menu_next(&mut self) {
        self.menu_index = (self.menu_index + 1) % MENU_ITEMS.len();
    }
    pub fn menu_prev(&mut self) {
        self.menu_index = (self.menu_index + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
    }
    pub fn menu_inc(&mut self) {
        let item = MENU_ITEMS[self.menu_index % MENU_ITEMS.len()];
        item.inc(self);
    }
    pub fn menu_dec(&mut self) {
        let item = MENU_ITEMS[self.menu_index % MENU_ITEMS.len()];
        item.dec(self);
    }
}
