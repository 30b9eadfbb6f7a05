//! Terminal front-end: a menu scene to configure the table and a table scene
//! to play it, drawn with ratatui over crossterm.

pub mod app;
pub mod controller;
pub mod ui;
