mod events;
mod menu;
mod state;

pub use events::{ChannelObserver, TableEvent};
pub use state::{AppState, InputAction, Scene};
