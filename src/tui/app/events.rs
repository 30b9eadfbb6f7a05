use crate::coordinator::{TableSnapshot, TurnObserver};
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};

/// Table updates forwarded from the coordinator to the render loop.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum TableEvent {
    Refresh(TableSnapshot),
    Winner(TableSnapshot),
    HumanTurn,
}

/// Observer that queues every callback on a channel drained once per tick.
#[derive(Debug)]
pub struct ChannelObserver {
    tx: Mutex<Sender<TableEvent>>,
}

impl ChannelObserver {
    pub fn pair() -> (Self, Receiver<TableEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx: Mutex::new(tx) }, rx)
    }

    // The receiver goes away with the table scene; late events are dropped.
    fn send(&self, event: TableEvent) {
        let _ = self.tx.lock().send(event);
    }
}

impl TurnObserver for ChannelObserver {
    fn on_refresh(&self, table: &TableSnapshot) {
        self.send(TableEvent::Refresh(table.clone()));
    }

    fn on_winner(&self, table: &TableSnapshot) {
        self.send(TableEvent::Winner(table.clone()));
    }

    fn on_human_turn(&self, _table: &TableSnapshot) {
        self.send(TableEvent::HumanTurn);
    }
}
