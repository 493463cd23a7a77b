use crate::use_cases::GameEvent;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct AppState {
    // Every connection's intents and lifecycle events flow into the single world task.
    pub input_tx: mpsc::Sender<GameEvent>,
}
