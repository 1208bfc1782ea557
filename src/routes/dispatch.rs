use tokio::sync::mpsc;
use tracing::info;

use crate::state::app_state::{AppState, Armed, Flow};

/// Work items for the dispatch loop.
#[derive(Debug)]
pub enum Event {
    /// One datagram from the command socket, in receive order, tagged with
    /// the id of the link that read it.
    Datagram { link: u64, bytes: Vec<u8> },
    /// One line typed by the operator.
    Operator(String),
}

pub const EVENT_QUEUE_DEPTH: usize = 1024;

/// Waits for the next firing of a beacon, or forever when none is armed.
pub(crate) async fn next_tick(slot: &mut Option<Armed>) {
    match slot {
        Some(armed) => armed.tick().await,
        None => std::future::pending::<()>().await,
    }
}

/// Single consumer of every event source. Returns on quit or Ctrl-C.
///
/// Beacon timers live in `state`, so disarming one inside a handler means the
/// next iteration cannot fire it.
pub async fn run(state: &mut AppState, mut events: mpsc::Receiver<Event>) {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            biased;

            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
            event = events.recv() => match event {
                Some(Event::Datagram { link, bytes }) => {
                    state.handle_datagram(link, &bytes);
                }
                Some(Event::Operator(line)) => {
                    if state.handle_operator(&line) == Flow::Quit {
                        break;
                    }
                }
                None => break,
            },
            _ = next_tick(&mut state.link_beacon) => {
                if let Some(armed) = &state.link_beacon {
                    armed.emit();
                }
            }
            _ = next_tick(&mut state.forward_beacon) => {
                if let Some(armed) = &state.forward_beacon {
                    armed.emit();
                }
            }
        }
    }
}
