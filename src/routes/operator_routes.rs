use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::{debug, info};

use scdtr_link::core::constants::EMPTY_SELECTION;

use crate::routes::dispatch::Event;

pub const HELP: &str = "\
commands:
  catalog                         list command templates
  send <n> <luminaire|-> <arg|->  encode template #n and send it
  connect | disconnect            open or close the command link
  forward on|off                  forward samples to the plotting tool
  messages on|off                 show or hide plain lines
  signals                         list recorded signals
  quit                            flush CSV files and exit";

/// What the operator asked for on one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorAction {
    Help,
    Catalog,
    Send {
        template: usize,
        luminaire: String,
        extra: String,
    },
    Connect,
    Disconnect,
    Forward(bool),
    Messages(bool),
    Signals,
    Quit,
}

/// `-` or a missing field stands for the empty selection.
fn selection(field: Option<&str>) -> String {
    match field {
        None | Some("-") => EMPTY_SELECTION.to_string(),
        Some(value) => value.to_string(),
    }
}

fn switch(field: Option<&str>) -> Result<bool, String> {
    match field {
        Some("on") => Ok(true),
        Some("off") => Ok(false),
        _ => Err("expected 'on' or 'off'".to_string()),
    }
}

pub fn parse(line: &str) -> Result<Option<OperatorAction>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let action = match verb {
        "help" | "?" => OperatorAction::Help,
        "catalog" => OperatorAction::Catalog,
        "send" => {
            let template = words
                .next()
                .ok_or("send needs a template number")?
                .parse::<usize>()
                .map_err(|e| format!("bad template number: {e}"))?;
            OperatorAction::Send {
                template,
                luminaire: selection(words.next()),
                extra: selection(words.next()),
            }
        }
        "connect" => OperatorAction::Connect,
        "disconnect" => OperatorAction::Disconnect,
        "forward" => OperatorAction::Forward(switch(words.next())?),
        "messages" => OperatorAction::Messages(switch(words.next())?),
        "signals" => OperatorAction::Signals,
        "quit" | "exit" => OperatorAction::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };

    Ok(Some(action))
}

/// Forwards stdin lines to the dispatch queue until stdin closes.
///
/// Runs on its own thread: a blocking read must not hold up runtime shutdown.
pub fn spawn_operator_input(events: mpsc::Sender<Event>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("operator-input".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if events.blocking_send(Event::Operator(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        debug!("Operator input error: {}", e);
                        return;
                    }
                }
            }
            info!("Operator input closed, Ctrl-C to exit");
        })?;
    Ok(())
}
