use super::ui;
use crate::core::config::Theme;
use crate::core::{Controller, CurrencyPair, RateFetcher, UserAction};
use anyhow::{Context, Result, anyhow, bail};
use console::Term;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// A line of user input in the interactive converter.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Action(UserAction),
    /// Set the amount and convert it right away.
    Amount(String),
    ToggleTheme,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    let Some(first) = line.chars().next() else {
        return Ok(None);
    };
    if first.is_ascii_digit() || first == '.' || first == ',' {
        return Ok(Some(Command::Amount(line.to_string())));
    }

    let mut parts = line.split_whitespace();
    let keyword = parts.next().unwrap_or_default().to_lowercase();
    let argument = parts.next();
    let command = match (keyword.as_str(), argument) {
        ("from", Some(code)) => Command::Action(UserAction::SelectSource(code.parse()?)),
        ("to", Some(code)) => Command::Action(UserAction::SelectDestination(code.parse()?)),
        ("from" | "to", None) => bail!("Usage: {} <currency>", keyword),
        ("convert", _) => Command::Action(UserAction::Convert),
        ("theme", _) => Command::ToggleTheme,
        ("quit" | "exit" | "q", _) => Command::Quit,
        _ => return Err(anyhow!("Unknown command: {}", line)),
    };
    Ok(Some(command))
}

struct View {
    term: Term,
    theme: Theme,
    notice: Option<String>,
}

impl View {
    fn redraw(&self, controller: &Controller) -> Result<()> {
        self.term.clear_screen()?;
        self.term.write_line(&ui::render_panel(
            controller.state(),
            self.theme,
            self.notice.as_deref(),
        ))?;
        self.term.write_str("> ")?;
        self.term.flush()?;
        Ok(())
    }
}

fn apply_command(controller: &mut Controller, view: &mut View, command: Command) -> Result<()> {
    match command {
        Command::Action(action) => {
            controller.handle_action(action)?;
        }
        Command::Amount(text) => {
            controller.handle_action(UserAction::EditAmount(text))?;
            controller.handle_action(UserAction::Convert)?;
        }
        Command::ToggleTheme => view.theme = view.theme.toggle(),
        Command::Quit => {}
    }
    Ok(())
}

/// Runs the interactive converter until `quit` or end of input.
pub async fn run(
    fetcher: Arc<dyn RateFetcher>,
    pair: CurrencyPair,
    interval: Duration,
    theme: Theme,
) -> Result<()> {
    let mut controller = Controller::new(fetcher, pair, interval);
    let mut view = View {
        term: Term::stdout(),
        theme,
        notice: None,
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    controller.activate();
    view.redraw(&controller)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    debug!("Input closed");
                    break;
                };
                view.notice = None;
                match parse_command(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = apply_command(&mut controller, &mut view, command) {
                            view.notice = Some(e.to_string());
                        }
                    }
                    Ok(None) => {}
                    Err(e) => view.notice = Some(e.to_string()),
                }
                view.redraw(&controller)?;
            }
            event = controller.next_event() => {
                let Some(event) = event else { break };
                if controller.handle_event(event) {
                    view.redraw(&controller)?;
                }
            }
        }
    }

    controller.deactivate();
    info!("Converter closed");
    Ok(())
}
