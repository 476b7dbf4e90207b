use log::{ error, info };
use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{ AsyncBufReadExt, BufReader };

use crate::controller::{ ControllerError, ViewController };
use crate::models::ContentKind;
use crate::render::{ loading_message, render_snapshot };

const HELP: &str = "\
Commands:
  joke               tell me a joke
  dish               show me something delicious
  more               another one for the current tab
  tab <joke|dish>    switch the history tab
  rate <id> <stars>  rate an item (0.5 to 5, half stars allowed)
  show               redraw the view
  help               this text
  quit               exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch to the kind's tab and generate one, like the header buttons.
    Generate(ContentKind),
    More,
    Tab(ContentKind),
    Rate {
        id: String,
        value: f64,
    },
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Command::Show);
        };
        let command = match verb.to_lowercase().as_str() {
            "joke" => Command::Generate(ContentKind::Joke),
            "dish" => Command::Generate(ContentKind::Dish),
            "more" | "again" => Command::More,
            "tab" => {
                let kind = words.next().ok_or("usage: tab <joke|dish>")?;
                Command::Tab(kind.parse().map_err(|e| format!("{}", e))?)
            }
            "rate" => {
                let id = words.next().ok_or("usage: rate <id> <stars>")?.to_string();
                let value = words
                    .next()
                    .ok_or("usage: rate <id> <stars>")?
                    .parse::<f64>()
                    .map_err(|e| format!("invalid star value: {}", e))?;
                Command::Rate { id, value }
            }
            "show" | "ls" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(format!("unknown command '{}', try 'help'", other));
            }
        };
        if words.next().is_some() {
            return Err(format!("too many arguments for '{}'", verb));
        }
        Ok(command)
    }
}

/// Applies one command and returns the text to print, or `None` to exit.
pub async fn execute(controller: &ViewController, command: Command) -> Option<String> {
    let text = match command {
        Command::Generate(kind) => {
            controller.select_tab(kind).await;
            generate(controller, kind).await
        }
        Command::More => {
            let kind = controller.snapshot().await.active_kind;
            generate(controller, kind).await
        }
        Command::Tab(kind) => {
            controller.select_tab(kind).await;
            render_snapshot(&controller.snapshot().await)
        }
        Command::Rate { id, value } =>
            match controller.rate(&id, value).await {
                Ok(()) => render_snapshot(&controller.snapshot().await),
                Err(e @ ControllerError::InvalidRating(_)) => format!("{}\n", e),
                Err(e) => {
                    error!("Rating {} failed: {}", id, e);
                    format!("Could not save rating: {}\n", e)
                }
            }
        Command::Show => render_snapshot(&controller.snapshot().await),
        Command::Help => format!("{}\n", HELP),
        Command::Quit => {
            return None;
        }
    };
    Some(text)
}

async fn generate(controller: &ViewController, kind: ContentKind) -> String {
    println!("{}", loading_message(kind));
    controller.request_generation(Some(kind)).await;
    render_snapshot(&controller.snapshot().await)
}

pub async fn run_repl(controller: Arc<ViewController>) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("Starting interactive session");
    println!("{}", HELP);
    println!();
    print!("{}", render_snapshot(&controller.snapshot().await));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match execute(&controller, command).await {
            Some(text) => print!("{}", text),
            None => {
                break;
            }
        }
    }
    Ok(())
}
