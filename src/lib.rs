pub mod cli;
pub mod controller;
pub mod generator;
pub mod history;
pub mod llm;
pub mod models;
pub mod render;
pub mod repl;
pub mod server;

use cli::Args;
use controller::ViewController;
use generator::Generators;
use history::initialize_history_store;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Mode: {}", args.mode);
    info!("Server Address: {}", args.server_addr);
    info!("History Store Type: {}", args.store_type);
    info!("History Store Dir: {}", args.store_dir);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Joke Model: {}", args.joke_model);
    info!("Dish Model: {}", args.dish_model);
    info!("-------------------------");

    let store = initialize_history_store(&args)?;
    let generators = Generators::from_args(&args)?;
    let controller = Arc::new(ViewController::new(generators, store));

    match args.mode.to_lowercase().as_str() {
        "server" => {
            let server = Server::new(args.server_addr.clone(), controller);
            server.run().await?;
        }
        "repl" => repl::run_repl(controller).await?,
        other => {
            return Err(format!("Unsupported mode: {}", other).into());
        }
    }

    Ok(())
}
