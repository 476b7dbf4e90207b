pub mod dish;
pub mod joke;

use async_trait::async_trait;
use log::{ info, warn };
use rand::Rng;
use std::error::Error;
use std::sync::Arc;
use thiserror::Error as ThisError;

use crate::cli::Args;
use crate::llm::chat::{ new_client, ChatClient };
use crate::llm::LlmConfig;
use crate::models::{ ContentKind, GeneratedPayload };

pub use self::dish::DishGenerator;
pub use self::joke::JokeGenerator;

#[derive(Debug, ThisError)]
pub enum GenerationError {
    #[error("{kind} generation failed: {message}")]
    Failed {
        kind: ContentKind,
        message: String,
    },
}

/// Produces one piece of content of a fixed kind.
///
/// Implementations recover from their own failures with a fallback
/// payload; an `Err` means something outside the generator broke.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn kind(&self) -> ContentKind;

    async fn generate(&self) -> Result<GeneratedPayload, GenerationError>;
}

#[derive(Clone)]
pub struct Generators {
    joke: Arc<dyn ContentGenerator>,
    dish: Arc<dyn ContentGenerator>,
}

impl Generators {
    pub fn new(joke: Arc<dyn ContentGenerator>, dish: Arc<dyn ContentGenerator>) -> Self {
        Self { joke, dish }
    }

    /// Generators that never call out and always serve the fallback tables.
    pub fn offline() -> Self {
        Self::new(Arc::new(JokeGenerator::new(None)), Arc::new(DishGenerator::new(None)))
    }

    pub fn for_kind(&self, kind: ContentKind) -> &Arc<dyn ContentGenerator> {
        match kind {
            ContentKind::Joke => &self.joke,
            ContentKind::Dish => &self.dish,
        }
    }

    pub fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let (joke_config, dish_config) = llm_configs(args)?;
        let joke_client = client_or_fallback(&joke_config, ContentKind::Joke)?;
        let dish_client = client_or_fallback(&dish_config, ContentKind::Dish)?;

        Ok(
            Self::new(
                Arc::new(JokeGenerator::new(joke_client)),
                Arc::new(DishGenerator::new(dish_client))
            )
        )
    }
}

/// Per-kind provider settings: shared provider and key, own model and sampling.
fn llm_configs(args: &Args) -> Result<(LlmConfig, LlmConfig), Box<dyn Error + Send + Sync>> {
    let llm_type = args.chat_llm_type
        .parse()
        .map_err(|e| format!("Invalid chat LLM type: {}", e))?;
    let api_key = Some(args.chat_api_key.clone()).filter(|k| !k.is_empty());

    let joke_config = LlmConfig {
        llm_type,
        api_key,
        completion_model: Some(args.joke_model.clone()),
        base_url: args.chat_base_url.clone(),
        max_tokens: Some(joke::MAX_TOKENS),
        temperature: Some(joke::TEMPERATURE),
    };
    let dish_config = LlmConfig {
        completion_model: Some(args.dish_model.clone()),
        max_tokens: Some(dish::MAX_TOKENS),
        temperature: Some(dish::TEMPERATURE),
        ..joke_config.clone()
    };
    Ok((joke_config, dish_config))
}

fn client_or_fallback(
    config: &LlmConfig,
    kind: ContentKind
) -> Result<Option<Arc<dyn ChatClient>>, Box<dyn Error + Send + Sync>> {
    if !config.has_credential() {
        warn!("No {} API key provided. Using fallback {}.", config.llm_type, kind.plural().to_lowercase());
        return Ok(None);
    }
    let client = new_client(config)?;
    info!(
        "{} client configured: Type={}, Model={}, BaseURL={:?}",
        kind.label(),
        config.llm_type,
        client.get_model(),
        client.get_base_url().as_deref().unwrap_or("adapter default")
    );
    Ok(Some(client))
}

/// Uniform pick from a non-empty table.
pub(crate) fn pick<T>(table: &[T]) -> &T {
    let index = rand::thread_rng().gen_range(0..table.len());
    &table[index]
}
