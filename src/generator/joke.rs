use async_trait::async_trait;
use log::{ error, warn };
use std::sync::Arc;

use super::{ pick, ContentGenerator, GenerationError };
use crate::llm::chat::ChatClient;
use crate::models::{ ContentKind, GeneratedPayload };

pub static FALLBACK_JOKES: [&str; 5] = [
    "Why don't scientists trust atoms? Because they make up everything!",
    "Did you hear about the mathematician who's afraid of negative numbers? He'll stop at nothing to avoid them.",
    "Why don't skeletons fight each other? They don't have the guts.",
    "I'm reading a book about anti-gravity. It's impossible to put down!",
    "Why did the scarecrow win an award? Because he was outstanding in his field!",
];

pub const JOKE_TITLE: &str = "New Joke";
pub const PROMPT: &str = "Generate a funny yet dark joke.";
pub const TEMPERATURE: f32 = 0.9;
pub const MAX_TOKENS: u32 = 100;

/// Replies shorter than this are treated as a failed generation.
const MIN_JOKE_LEN: usize = 10;

pub struct JokeGenerator {
    client: Option<Arc<dyn ChatClient>>,
}

impl JokeGenerator {
    pub fn new(client: Option<Arc<dyn ChatClient>>) -> Self {
        Self { client }
    }

    fn fallback() -> GeneratedPayload {
        payload(pick(&FALLBACK_JOKES).to_string())
    }
}

fn payload(text: String) -> GeneratedPayload {
    GeneratedPayload {
        title: JOKE_TITLE.to_string(),
        body: text,
        image_url: None,
    }
}

#[async_trait]
impl ContentGenerator for JokeGenerator {
    fn kind(&self) -> ContentKind {
        ContentKind::Joke
    }

    async fn generate(&self) -> Result<GeneratedPayload, GenerationError> {
        let Some(client) = &self.client else {
            return Ok(Self::fallback());
        };

        match client.complete(PROMPT).await {
            Ok(resp) => {
                let text = resp.response.trim();
                if text.chars().count() < MIN_JOKE_LEN {
                    warn!("Joke reply too short ({:?}), using fallback", text);
                    return Ok(Self::fallback());
                }
                Ok(payload(text.to_string()))
            }
            Err(e) => {
                error!("Error generating joke: {}", e);
                Ok(Self::fallback())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::CompletionResponse;
    use std::error::Error as StdError;

    struct CannedClient(Result<String, String>);

    #[async_trait]
    impl ChatClient for CannedClient {
        async fn complete(
            &self,
            _prompt: &str
        ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
            match &self.0 {
                Ok(text) => Ok(CompletionResponse { response: text.clone() }),
                Err(e) => Err(e.clone().into()),
            }
        }

        fn get_model(&self) -> String {
            "canned".into()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    fn with_reply(reply: Result<&str, &str>) -> JokeGenerator {
        let reply = reply.map(str::to_string).map_err(str::to_string);
        JokeGenerator::new(Some(Arc::new(CannedClient(reply))))
    }

    #[tokio::test]
    async fn no_client_serves_fallback() {
        let joke = JokeGenerator::new(None).generate().await.unwrap();
        assert!(FALLBACK_JOKES.contains(&joke.body.as_str()));
        assert_eq!(joke.title, JOKE_TITLE);
        assert_eq!(joke.image_url, None);
    }

    #[tokio::test]
    async fn uses_trimmed_model_reply() {
        let joke = with_reply(Ok("  I told my plant a joke. It died laughing.\n"))
            .generate().await
            .unwrap();
        assert_eq!(joke.body, "I told my plant a joke. It died laughing.");
    }

    #[tokio::test]
    async fn short_or_empty_reply_falls_back() {
        for reply in ["", "   ", "lol"] {
            let joke = with_reply(Ok(reply)).generate().await.unwrap();
            assert!(FALLBACK_JOKES.contains(&joke.body.as_str()), "reply {:?}", reply);
        }
    }

    #[tokio::test]
    async fn transport_error_falls_back() {
        let joke = with_reply(Err("connection refused")).generate().await.unwrap();
        assert!(FALLBACK_JOKES.contains(&joke.body.as_str()));
    }
}
