use async_trait::async_trait;
use chrono::Utc;
use log::{ debug, error, warn };
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use super::{ pick, ContentGenerator, GenerationError };
use crate::llm::chat::ChatClient;
use crate::models::{ ContentKind, GeneratedPayload };

pub struct FallbackDish {
    pub title: &'static str,
    pub description: &'static str,
    pub image_url: &'static str,
}

pub static FALLBACK_DISHES: [FallbackDish; 3] = [
    FallbackDish {
        title: "Spaghetti Carbonara",
        description: "Creamy pasta with crispy pancetta, eggs, and pecorino cheese.",
        image_url: "https://source.unsplash.com/random/600x400/?spaghetti,carbonara",
    },
    FallbackDish {
        title: "Chocolate Lava Cake",
        description: "Warm chocolate cake with a gooey, molten center, served with vanilla ice cream.",
        image_url: "https://source.unsplash.com/random/600x400/?chocolate,lava,cake",
    },
    FallbackDish {
        title: "Margherita Pizza",
        description: "Classic pizza with tomato sauce, fresh mozzarella, and basil leaves.",
        image_url: "https://source.unsplash.com/random/600x400/?pizza,margherita",
    },
];

pub static CUISINES: [&str; 10] = [
    "Italian",
    "Mexican",
    "Japanese",
    "Indian",
    "Thai",
    "French",
    "Mediterranean",
    "Chinese",
    "American",
    "Greek",
];

pub static MEAL_TYPES: [&str; 6] = [
    "appetizer",
    "main course",
    "dessert",
    "salad",
    "soup",
    "side dish",
];

pub const TEMPERATURE: f32 = 1.2;
pub const MAX_TOKENS: u32 = 1024;

const IMAGE_SEARCH_BASE: &str = "https://source.unsplash.com/random/600x400/";
const DESCRIPTION_KEYWORDS: usize = 5;

#[derive(Deserialize, Debug)]
struct DishReply {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "imagePrompt")]
    image_prompt: Option<String>,
}

pub struct DishGenerator {
    client: Option<Arc<dyn ChatClient>>,
}

impl DishGenerator {
    pub fn new(client: Option<Arc<dyn ChatClient>>) -> Self {
        Self { client }
    }

    fn fallback() -> GeneratedPayload {
        let dish = pick(&FALLBACK_DISHES);
        GeneratedPayload {
            title: dish.title.to_string(),
            body: dish.description.to_string(),
            image_url: Some(dish.image_url.to_string()),
        }
    }
}

pub fn build_prompt(cuisine: &str, meal_type: &str) -> String {
    format!(
        r#"Generate a unique and creative {cuisine} {meal_type} dish.
Be very specific with ingredients and preparation.
Include at least 3 specific ingredients and a unique cooking method.
Format your response as valid JSON with these exact field names:
{{
  "title": "Creative dish name (be specific and descriptive)",
  "description": "Detailed description including key ingredients and preparation method. Make it sound delicious and unique.",
  "imagePrompt": "A short description of how the dish should look"
}}"#
    )
}

fn random_prompt() -> String {
    build_prompt(*pick(&CUISINES), *pick(&MEAL_TYPES))
}

/// Removes a surrounding markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Returns `(title, description)` when the reply is usable.
fn parse_reply(text: &str) -> Option<(String, String)> {
    let reply: DishReply = match serde_json::from_str(strip_code_fence(text)) {
        Ok(reply) => reply,
        Err(e) => {
            error!("Failed to parse dish data: {}", e);
            debug!("Raw response: {}", text);
            return None;
        }
    };
    debug!("Dish image prompt: {:?}", reply.image_prompt);
    let title = reply.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    let description = reply.description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
    match (title, description) {
        (Some(title), Some(description)) => Some((title, description)),
        _ => {
            warn!("Invalid dish data format: title or description missing");
            None
        }
    }
}

/// Randomized image-search URL for a dish. The trailing timestamp keeps the
/// search service from handing back the same cached picture.
pub fn image_url_for(title: &str, description: &str, timestamp_ms: i64) -> String {
    let description = description.to_lowercase();
    let keywords = std::iter
        ::once(title.to_lowercase())
        .chain(description.split(' ').take(DESCRIPTION_KEYWORDS).map(str::to_string))
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(",");

    match Url::parse(IMAGE_SEARCH_BASE) {
        Ok(mut url) => {
            url.set_query(Some(&format!("{},food,{}", keywords, timestamp_ms)));
            url.to_string()
        }
        Err(e) => {
            error!("Error generating image URL: {}", e);
            format!("{}?food,{}", IMAGE_SEARCH_BASE, timestamp_ms)
        }
    }
}

#[async_trait]
impl ContentGenerator for DishGenerator {
    fn kind(&self) -> ContentKind {
        ContentKind::Dish
    }

    async fn generate(&self) -> Result<GeneratedPayload, GenerationError> {
        let Some(client) = &self.client else {
            return Ok(Self::fallback());
        };

        let prompt = random_prompt();
        let text = match client.complete(&prompt).await {
            Ok(resp) => resp.response,
            Err(e) => {
                error!("Error generating dish: {}", e);
                return Ok(Self::fallback());
            }
        };

        let Some((title, description)) = parse_reply(&text) else {
            return Ok(Self::fallback());
        };
        let image_url = image_url_for(&title, &description, Utc::now().timestamp_millis());

        Ok(GeneratedPayload {
            title,
            body: description,
            image_url: Some(image_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::ollama::OllamaClient;
    use crate::llm::{ LlmConfig, LlmType };
    use wiremock::matchers::{ method, path };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    fn is_fallback(payload: &GeneratedPayload) -> bool {
        FALLBACK_DISHES.iter().any(|d| {
            d.title == payload.title && payload.image_url.as_deref() == Some(d.image_url)
        })
    }

    async fn generator_replying(reply: &str) -> (MockServer, DishGenerator) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": reply }))
            )
            .mount(&server).await;
        let config = LlmConfig {
            llm_type: LlmType::Ollama,
            base_url: Some(server.uri()),
            ..LlmConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        (server, DishGenerator::new(Some(Arc::new(client))))
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn prompt_names_cuisine_and_meal() {
        let prompt = build_prompt("Thai", "soup");
        assert!(prompt.starts_with("Generate a unique and creative Thai soup dish."));
        assert!(prompt.contains("\"imagePrompt\""));
    }

    #[test]
    fn image_url_uses_title_and_first_five_words() {
        let url = image_url_for(
            "Sesame Tofu",
            "Crispy tofu with ginger glaze and scallions",
            123
        );
        assert!(url.starts_with(IMAGE_SEARCH_BASE));
        assert!(url.ends_with("?sesame%20tofu,crispy,tofu,with,ginger,glaze,food,123"), "{}", url);
    }

    #[test]
    fn image_url_keeps_food_tag_after_hash_in_title() {
        let url = Url::parse(&image_url_for("Pad Thai #5", "Noodles with peanuts", 42)).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.query(), Some("pad%20thai%20%235,noodles,with,peanuts,food,42"));
    }

    #[test]
    fn random_prompt_uses_known_cuisine_and_meal() {
        let prompt = random_prompt();
        assert!(CUISINES.iter().any(|c| prompt.contains(c)), "{}", prompt);
        assert!(MEAL_TYPES.iter().any(|m| prompt.contains(m)), "{}", prompt);
    }

    #[test]
    fn image_url_skips_empty_words() {
        let url = image_url_for("Soup", "  hot", 7);
        assert!(url.ends_with("?soup,hot,food,7"), "{}", url);
    }

    #[tokio::test]
    async fn no_client_serves_fallback() {
        let dish = DishGenerator::new(None).generate().await.unwrap();
        assert!(is_fallback(&dish));
    }

    #[tokio::test]
    async fn parses_fenced_reply() {
        let reply =
            "```json\n{\"title\":\"Miso Ramen\",\"description\":\"Rich miso broth with noodles\",\"imagePrompt\":\"steaming bowl\"}\n```";
        let (_server, generator) = generator_replying(reply).await;
        let dish = generator.generate().await.unwrap();
        assert_eq!(dish.title, "Miso Ramen");
        assert_eq!(dish.body, "Rich miso broth with noodles");
        let url = dish.image_url.unwrap();
        assert!(url.contains("miso%20ramen,rich,miso,broth,with,noodles,food,"), "{}", url);
    }

    #[tokio::test]
    async fn missing_description_falls_back() {
        let (_server, generator) = generator_replying("{\"title\":\"Mystery\"}").await;
        assert!(is_fallback(&generator.generate().await.unwrap()));
    }

    #[tokio::test]
    async fn malformed_json_falls_back() {
        let (_server, generator) = generator_replying("Here is a dish: tacos!").await;
        assert!(is_fallback(&generator.generate().await.unwrap()));
    }

    #[tokio::test]
    async fn unreachable_model_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server).await;
        let config = LlmConfig {
            llm_type: LlmType::Ollama,
            base_url: Some(server.uri()),
            ..LlmConfig::default()
        };
        let client = OllamaClient::from_config(&config).unwrap();
        let dish = DishGenerator::new(Some(Arc::new(client))).generate().await.unwrap();
        assert!(is_fallback(&dish));
    }
}
