use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Front End Args ---
    /// How to serve the view (server, repl)
    #[arg(long, env = "MODE", default_value = "server")]
    pub mode: String,

    /// Host address and port for the HTTP API to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    // --- History Store Args ---
    /// History store type (file, memory)
    #[arg(long, env = "STORE_TYPE", default_value = "file")]
    pub store_type: String,

    /// Directory holding the history blob when STORE_TYPE is file.
    #[arg(long, env = "STORE_DIR", default_value = ".content-generator")]
    pub store_dir: String,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider used for generation (gemini, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini")]
    pub chat_llm_type: String,

    /// API Key for the chat provider. Leave empty to serve fallback content only.
    #[arg(long, env = "CHAT_API_KEY", default_value = "")]
    pub chat_api_key: String,

    /// Base URL for the chat provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// Model used for jokes.
    #[arg(long, env = "JOKE_MODEL", default_value = "gemini-2.0-flash")]
    pub joke_model: String,

    /// Model used for dishes.
    #[arg(long, env = "DISH_MODEL", default_value = "gemini-1.5-flash")]
    pub dish_model: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}
