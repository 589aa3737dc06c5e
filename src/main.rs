use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use webrag::core::config::RagConfig;
use webrag::core::logging;
use webrag::llm::GeminiProvider;
use webrag::pipeline::PipelineOrchestrator;
use webrag::search::DuckDuckGoSearch;
use webrag::session::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init(None);

    let api_key = env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")?;

    let config = RagConfig::default();
    config.validate()?;

    let llm = Arc::new(GeminiProvider::new(api_key));
    let orchestrator =
        PipelineOrchestrator::new(config.clone(), Arc::new(DuckDuckGoSearch::new()), llm);
    let mut store = SessionStore::new(config.memory.clone());

    println!("webrag — ask a question, /quit to exit");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query == "/quit" {
            break;
        }

        match orchestrator.answer_current(query, &mut store).await {
            Ok(answer) => println!("\n{answer}\n"),
            Err(err) => {
                tracing::error!("Query failed: {}", err);
                eprintln!("Sorry, something went wrong while generating the answer.");
            }
        }
    }

    Ok(())
}
