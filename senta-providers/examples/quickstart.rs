//! Quickstart: run the sentiment agent against an OpenAI-compatible endpoint
//!
//! Requires OPENAI_API_KEY (and optionally OPENAI_BASE_URL) to be set.

use futures::StreamExt;
use senta_core::prelude::*;
use senta_providers::openai::OpenAI;
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let provider = match OpenAI::from_env() {
        Ok(p) => p,
        Err(_) => {
            eprintln!("Please set OPENAI_API_KEY to run this example.");
            return Ok(());
        }
    };

    let agent = SentimentAgent::builder(provider)
        .model(std::env::var("SENTA_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()))
        .build();

    // 1. Non-streaming predict
    let conversation = vec![Message::user("I love this!")];
    let response = agent.predict(&conversation, None, None).await?;
    println!("predict: {} (id {})", response.content(), response.id().unwrap_or("-"));

    // 2. Streaming predict
    let conversation = vec![Message::user("terrible service")];
    let mut stream = agent.predict_stream(&conversation, None, None).await?;

    print!("predict_stream: ");
    std::io::stdout().flush()?;

    let mut last = String::new();
    while let Some(envelope) = stream.next().await {
        match envelope {
            Ok(resp) => {
                // Each envelope carries the full accumulated content;
                // print only the newly appended suffix.
                let content = resp.content();
                print!("{}", &content[last.len()..]);
                std::io::stdout().flush()?;
                last = content.to_string();
            }
            Err(e) => eprintln!("\nError: {}", e),
        }
    }
    println!();

    Ok(())
}
