//! Stream one prompt through a DashScope application.
//!
//! Set `DASHSCOPE_API_KEY` and `DASHSCOPE_APP_ID`, then run:
//!   cargo run --example chat -- "What's on my calendar tomorrow?"

use std::io::Write;

use qianwen_provider::{Callbacks, ChatSession, ClientConfig, Qianwen};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let prompt = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let prompt = if prompt.is_empty() {
        "Say hello in one sentence.".to_string()
    } else {
        prompt
    };

    let client = Qianwen::from_config(ClientConfig::from_env()?);
    let mut session = ChatSession::new(client);

    let mut sink = Callbacks::new()
        .on_loading(|loading| {
            if loading {
                eprintln!("[waiting for response]");
            }
        })
        .on_fragment(|text| {
            print!("{text}");
            let _ = std::io::stdout().flush();
        })
        .on_complete(|result| match result {
            Ok(text) => println!("\n[{} chars]", text.chars().count()),
            Err(err) => eprintln!("\nerror: {err}"),
        });

    session.send(prompt, &mut sink).await;
    Ok(())
}
