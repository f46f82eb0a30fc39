//! Lists recent meetings, their summaries, and the current rate limit.
//!
//! Run with: `FATHOM_API_KEY=... cargo run --example list_meetings`

use fathom::{Client, Config, QueryParams};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("fathom=debug")
        .init();

    let config = Config {
        debug: true,
        ..Config::from_env()?
    };
    let client = Client::new(config)?;

    let mut params = QueryParams::new();
    params.insert("include_summary".to_string(), "true".to_string());

    let meetings = client.meetings().list(&params).await?;
    println!("Found {} meetings", meetings.len());

    for meeting in &meetings {
        println!(
            "- {} ({} participants, {} action items)",
            meeting.get_str("title").unwrap_or("untitled"),
            meeting.participants().len(),
            meeting.action_items().len()
        );
        if let Some(summary) = meeting.summary() {
            println!("  summary: {}", summary);
        }
    }

    for team in client.teams().list(&QueryParams::new()).await? {
        let members = team.members(&QueryParams::new()).await?;
        println!(
            "Team {}: {} members",
            team.name().unwrap_or("?"),
            members.len()
        );
    }

    let rate_limit = client.rate_limit();
    println!(
        "Rate limit: {:?}/{:?}, resets in {:?}s",
        rate_limit.remaining, rate_limit.limit, rate_limit.reset
    );

    Ok(())
}
