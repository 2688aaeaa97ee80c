//! cardseer - command-line card lookup
//!
//! Resolves one or more queries through the full lookup pipeline and
//! prints the selected cards.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use cardseer::{Card, CardLookup, Config, LookupError};

/// Cardseer card lookup
#[derive(Parser)]
#[command(name = "cardseer")]
#[command(version)]
#[command(about = "Find a Pokémon TCG card by name and numbering")]
struct Args {
    /// Queries such as "Pikachu (58/102)"; each argument is one query
    #[arg(required = true)]
    queries: Vec<String>,

    /// Path to configuration file
    #[arg(short, long, env = "CARDSEER_CONFIG")]
    config: Option<PathBuf>,

    /// Caller id the rate limit is applied to
    #[arg(long, default_value_t = 0)]
    caller: i64,

    /// Print the selected cards as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let lookup = match Config::load(args.config.as_deref()).and_then(|c| c.into_builder().build())
    {
        Ok(lookup) => lookup,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(queries = args.queries.len(), "cardseer starting");

    let mut failed = false;
    for query in &args.queries {
        match lookup.lookup_query(args.caller, query).await {
            Ok(card) if args.json => match serde_json::to_string_pretty(card.as_ref()) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("error: {e}");
                    failed = true;
                }
            },
            Ok(card) => print_card(&card),
            Err(e) => {
                report(query, &e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_card(card: &Card) {
    let (set_name, total) = card.set.as_ref().map_or_else(
        || ("Unknown".to_string(), "?".to_string()),
        |s| (s.name.clone(), s.printed_total_label()),
    );
    println!("{} ({}/{})", card.name, card.number, total);
    println!("  Set:    {set_name}");
    println!("  Rarity: {}", card.rarity.as_deref().unwrap_or("Unknown"));
    if !card.types.is_empty() {
        println!("  Types:  {}", card.types.join(", "));
    }
    if let Some(url) = card.best_image() {
        println!("  Image:  {url}");
    }
    for ability in &card.abilities {
        println!("  Ability: {}", ability.name);
        if !ability.text.is_empty() {
            println!("    {}", ability.text);
        }
    }
    for attack in &card.attacks {
        let cost = if attack.cost.is_empty() {
            "N/A".to_string()
        } else {
            attack.cost.join(", ")
        };
        let mut line = format!("  Attack: {} | Cost: {cost}", attack.name);
        if !attack.damage.is_empty() {
            line.push_str(&format!(" | Damage: {}", attack.damage));
        }
        println!("{line}");
        if !attack.text.is_empty() {
            println!("    {}", attack.text);
        }
    }
}

fn report(query: &str, err: &LookupError) {
    eprintln!("{query}: {err}");
    if err.is_retryable() {
        eprintln!("  (temporary, try again shortly)");
    }
}
