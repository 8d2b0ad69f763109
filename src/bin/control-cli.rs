use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "control-cli")]
#[command(about = "Management CLI for the control server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:50051")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show controller mode, plugins and sessions
    Status,
    /// List running sessions
    Sessions,
    /// Create a session for a partition
    Create {
        partition: String,
        /// Resource plugin to run
        #[arg(long)]
        plugin: Option<String>,
        /// Resource description passed to the plugin
        #[arg(long, default_value = "")]
        resources: String,
    },
    /// Shut down the session of a partition
    Delete { partition: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/status", cli.url)).send().await?,
        Commands::Sessions => client.get(format!("{}/sessions", cli.url)).send().await?,
        Commands::Create {
            partition,
            plugin,
            resources,
        } => {
            client
                .post(format!("{}/sessions", cli.url))
                .json(&serde_json::json!({
                    "partition": partition,
                    "plugin": plugin,
                    "resources": resources,
                }))
                .send()
                .await?
        }
        Commands::Delete { partition } => client.delete(session_url(&cli.url, &partition)?).send().await?,
    };

    print_response(res).await
}

/// Session URL with `partition` encoded as a single path segment.
fn session_url(base: &str, partition: &str) -> Result<reqwest::Url, Box<dyn std::error::Error>> {
    let mut url = reqwest::Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(["sessions", partition]);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: control server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
