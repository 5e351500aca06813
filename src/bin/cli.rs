use bytes::Bytes;
use clap::{Parser, Subcommand};
use redsock::{Client, DEFAULT_HOST, DEFAULT_PORT};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = RedsockCli::parse();
    let client = Client::connect(&cli.host, cli.port, cli.timeout).await?;

    one_shot_command(client, cli.command).await
}

async fn one_shot_command(mut client: Client, subcommand: RedsockSubcommand) -> anyhow::Result<()> {
    match subcommand {
        RedsockSubcommand::Ping => match client.ping().await? {
            Some(response) => println!("{}", String::from_utf8_lossy(response.as_ref())),
            None => println!("{}", failure(&client)),
        },
        RedsockSubcommand::Get { key } => match client.get(&key).await? {
            Some(value) => println!("{}", String::from_utf8_lossy(value.as_ref())),
            None => println!("(nil)"),
        },
        RedsockSubcommand::Set { key, value } => {
            if client.set(&key, Bytes::from(value)).await? {
                println!("OK");
            } else {
                println!("{}", failure(&client));
            }
        }
    };

    Ok(())
}

fn failure(client: &Client) -> String {
    match client.last_error() {
        Some(err) => format!("(false) {err}"),
        None => "(false)".to_string(),
    }
}

#[derive(Debug, Parser)]
#[command(name = "redsock-cli", version, author)]
/// A minimal Redis client
struct RedsockCli {
    #[clap(subcommand)]
    command: RedsockSubcommand,
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,
    /// `0` selects the default port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Timeout in seconds, `0` waits forever.
    #[arg(long, default_value_t = 0.0)]
    timeout: f64,
}

#[derive(Debug, Subcommand)]
/// Command to send to the server.
enum RedsockSubcommand {
    /// Ping the server.
    Ping,
    /// Get the value of key.
    Get {
        /// Name of key to get.
        key: String,
    },
    /// Set key to hold the string value.
    Set {
        /// Name of the key to set.
        key: String,
        /// Value to set, without spaces.
        value: String,
    },
}
