use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reqwest::Url;

use edgeprobe::{
    os_sources, Config, ConnectionString, FetchUrl, GetTwin, HttpHubClient, LogWriter, Operation,
    Probe, SendEvent, Subscribe, DEFAULT_URL,
};

#[derive(Parser, Debug)]
#[command(name = "edgeprobe", version, about = "Long-running edge connectivity probes")]
struct Cli {
    /// Seconds between runs
    #[arg(long, global = true, env = "EDGEPROBE_INTERVAL_SECS", default_value_t = 60)]
    interval_secs: u64,

    /// Seconds to wait for cleanup after a termination request
    #[arg(long, global = true, env = "EDGEPROBE_GRACE_SECS", default_value_t = 60)]
    grace_secs: u64,

    /// Per-run timeout in seconds (0 = none)
    #[arg(long, global = true, env = "EDGEPROBE_TIMEOUT_SECS", default_value_t = 0)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print the twin of a device or module
    GetTwin(HubArgs),
    /// GET a URL and print the body
    FetchUrl {
        #[arg(long, default_value = DEFAULT_URL)]
        url: Url,
    },
    /// Send a "Hello world!" event
    SendEvent(HubArgs),
}

#[derive(Args, Debug)]
struct HubArgs {
    /// Device or module connection string
    #[arg(long, env = "EDGEPROBE_CONNECTION_STRING", hide_env_values = true)]
    connection_string: String,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::GetTwin(_) => "get-twin",
            Command::FetchUrl { .. } => "fetch-url",
            Command::SendEvent(_) => "send-event",
        }
    }
}

impl HubArgs {
    fn client(&self) -> anyhow::Result<Arc<HttpHubClient>> {
        let cs = ConnectionString::parse(&self.connection_string)
            .context("invalid connection string")?;
        Ok(Arc::new(HttpHubClient::from_connection_string(&cs)?))
    }
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            interval: Duration::from_secs(self.interval_secs),
            grace: Duration::from_secs(self.grace_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            ..Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let probe = Probe::new(cli.command.name(), cli.config(), subs);
    let bus = probe.bus().clone();

    let op: Arc<dyn Operation> = match &cli.command {
        Command::GetTwin(hub) => Arc::new(GetTwin::new(hub.client()?, bus)),
        Command::FetchUrl { url } => Arc::new(FetchUrl::new(url.clone(), bus)?),
        Command::SendEvent(hub) => Arc::new(SendEvent::new(hub.client()?, bus)),
    };

    probe.run(op, os_sources()?).await?;
    Ok(())
}
