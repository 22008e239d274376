use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use human_panic::setup_panic;
use tracing::info;

use forms::ValidatorRegistry;
use kfp::{KfpSettings, KfpSubmitter};
use pipeform::logic::notify::SlackNotifier;
use pipeform::logic::routing::RoutingTable;
use pipeform::{AppState, router};
use shared::settings::Settings;
use slack::SlackClient;

#[derive(Parser)]
#[command(name = "pipeform", about = "Slack bot for launching Kubeflow pipeline runs")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_panic!();
    shared::env::configure_env()?;
    shared::logging::configure_logging()?;

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let registry = ValidatorRegistry::builtin();
    let routes = RoutingTable::build(&settings.forms_dir, &registry)?;

    let slack = Arc::new(SlackClient::new(settings.slack_bot_token.clone()));
    let submitter = Arc::new(KfpSubmitter::new(KfpSettings {
        pipelines_endpoint: settings.pipelines_endpoint.clone(),
        cluster_name: settings.cluster_name.clone(),
        region: settings.region.clone(),
        kubeconfig_path: settings.kubeconfig_path.clone(),
    }));
    let notifier = Arc::new(SlackNotifier::new(slack.clone(), settings.base_url.clone()));

    let state = AppState {
        routes: Arc::new(routes),
        slack,
        submitter,
        notifier,
    };

    let (router, _api) = router::create_router().split_for_parts();
    let router = router.with_state(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    info!(addr = %addr, "pipeform listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
