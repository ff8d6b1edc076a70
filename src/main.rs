use anyhow::Context;
use clap::Parser;
use tracing::info;

use housing_form::config::Config;
use housing_form::server::{self, AppState};
use housing_form::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let config = Config::parse();

    println!("California House Price Predictor");
    println!("================================");
    info!(api_url = %config.api_url, policy = ?config.policy(), "starting");

    let client = config.client().context("build prediction client")?;
    let state = AppState::new(config.policy(), client).with_max_sessions(config.max_sessions);
    server::serve(config.bind, state).await
}
