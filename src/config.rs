use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::form::FormPolicy;
use crate::predict::PredictionClient;
use crate::server::DEFAULT_MAX_SESSIONS;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "housing-form",
    about = "California house price form backed by a remote prediction service"
)]
pub struct Config {
    /// Base URL of the prediction service; requests go to `<url>/predict`.
    #[arg(long, env = "API_URL", default_value = "http://localhost:5000")]
    pub api_url: String,

    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Clamp map clicks and marker drags to the latitude/longitude ranges.
    #[arg(long, env = "CLAMP_GEO_SELECT")]
    pub clamp_geo_select: bool,

    /// Refuse to submit while any numeric field is unset.
    #[arg(long, env = "REQUIRE_COMPLETE")]
    pub require_complete: bool,

    /// Give up on the prediction service after this many seconds. No limit by default.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Open form sessions kept in memory; the idlest is dropped beyond this.
    #[arg(long, env = "MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,
}

impl Config {
    pub fn policy(&self) -> FormPolicy {
        FormPolicy {
            clamp_geo_select: self.clamp_geo_select,
            require_complete: self.require_complete,
        }
    }

    pub fn client(&self) -> reqwest::Result<PredictionClient> {
        match self.request_timeout_secs {
            Some(secs) => {
                PredictionClient::with_timeout(self.api_url.clone(), Duration::from_secs(secs))
            }
            None => Ok(PredictionClient::new(self.api_url.clone())),
        }
    }
}
