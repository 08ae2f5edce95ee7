use logerr::init::{init_tracing_with_config, BridgeConfig};
use logerr::{global, kv, option, TextEncoder};
use std::sync::Arc;
use tracing::{debug, error, info};

fn main() {
    global::init_with_options(
        "auth",
        vec![option::encoder(Arc::new(TextEncoder)), option::verbosity(1)],
        kv! { "region" => "eu-west-1" },
    );

    if let Err(e) = init_tracing_with_config(BridgeConfig::default()) {
        eprintln!("tracing subscriber already set: {e}");
        return;
    }

    info!("starting service");
    debug!(cache_entries = 128, "cache warmed");

    error!(
        user_id = 42,
        error = "invalid password",
        "authentication failed"
    );
}
