use std::time::Instant;

use clap::Parser;
use log::{debug, error, info};

use stroke_dashboard::config::{init_logging, DashboardArgs};
use stroke_dashboard::dashboard;
use stroke_dashboard::server::{self, AppState};
use stroke_dashboard::Dataset;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = DashboardArgs::parse();
    init_logging(&args);
    debug!("Arguments {:#?}", args);

    let start_time = Instant::now();
    let registry = dashboard::registry();
    info!("registered {} bindings", registry.len());

    let state = match Dataset::load(&args.data) {
        Ok(dataset) => {
            info!(
                "dataset ready in {:?}: {} patients",
                start_time.elapsed(),
                dataset.len()
            );
            AppState::ready(dataset, registry)
        }
        Err(e) if args.strict => return Err(e.into()),
        Err(e) => {
            error!("{}", e);
            AppState::unavailable(e.to_string(), registry)
        }
    };

    server::serve(state, &args.addr).await?;
    Ok(())
}
