// src/main.rs

use dagrun::{cli, logging, run, CampaignOutcome};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(CampaignOutcome::Success) => {}
        Ok(CampaignOutcome::Failed(_)) => std::process::exit(1),
        Err(err) => {
            eprintln!("dagrun error: {err:?}");
            std::process::exit(2);
        }
    }
}

async fn run_main() -> dagrun::Result<CampaignOutcome> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    run(args).await
}
