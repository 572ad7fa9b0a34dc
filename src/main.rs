use anyhow::Result;
use clap::Parser;
use tracing::debug;

use ytmusic_dl::common::api::models::search::SearchParams;
use ytmusic_dl::common::config::AppConfig;
use ytmusic_dl::common::logger::init_logging;
use ytmusic_dl::log_error;

mod cli;
mod commands;

use cli::{Cli, Command};
use commands::App;

async fn run(args: Cli) -> Result<()> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(api_url) = args.api_url {
        config.api_base_url = api_url;
    }
    config.validate()?;
    debug!("配置: {:?}", config);

    let app = App::new(config)?;

    match args.command {
        Command::Download {
            input,
            max_items,
            watch,
        } => commands::run_download(&app, &input, max_items, watch).await?,
        Command::Search {
            query,
            filter,
            scope,
            limit,
            ignore_spelling,
            download,
        } => {
            let params = SearchParams {
                filter,
                scope,
                limit,
                ignore_spelling,
                ..SearchParams::new(query)
            };
            commands::run_search(&app, params, download).await?
        }
        Command::Suggest { query } => commands::run_suggest(&app, &query).await?,
        Command::Album {
            browse_id,
            download,
            track,
        } => commands::run_album(&app, &browse_id, download, track).await?,
        Command::Related { video_id } => commands::run_related(&app, &video_id).await?,
        Command::Jobs { watch } => commands::run_jobs(&app, watch).await?,
        Command::Cancel { id } => commands::run_cancel(&app, &id).await?,
        Command::Delete { id } => commands::run_delete(&app, &id).await?,
        Command::Console { all, compact } => commands::run_console(&app, all, compact).await?,
        Command::Subs { command } => commands::run_subs(&app, command).await?,
        Command::Scheduler => commands::run_scheduler(&app).await?,
        Command::Prefs { command } => commands::run_prefs(&app, command)?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        log_error!("{:#}", e);
        std::process::exit(1);
    }
}
