mod cli;
mod display;
mod interactive;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{AdjustArgs, Cli, Commands, ConfigArgs, HistoryAction};
use studybuddy_appcore::{AppService, ServiceError, user_facing_capture_error};
use studybuddy_capture::{ImageAdjustments, read_transcript_file};
use studybuddy_core::types::ScanId;
use studybuddy_engine::session::SolveOutcome;
use studybuddy_runtime::defaults::config_path;

fn init_logging(verbose: bool) {
    // Also forwards `log` records from the library crates.
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config_base(cli: &Cli) -> anyhow::Result<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => dirs::config_dir()
            .ok_or_else(|| anyhow!("no config directory on this platform; pass --config-dir")),
    }
}

impl From<AdjustArgs> for ImageAdjustments {
    fn from(a: AdjustArgs) -> Self {
        ImageAdjustments::new(a.brightness, a.contrast, a.grayscale)
    }
}

pub(crate) fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Status hook that mirrors loading labels onto a spinner.
pub(crate) fn spinner_hook(
    pb: &ProgressBar,
) -> impl Fn(&'static str) -> std::future::Ready<()> + Send + Sync + use<> {
    let pb = pb.clone();
    move |status| {
        pb.set_message(status);
        std::future::ready(())
    }
}

/// Turns a service error into the message shown to the user; details go to the log.
pub(crate) fn user_error(e: ServiceError) -> anyhow::Error {
    log::debug!("service error: {e:?}");
    anyhow!(e.user_message())
}

pub(crate) fn print_outcome(outcome: &SolveOutcome) -> anyhow::Result<()> {
    match outcome {
        SolveOutcome::Solved { result, warning } => {
            println!("{}", display::render_result(result));
            if let Some(w) = warning {
                eprintln!("warning: {w}");
            }
            Ok(())
        }
        SolveOutcome::Failed { message } => Err(anyhow!(message.clone())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let path = config_path(&config_base(&cli)?);
    let svc = AppService::new(path).context("start studybuddy")?;

    match cli.command {
        Commands::Scan { image, adjust } => {
            let pb = spinner();
            let res = svc
                .solve_image_file(&image, adjust.into(), spinner_hook(&pb))
                .await;
            pb.finish_and_clear();
            print_outcome(&res.map_err(user_error)?)?;
        }

        Commands::Ask { text, transcript } => {
            let question = match transcript {
                Some(file) => {
                    read_transcript_file(&file).map_err(|e| anyhow!(user_facing_capture_error(&e)))?
                }
                None => text.join(" "),
            };

            let pb = spinner();
            let res = svc.solve_text(&question, spinner_hook(&pb)).await;
            pb.finish_and_clear();
            print_outcome(&res.map_err(user_error)?)?;
        }

        Commands::History { action } => run_history(&svc, action)?,

        Commands::Config(args) => run_config(&svc, args)?,

        Commands::Interactive => interactive::run(&svc).await?,
    }

    Ok(())
}

fn run_history(svc: &AppService, action: HistoryAction) -> anyhow::Result<()> {
    match action {
        HistoryAction::List => {
            let items = svc.history().map_err(user_error)?;
            if items.is_empty() {
                println!("No saved answers yet.");
            }
            for item in &items {
                println!("{}", display::history_row(item));
            }
        }
        HistoryAction::Show { id } => {
            let item = svc.find_history_item(&ScanId::from(id)).map_err(user_error)?;
            println!("{}", display::render_result(&item));
        }
        HistoryAction::Delete { id } => {
            let id = ScanId::from(id);
            svc.find_history_item(&id).map_err(user_error)?;
            svc.delete_history_item(&id).map_err(user_error)?;
            println!("Deleted {id}.");
        }
        HistoryAction::Clear { yes } => {
            let confirmed = yes
                || Confirm::new()
                    .with_prompt("Delete all saved answers?")
                    .default(false)
                    .interact()?;
            if confirmed {
                svc.clear_history().map_err(user_error)?;
                println!("History cleared.");
            }
        }
    }
    Ok(())
}

fn run_config(svc: &AppService, args: ConfigArgs) -> anyhow::Result<()> {
    let mut cfg = svc.load_config()?;
    let before = cfg.clone();

    if let Some(provider) = args.provider {
        cfg.solver.switch_provider(provider);
    }
    if let Some(model) = args.model {
        cfg.solver.model = model;
    }
    if let Some(base_url) = args.base_url {
        cfg.solver.base_url = base_url;
    }
    if cfg != before {
        svc.save_config(&cfg)?;
        println!("Saved {}", svc.config_path().display());
    }

    if let Some(key) = args.set_api_key {
        svc.set_api_key(cfg.solver.provider, &key)?;
        println!("API key stored for {}.", cfg.solver.provider);
    }
    if args.clear_api_key {
        svc.clear_api_keys()?;
        println!("API keys removed.");
    }

    let changed = cfg != before;
    if args.show || !changed {
        let cfg = svc.load_config()?;
        let present = svc.get_api_key_present(cfg.solver.provider)?;
        println!("config:      {}", svc.config_path().display());
        println!("provider:    {}", cfg.solver.provider);
        println!("base url:    {}", cfg.solver.base_url);
        println!("model:       {}", cfg.solver.model);
        println!("temperature: {}", cfg.solver.temperature);
        println!("timeout:     {}s", cfg.solver.request_timeout_secs);
        println!("api key:     {}", if present { "set" } else { "missing" });
    }
    Ok(())
}
