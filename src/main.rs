use anyhow::{Context, anyhow};
use clap::Parser;
use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use apod_bg::notify::{Notifier, NullNotifier};
use apod_bg::{Config, DateCode, Desktop, Frontend, Paths};

#[derive(Parser)]
#[command(name = "apod-bg")]
#[command(
    version,
    about = "Sets NASA's Astronomy Picture of the Day as your desktop background."
)]
pub struct Args {
    #[arg(long, value_enum, help = "Initializes apod-bg for the chosen desktop")]
    config: Option<Desktop>,
    #[arg(long, help = "Removes the autostart entry for LXDE")]
    unconfig: bool,
    #[arg(long, help = "Do not seed after configuring")]
    noseed: bool,
    #[arg(
        long,
        help = "Do the procedure for graphical login: download today's image and display it"
    )]
    login: bool,
    #[arg(long, help = "Opens the default browser on the Astronomy Picture of the Day")]
    apod: bool,
    #[arg(long, help = "Opens the APOD page of the current background")]
    info: bool,
    #[arg(long, value_name = "DAYS", help = "Days to go back downloading")]
    fetch: Option<u32>,
    #[arg(
        long,
        value_name = "N",
        allow_negative_numbers = true,
        help = "Jump N backgrounds further, use negative numbers to jump backward"
    )]
    jump: Option<i64>,
    #[arg(long, help = "Toggles the background sizing option between fit and zoom")]
    mode: bool,
    #[arg(long, help = "Picks a random archive picture")]
    random: bool,
    #[arg(long, help = "Do not send notifications to the desktop")]
    nonotify: bool,
    #[arg(
        long,
        value_name = "YYMMDD",
        help = "Specify a date to be considered as today (for testing)"
    )]
    date: Option<DateCode>,
    #[arg(long, value_name = "FILE", help = "Log file (defaults to apod-bg.log in the config directory)")]
    log: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let paths = Paths::from_env()?;

    let log_file = args.log.clone().unwrap_or_else(|| paths.log_file());
    init_logging(&log_file)?;
    tracing::info!("apod-bg starts");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(args, paths))
        .inspect_err(|e| tracing::error!("{e:#}"))
}

async fn run(args: Args, paths: Paths) -> anyhow::Result<()> {
    let today = args.date.unwrap_or_else(DateCode::today);

    if let Some(desktop) = args.config {
        let config = Config::configure(&paths, desktop)
            .context("Could not properly configure apod-bg")?;
        if !args.noseed {
            let front = Frontend::new(&paths, &config, today, notifier(args.nonotify));
            let state = front
                .seed()
                .await
                .context("Could not seed the wallpaper directory")?;
            tracing::info!("Seeded, now showing {}", state.date);
        }
        tracing::info!("apod-bg was successfully configured");
        return Ok(());
    }

    let config = Config::load(&paths).context("Could not load the configuration")?;
    let front = Frontend::new(&paths, &config, today, notifier(args.nonotify));

    if args.apod {
        front
            .open_apod_today()
            .context("Could not open the APOD page")?;
        tracing::info!("Opened the default browser on APOD");
        return Ok(());
    }

    if args.unconfig {
        Config::unconfigure(&paths).context("Could not remove the autostart entry")?;
        tracing::info!("Removed the autostart entry");
    }

    if args.random {
        let state = front
            .random_archive()
            .context("Could not display a random archive picture")?;
        tracing::info!("Now showing {}", state.date);
    }

    if args.info {
        front
            .open_apod_on_background()
            .context("Could not open the APOD page on the background now showing")?;
        tracing::info!("Opened the default browser on the APOD page of the current background");
        return Ok(());
    }

    if args.login {
        front.run_at_login().await?;
    }

    if let Some(days) = args.fetch.filter(|days| *days > 0) {
        front
            .load_period(days)
            .await
            .with_context(|| format!("Could not fetch the last {days} days"))?;
        tracing::info!("Fetched the last {days} days");
    }

    if let Some(n) = args.jump.filter(|n| *n != 0) {
        return match front.jump(n) {
            Ok(state) => {
                tracing::info!("Jump was successful, now showing {}", state.date);
                Ok(())
            }
            Err(e) => {
                front.notify(&e.to_string());
                Err(anyhow!(e).context(format!("Could not jump({n})")))
            }
        };
    }

    if args.mode {
        let option = front
            .toggle_view_mode()
            .context("Could not toggle viewing options")?;
        tracing::info!("Inverted the viewing option to: {option}");
    }

    Ok(())
}

fn init_logging(log_file: &Path) -> anyhow::Result<()> {
    if let Some(dir) = log_file.parent() {
        create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Could not open logfile {}", log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout.and(Mutex::new(file)))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(feature = "notify")]
fn notifier(quiet: bool) -> Box<dyn Notifier> {
    if quiet {
        Box::new(NullNotifier)
    } else {
        Box::new(apod_bg::notify::DesktopNotifier)
    }
}

#[cfg(not(feature = "notify"))]
fn notifier(_quiet: bool) -> Box<dyn Notifier> {
    Box::new(NullNotifier)
}
