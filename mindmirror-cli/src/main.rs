mod render;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use mindmirror_appcore::service::{AppService, ConfigOverrides, user_facing_capture_error};
use mindmirror_audio::wav::read_wav_duration_ms;
use mindmirror_core::mood::{FocusArea, Mood};
use mindmirror_core::types::Recording;
use mindmirror_engine::error::ViewError;
use mindmirror_engine::{HistoryView, RecorderView};
use mindmirror_runtime::config_store::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::render::Style;

#[derive(Parser)]
#[command(name = "mindmirror")]
#[command(about = "Voice journaling with mood analysis and reflection prompts")]
struct Cli {
    /// Config file (default: <config dir>/mindmirror/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true, env = "MINDMIRROR_API_URL")]
    api_url: Option<String>,

    /// Journal owner, overriding the config file
    #[arg(long, global = true, env = "MINDMIRROR_USER_ID")]
    user_id: Option<String>,

    /// Print view snapshots as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record from the microphone and analyze the clip
    Record {
        /// Stop after this many seconds instead of waiting for Enter
        #[arg(long)]
        seconds: Option<u64>,
        /// Also write the clip to this WAV file
        #[arg(long)]
        save: Option<PathBuf>,
        /// Record and save only; skip analysis
        #[arg(long)]
        no_submit: bool,
    },
    /// Analyze an existing WAV recording
    Analyze {
        file: PathBuf,
    },
    /// Ask for a reflection prompt
    Reflect {
        /// happy, sad, anxious, excited, peaceful, stressed, confused, grateful, lonely, energetic
        #[arg(long)]
        mood: Option<Mood>,
        /// relationships, work, health, personal-growth, creativity, stress-management, gratitude, self-care
        #[arg(long)]
        focus: Option<FocusArea>,
    },
    /// Show recent entries and mood statistics
    History {
        /// Lookback window: 7, 14 or 30
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show the backend's trend report
    Trends {
        #[arg(long, default_value = "30")]
        days: u32,
    },
    /// Check that the backend is reachable
    Health,
    /// List microphone input devices
    Devices,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Set one value and save
    Set { key: String, value: String },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Logs go to stderr so `--json` output stays clean.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let root = dirs::config_dir().ok_or_else(|| anyhow!("no config directory on this system"))?;
    Ok(root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

struct Output {
    json: bool,
    style: Style,
}

impl Output {
    fn emit<T: Serialize + ?Sized>(
        &self,
        value: &T,
        text: impl FnOnce(Style) -> String,
    ) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value).context("encode JSON")?);
        } else {
            print!("{}", text(self.style));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match cli.config {
        Some(p) => p,
        None => default_config_path()?,
    };
    let overrides = ConfigOverrides {
        base_url: cli.api_url,
        user_id: cli.user_id,
    };
    let svc = AppService::new(config_path, &overrides)?;

    let out = Output {
        json: cli.json,
        style: Style {
            color: !cli.json
                && std::io::stdout().is_terminal()
                && std::env::var_os("NO_COLOR").is_none(),
        },
    };

    match cli.command {
        Commands::Record {
            seconds,
            save,
            no_submit,
        } => record(&svc, &out, seconds, save.as_deref(), no_submit).await,
        Commands::Analyze { file } => analyze_file(&svc, &out, &file).await,
        Commands::Reflect { mood, focus } => reflect(&svc, &out, mood, focus).await,
        Commands::History { days } => history(&svc, &out, days).await,
        Commands::Trends { days } => {
            let report = svc.trend_report(days).await.map_err(user_error)?;
            out.emit(&report, |s| render::trend_report(s, &report))
        }
        Commands::Health => {
            let status = svc.health().await.map_err(user_error)?;
            out.emit(&status, |_| render::health(&status))
        }
        Commands::Devices => {
            let devices = svc
                .input_devices()
                .map_err(|e| anyhow!(user_facing_capture_error(&e)))?;
            out.emit(&devices, |_| {
                if devices.is_empty() {
                    "No input devices found.\n".to_string()
                } else {
                    devices.iter().map(|d| format!("{d}\n")).collect()
                }
            })
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let cfg = svc.config();
                out.emit(cfg, |_| {
                    serde_json::to_string_pretty(cfg)
                        .map(|s| s + "\n")
                        .unwrap_or_default()
                })
            }
            ConfigAction::Path => {
                println!("{}", svc.config_path().display());
                Ok(())
            }
            ConfigAction::Set { key, value } => {
                let cfg = svc.set_config_value(&key, &value)?;
                log::info!("{key} updated");
                out.emit(&cfg, |_| format!("Saved {}\n", svc.config_path().display()))
            }
        },
    }
}

// Users get the short message; the cause was already logged by the view.
fn user_error(e: ViewError) -> anyhow::Error {
    anyhow!(e.user_message())
}

async fn record(
    svc: &AppService,
    out: &Output,
    seconds: Option<u64>,
    save: Option<&Path>,
    no_submit: bool,
) -> anyhow::Result<()> {
    let view = svc.recorder_view();

    if let Err(e) = view.start_capture().await {
        if let ViewError::Permission { cause, .. } = &e {
            eprintln!("{}", user_facing_capture_error(cause));
        }
        return Err(user_error(e));
    }

    match seconds {
        Some(secs) => {
            eprintln!("Recording for {secs}s...");
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
        None => {
            eprintln!("Recording... press Enter to stop.");
            tokio::task::spawn_blocking(|| {
                let mut line = String::new();
                std::io::stdin().read_line(&mut line).map(|_| ())
            })
            .await
            .context("stdin task failed")?
            .context("read stdin")?;
        }
    }

    view.stop_capture().await.map_err(user_error)?;

    if let Some(path) = save {
        save_recording(&view, path).await?;
    }
    if no_submit {
        let snap = view.snapshot().await;
        return out.emit(&snap, |s| render::recorder(s, &snap));
    }

    submit(&view, out).await
}

async fn analyze_file(svc: &AppService, out: &Output, file: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("read {}", file.display()))?;
    let duration_ms = read_wav_duration_ms(&bytes)
        .with_context(|| format!("{} is not a usable WAV file", file.display()))?;

    let view = svc.recorder_view();
    view.attach_recording(Recording::wav(bytes, duration_ms))
        .await
        .map_err(user_error)?;
    submit(&view, out).await
}

async fn submit(view: &RecorderView, out: &Output) -> anyhow::Result<()> {
    eprintln!("Analyzing...");
    let res = view.submit_for_analysis().await;
    let snap = view.snapshot().await;
    out.emit(&snap, |s| render::recorder(s, &snap))?;
    res.map(|_| ()).map_err(user_error)
}

async fn save_recording(view: &RecorderView, path: &Path) -> anyhow::Result<()> {
    let recording = view
        .recording()
        .await
        .ok_or_else(|| anyhow!("no recording to save"))?;
    std::fs::write(path, &recording.bytes)
        .with_context(|| format!("write {}", path.display()))?;
    eprintln!("Saved {} ({} ms)", path.display(), recording.duration_ms);
    Ok(())
}

async fn reflect(
    svc: &AppService,
    out: &Output,
    mood: Option<Mood>,
    focus: Option<FocusArea>,
) -> anyhow::Result<()> {
    let view = svc.reflection_view();
    if let Some(mood) = mood {
        view.select_mood(mood).await;
    }
    if let Some(area) = focus {
        view.toggle_focus_area(area).await;
    }

    let res = view.generate().await;
    let snap = view.snapshot().await;
    out.emit(&snap, |s| render::reflection(s, &snap))?;
    res.map(|_| ()).map_err(user_error)
}

async fn history(svc: &AppService, out: &Output, days: Option<u32>) -> anyhow::Result<()> {
    let view: HistoryView = svc.history_view();
    let fetched = match days {
        Some(days) => view.select_days(days).await,
        None => Ok(false),
    };
    let res = match fetched {
        Ok(true) => Ok(()),
        Ok(false) => view.load().await.map(|_| ()),
        Err(e) if e.is_validation() => return Err(user_error(e)),
        Err(e) => Err(e),
    };

    let snap = view.snapshot().await;
    out.emit(&snap, |s| render::history(s, &snap))?;
    res.map_err(user_error)
}
