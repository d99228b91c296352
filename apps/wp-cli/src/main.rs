use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wp_app::{
    AppError, AppResult, ClientConfig, HttpPlotService, PlotPage, SubmissionState, load_config,
};
use wp_form::{deserialize, evaluate, field_label, parse_settings_json, serialize};
use wp_store::{CacheKey, FileCache, HttpRemoteStore, LocalCache};

type Page = PlotPage<HttpPlotService, HttpRemoteStore, FileCache>;

#[derive(Parser)]
#[command(name = "wp-cli")]
#[command(about = "webplot CLI - submit plot settings and manage saved plots", long_about = None)]
struct Cli {
    /// Client config YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Plotting endpoint URL (overrides the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Local cache directory (overrides the config file)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the data tables offered by the endpoint
    Tables {
        /// Include expert-only tables
        #[arg(long)]
        expert: bool,
    },
    /// Print the enabled fields of a settings file
    Fields {
        /// Settings JSON file
        settings_path: PathBuf,
    },
    /// Submit a settings file and print the plot locations
    Plot {
        /// Settings JSON file
        settings_path: PathBuf,
        /// Append the plot to the saved plots on success
        #[arg(long)]
        save: bool,
    },
    /// Show or change the session id
    Session {
        /// Request a fresh session id
        #[arg(long, conflicts_with = "id")]
        new: bool,
        /// Switch to an existing session id
        #[arg(long = "use")]
        id: Option<String>,
    },
    /// Manage saved plots of the current session
    #[command(subcommand)]
    Saved(SavedCommands),
    /// Manage the local cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand)]
enum SavedCommands {
    /// List saved plots
    List,
    /// Submit a settings file and save the resulting plot
    Save {
        /// Settings JSON file
        settings_path: PathBuf,
    },
    /// Delete a saved plot
    Delete {
        /// Position in the list, starting at 0
        index: usize,
    },
    /// Print the settings JSON of a saved plot
    Show {
        /// Position in the list, starting at 0
        index: usize,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Forget the cached session id and last settings
    Clear,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    debug!(endpoint = %config.endpoint, cache_dir = %config.cache_dir.display(), "using config");

    match cli.command {
        Commands::Tables { expert } => cmd_tables(&config, expert),
        Commands::Fields { settings_path } => cmd_fields(&settings_path),
        Commands::Plot {
            settings_path,
            save,
        } => cmd_plot(&config, &settings_path, save),
        Commands::Session { new, id } => cmd_session(&config, new, id.as_deref()),
        Commands::Saved(saved_cmd) => match saved_cmd {
            SavedCommands::List => cmd_saved_list(&config),
            SavedCommands::Save { settings_path } => cmd_plot(&config, &settings_path, true),
            SavedCommands::Delete { index } => cmd_saved_delete(&config, index),
            SavedCommands::Show { index } => cmd_saved_show(&config, index),
        },
        Commands::Cache(CacheCommands::Clear) => cmd_cache_clear(&config),
    }
}

fn resolve_config(cli: &Cli) -> AppResult<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.cache_dir = cache_dir.clone();
    }
    Ok(config)
}

fn open_page(config: &ClientConfig) -> AppResult<Page> {
    let endpoint = config.endpoint()?;
    let cache = FileCache::new(config.cache_dir.clone())?;
    Ok(PlotPage::open(
        HttpPlotService::new(endpoint.clone()),
        HttpRemoteStore::new(endpoint),
        cache,
    ))
}

fn read_settings(path: &Path) -> AppResult<String> {
    Ok(std::fs::read_to_string(path)?)
}

fn cmd_tables(config: &ClientConfig, expert: bool) -> AppResult<()> {
    let mut page = open_page(config)?;
    let catalog = page.tables()?;

    if catalog.is_empty() {
        println!("No tables offered by {}", config.endpoint);
        return Ok(());
    }
    for table in catalog.visible(expert) {
        println!("{}", table.display_label());
        println!("  source: {}", table.key);
        println!("  variables: {}", table.variable_hint(false));
    }
    Ok(())
}

fn cmd_fields(settings_path: &Path) -> AppResult<()> {
    let settings = parse_settings_json(&read_settings(settings_path)?)?;
    let form = deserialize(&settings)?;
    let visibility = evaluate(&form);

    println!(
        "{} plot(s), expert mode {}",
        form.plot_count(),
        if form.expert_mode() { "on" } else { "off" }
    );
    for plot in form.plots() {
        println!("  plot {}: {}", plot.index(), plot.mode().label());
    }
    for (ident, value) in serialize(&form) {
        let label = field_label(&ident).unwrap_or("");
        println!("  {:<14} {:<18} {}", ident, label, value.as_text());
    }
    if !visibility.hidden().is_empty() {
        let hidden: Vec<&str> = visibility.hidden().iter().map(String::as_str).collect();
        println!("Hidden: {}", hidden.join(", "));
    }
    Ok(())
}

fn cmd_plot(config: &ClientConfig, settings_path: &Path, save: bool) -> AppResult<()> {
    let mut page = open_page(config)?;
    page.load_settings_text(&read_settings(settings_path)?)?;

    match page.submit() {
        SubmissionState::Success(outcome) => {
            println!("✓ Plot ready");
            println!("  png: {}", outcome.artifacts.png);
            println!("  pdf: {}", outcome.artifacts.pdf);
            println!("  svg: {}", outcome.artifacts.svg);
        }
        SubmissionState::Failed(failure) => {
            return Err(AppError::Backend {
                message: failure.to_string(),
            });
        }
        SubmissionState::Idle | SubmissionState::Pending { .. } => {
            return Err(AppError::Backend {
                message: "plot request did not complete".to_string(),
            });
        }
    }
    if let Some(url) = page.embed_url() {
        println!("  embed: {}", url);
    }

    if save {
        let entry = page.save_current()?;
        println!("✓ Saved as \"{}\"", entry.title());
    }
    Ok(())
}

fn cmd_session(config: &ClientConfig, new: bool, id: Option<&str>) -> AppResult<()> {
    let mut page = open_page(config)?;

    if new {
        let session = page.new_session()?;
        println!("✓ New session: {}", session);
        return Ok(());
    }
    if let Some(id) = id {
        let count = page.use_session(id)?;
        println!("✓ Using session {} ({} saved plot(s))", id.trim(), count);
        return Ok(());
    }

    match page.session() {
        Some(session) => println!(
            "Session: {} ({} saved plot(s))",
            session,
            page.saved_plots().len()
        ),
        None => println!("No session (endpoint unreachable?)"),
    }
    Ok(())
}

fn cmd_saved_list(config: &ClientConfig) -> AppResult<()> {
    let page = open_page(config)?;
    let saved = page.saved_plots();

    if saved.is_empty() {
        println!("No saved plots");
    } else {
        println!("Saved plots:");
        for (i, entry) in saved.iter().enumerate() {
            println!("  [{}] {} ({})", i, entry.title(), entry.artifacts().png);
        }
    }
    Ok(())
}

fn cmd_saved_delete(config: &ClientConfig, index: usize) -> AppResult<()> {
    let mut page = open_page(config)?;
    let removed = page.delete_saved(index)?;
    println!("✓ Deleted \"{}\"", removed.title());
    Ok(())
}

fn cmd_saved_show(config: &ClientConfig, index: usize) -> AppResult<()> {
    let page = open_page(config)?;
    let saved = page.saved_plots();
    let entry = saved.get(index).ok_or(AppError::SavedPlotNotFound {
        index,
        len: saved.len(),
    })?;
    let json = serde_json::to_string_pretty(entry)
        .map_err(|e| AppError::Backend { message: e.to_string() })?;
    println!("{}", json);
    Ok(())
}

fn cmd_cache_clear(config: &ClientConfig) -> AppResult<()> {
    let cache = FileCache::new(config.cache_dir.clone())?;
    cache.clear(CacheKey::SessionId)?;
    cache.clear(CacheKey::LastSettings)?;
    println!("✓ Cleared cache in {}", config.cache_dir.display());
    Ok(())
}
