//! `glyphdeck` command line: inspect sources, warm the cache, search icons
//! and manage the saved picker state without a host application.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use glyphdeck::file::{self, AppPaths};
use glyphdeck::icons::{
    CodepointCache, FontWeight, IconCatalog, SourceId, SourceRegistry, UnknownWeight, filter,
};
use glyphdeck::state::clamp_font_size_mm;
use glyphdeck::{GlyphdeckConfig, LogConfig, StateError, StateStore};

/// File name used by `--log` inside the platform log directory.
const LOG_FILE_NAME: &str = "glyphdeck.log";

#[derive(Parser, Debug)]
#[command(name = "glyphdeck", version, about = "Browse and cache icon font codepoints")]
struct Args {
    /// Cache directory (overrides GLYPHDECK_CACHE_DIR and the config file)
    #[arg(long, value_name = "DIR", global = true)]
    cache_dir: Option<PathBuf>,

    /// Config file (overrides GLYPHDECK_CONFIG)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Append log output to this file
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Append log output to glyphdeck.log in the platform log directory
    #[arg(long, global = true, conflicts_with = "log_file")]
    log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List icon sets with their cache status
    Sources,

    /// Download codepoints for the given sources (default: enabled ones)
    Fetch {
        /// Download again even if a cached copy exists
        #[arg(long, action = clap::ArgAction::SetTrue)]
        refresh: bool,

        #[arg(value_name = "ID")]
        ids: Vec<String>,
    },

    /// Search icons by name
    Search {
        /// Restrict to a source (repeatable; default: enabled ones)
        #[arg(long = "source", value_name = "ID")]
        sources: Vec<String>,

        /// Maximum rows to print
        #[arg(long, default_value_t = 50)]
        limit: usize,

        #[arg(value_name = "QUERY", default_value = "")]
        query: String,
    },

    /// Show or reset the saved picker state
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

#[derive(Subcommand, Debug)]
enum StateAction {
    /// Print the saved state
    Show,
    /// Change fields of the saved state
    Set(StateChanges),
    /// Delete the saved state
    Reset,
}

#[derive(ClapArgs, Debug)]
struct StateChanges {
    /// Search text
    #[arg(long)]
    query: Option<String>,

    /// Target layer id
    #[arg(long)]
    layer: Option<String>,

    /// Glyph height in millimetres (clamped to 1..=50)
    #[arg(long, value_name = "MM", allow_negative_numbers = true)]
    size: Option<i64>,

    /// Weight name (e.g. SemiBold) or slider position 1..=7
    #[arg(long, value_name = "WEIGHT", value_parser = parse_weight)]
    weight: Option<FontWeight>,

    /// Enable a source (repeatable)
    #[arg(long, value_name = "ID")]
    enable: Vec<String>,

    /// Disable a source (repeatable)
    #[arg(long, value_name = "ID")]
    disable: Vec<String>,
}

struct App {
    config: GlyphdeckConfig,
    registry: SourceRegistry,
    cache: CodepointCache,
    store: StateStore,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = match &args.config {
        Some(path) => GlyphdeckConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GlyphdeckConfig::load(),
    };
    let root = match &args.cache_dir {
        Some(dir) => {
            file::ensure_dir(dir).with_context(|| format!("creating {}", dir.display()))?;
            dir.clone()
        }
        None => config.resolve_cache_root().context("resolving cache directory")?,
    };

    let client = config.http_client().context("building HTTP client")?;
    let registry = SourceRegistry::material_symbols(&client);
    let app = App {
        cache: CodepointCache::new(root.clone()),
        store: StateStore::new(&root, &registry, &config),
        registry,
        config,
    };

    match args.command {
        Command::Sources => cmd_sources(&app),
        Command::Fetch { refresh, ids } => cmd_fetch(&app, &ids, refresh),
        Command::Search {
            sources,
            limit,
            query,
        } => cmd_search(&app, &sources, limit, &query),
        Command::State { action } => match action {
            StateAction::Show => cmd_state_show(&app),
            StateAction::Set(changes) => cmd_state_set(&app, changes),
            StateAction::Reset => cmd_state_reset(&app),
        },
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let mut log = LogConfig::from_env();
    match args.verbose {
        0 => {}
        1 => log = log.with_default_level(LevelFilter::DEBUG),
        _ => log = log.with_default_level(LevelFilter::TRACE),
    }
    if let Some(path) = &args.log_file {
        log = log.with_file(path);
    } else if args.log {
        let dir = AppPaths::new()?.logs().to_path_buf();
        file::ensure_dir(&dir).with_context(|| format!("creating {}", dir.display()))?;
        log = log.with_file(dir.join(LOG_FILE_NAME));
    }
    glyphdeck::logging::init(&log)?;
    Ok(())
}

/// Accepts a weight name in any case or a 1-based slider position.
fn parse_weight(value: &str) -> Result<FontWeight, UnknownWeight> {
    match value.trim().parse::<i64>() {
        Ok(position) => {
            let name = FontWeight::name_for_position(position);
            Ok(FontWeight::from_name(name).unwrap_or_default())
        }
        Err(_) => value.parse(),
    }
}

/// Resolves explicit ids, or the saved enabled set when none are given.
fn select_sources(app: &App, ids: &[String]) -> Result<BTreeSet<SourceId>> {
    if ids.is_empty() {
        return Ok(app.store.load().enabled_sources);
    }
    known_sources(app, ids)
}

/// Validates `ids` against the registry.
fn known_sources(app: &App, ids: &[String]) -> Result<BTreeSet<SourceId>> {
    let mut selected = BTreeSet::new();
    for id in ids {
        if !app.registry.contains(id) {
            let known: Vec<_> = app.registry.ids().map(SourceId::as_str).collect();
            bail!("unknown source '{id}' (known: {})", known.join(", "));
        }
        selected.insert(SourceId::new(id.as_str()));
    }
    Ok(selected)
}

fn cmd_sources(app: &App) -> Result<()> {
    println!("cache: {}", app.cache.root().display());
    println!(
        "{:<20} {:<28} {:>7} {:>7}  {}",
        "ID", "FONT", "WEIGHTS", "GLYPHS", "CACHED"
    );

    for source in app.registry.iter() {
        let font = source.font();
        let info = app.cache.entry_info(&font.id)?;
        let glyphs = match &info {
            Some(_) => app
                .cache
                .cached_glyph_count(source.as_ref())
                .map_or_else(|e| format!("error: {e}"), |count| count.to_string()),
            None => "-".to_string(),
        };
        let cached = match info.as_ref().and_then(|i| i.retrieved_at) {
            Some(at) => at.to_rfc3339(),
            None if info.is_some() => "yes".to_string(),
            None => "no".to_string(),
        };
        println!(
            "{:<20} {:<28} {:>7} {:>7}  {}",
            font.id,
            font.label(),
            font.available_weights.len(),
            glyphs,
            cached
        );
    }
    Ok(())
}

fn cmd_fetch(app: &App, ids: &[String], refresh: bool) -> Result<()> {
    let selected = select_sources(app, ids)?;
    if selected.is_empty() {
        bail!("no sources selected; pass ids or enable a source");
    }

    let mut failed = 0;
    for source in app.registry.iter().filter(|s| selected.contains(s.id())) {
        let result = if refresh {
            app.cache.refresh(source.as_ref())
        } else {
            app.cache.load(source.as_ref())
        };
        match result {
            Ok(entries) => println!("{}: {} glyphs", source.id(), entries.len()),
            Err(e) => {
                eprintln!("{}: {e}", source.id());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} sources failed", selected.len());
    }
    Ok(())
}

fn cmd_search(app: &App, sources: &[String], limit: usize, query: &str) -> Result<()> {
    let enabled = select_sources(app, sources)?;
    if enabled.is_empty() {
        bail!("Enable at least one icon set to browse icons");
    }

    let build = IconCatalog::build(&app.registry, &enabled, |s| app.cache.load(s));
    for skipped in &build.skipped {
        eprintln!("warning: {}: {}", skipped.source, skipped.error);
    }
    if build.catalog.is_empty() && build.is_partial() {
        bail!("Unable to load icon metadata. Check network access.");
    }

    let rows = filter(&build.catalog, query, &enabled);
    for entry in rows.iter().take(limit) {
        println!(
            "{}  {:<32} U+{:<6} {}",
            entry.character(),
            entry.name(),
            entry.hex(),
            entry.source()
        );
    }
    if rows.len() > limit {
        println!("... {} more", rows.len() - limit);
    }
    println!("Showing {} icons", rows.len().min(limit));
    Ok(())
}

fn cmd_state_show(app: &App) -> Result<()> {
    println!("file: {}", app.store.path().display());
    let state = match app.store.try_load() {
        Ok(state) => state,
        Err(StateError::NotFound(_)) => {
            println!("(no saved state, showing defaults)");
            app.store.defaults()
        }
        Err(e) => {
            println!("(unreadable: {e}; showing defaults)");
            app.store.defaults()
        }
    };

    let enabled: Vec<_> = state.enabled_sources.iter().map(SourceId::as_str).collect();
    let layer_label = app
        .config
        .layers
        .iter()
        .find(|l| l.id == state.layer)
        .map_or("", |l| l.label.as_str());
    println!("query:   {:?}", state.query);
    println!("sources: {}", enabled.join(", "));
    println!("layer:   {} {layer_label}", state.layer);
    println!("size:    {} mm", state.font_size_mm);
    println!(
        "weight:  {} ({}/{})",
        state.font_weight,
        FontWeight::position_for_name(state.font_weight.name()),
        FontWeight::ALL.len()
    );
    Ok(())
}

fn cmd_state_set(app: &App, changes: StateChanges) -> Result<()> {
    let mut state = app.store.load();

    if let Some(query) = changes.query {
        state.query = query;
    }
    if let Some(layer) = changes.layer {
        if !app.config.layers.iter().any(|l| l.id == layer) {
            let known: Vec<_> = app.config.layers.iter().map(|l| l.id.as_str()).collect();
            bail!("unknown layer '{layer}' (known: {})", known.join(", "));
        }
        state.layer = layer;
    }
    if let Some(size) = changes.size {
        state.font_size_mm = clamp_font_size_mm(size);
    }
    if let Some(weight) = changes.weight {
        state.font_weight = weight;
    }
    state.enabled_sources.extend(known_sources(app, &changes.enable)?);
    for id in known_sources(app, &changes.disable)? {
        state.enabled_sources.remove(&id);
    }

    app.store.save(&state)?;
    println!("saved {}", app.store.path().display());
    Ok(())
}

fn cmd_state_reset(app: &App) -> Result<()> {
    if app.store.reset()? {
        println!("removed {}", app.store.path().display());
    } else {
        println!("no saved state");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weight_names_and_positions() {
        assert_eq!(parse_weight("semibold"), Ok(FontWeight::SemiBold));
        assert_eq!(parse_weight("2"), Ok(FontWeight::ExtraLight));
        assert_eq!(parse_weight("99"), Ok(FontWeight::Bold));
        assert!(parse_weight("heavy").is_err());
    }

    #[test]
    fn test_state_set_arguments() {
        let args = Args::try_parse_from([
            "glyphdeck", "state", "set", "--size", "-3", "--weight", "Light", "--enable", "material-symbols-rounded",
        ])
        .unwrap();
        let Command::State { action: StateAction::Set(changes) } = args.command else {
            panic!("expected state set");
        };
        assert_eq!(changes.size, Some(-3));
        assert_eq!(changes.weight, Some(FontWeight::Light));
        assert_eq!(changes.enable, ["material-symbols-rounded"]);
        assert!(changes.disable.is_empty());
    }

    #[test]
    fn test_log_flags_conflict() {
        assert!(Args::try_parse_from(["glyphdeck", "--log", "--log-file", "x.log", "sources"]).is_err());
    }
}
