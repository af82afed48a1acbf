// trellis-cli: CLI entry point for Trellis (run a view, list views, check a library).

mod config;
mod demos;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use trellis::runtime::{loader, tlog, views, FileAssets, LOG_ERROR};

use config::{LoadedConfig, DEFAULT_CONFIG};

#[derive(Parser)]
#[command(name = "trellis", about = "Trellis CLI: run Rust-built views on a native UI surface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the native surface and open one registered view.
    Run {
        /// Path to trellis.config.toml.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Native surface library (overrides [native].library and TRELLIS_NATIVE_LIB).
        #[arg(long)]
        lib: Option<PathBuf>,
        /// View to open (see `trellis list`).
        #[arg(long)]
        demo: Option<String>,
        /// Window title for every window the view opens.
        #[arg(long)]
        title: Option<String>,
        /// Root directory for SVG asset paths.
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// List registered views.
    List,
    /// Load the native surface library and validate its API table.
    Check {
        /// Path to trellis.config.toml.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Native surface library.
        #[arg(long)]
        lib: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, lib, demo, title, assets } => {
            run_view(config, lib, demo, title, assets)
        }
        Commands::List => {
            list_views();
            Ok(())
        }
        Commands::Check { config, lib } => check_library(config, lib),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// An explicit `--config` must exist; the default one is optional.
fn load_config(path: Option<PathBuf>) -> Result<LoadedConfig, String> {
    match path {
        Some(path) => LoadedConfig::load(&path, true),
        None => LoadedConfig::load(Path::new(DEFAULT_CONFIG), false),
    }
    .map_err(|e| e.to_string())
}

/// Applies `[log].level` first so the loader's own messages honour it.
fn load_native(config: &LoadedConfig, lib: Option<PathBuf>) -> Result<PathBuf, String> {
    trellis::runtime::set_min_level(config.log_level().as_u8());
    let Some(path) = config.library(lib) else {
        return Err(format!(
            "native library not specified.\n\
             Provide --lib, set [native].library in {DEFAULT_CONFIG}, or set {}.",
            loader::NATIVE_LIB_ENV
        ));
    };
    loader::load(&path).map_err(|e| e.to_string())?;
    Ok(path)
}

fn run_view(
    config: Option<PathBuf>,
    lib: Option<PathBuf>,
    demo: Option<String>,
    title: Option<String>,
    assets: Option<PathBuf>,
) -> Result<(), String> {
    let config = load_config(config)?;

    let name = config.demo(demo);
    let Some(entry) = views::find(&name) else {
        let known: Vec<_> = views::all().into_iter().map(|e| e.name).collect();
        return Err(format!("unknown view '{name}' (available: {})", known.join(", ")));
    };

    load_native(&config, lib)?;
    trellis::runtime::set_asset_source(FileAssets::new(config.assets_root(assets)));
    if let Some(title) = config.window_title(title) {
        demos::set_window_title(title);
    }

    let result = trellis::run(move |app| {
        if let Err(e) = views::open(entry, app) {
            tlog!(LOG_ERROR, "view '{}' failed to open: {e}", entry.name);
        }
    });
    trellis::shutdown();
    result.map_err(|e| e.to_string())
}

fn list_views() {
    let entries = views::all();
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
    for entry in entries {
        println!("{:<width$}  {}", entry.name, entry.description);
    }
}

fn check_library(config: Option<PathBuf>, lib: Option<PathBuf>) -> Result<(), String> {
    let config = load_config(config)?;
    let path = load_native(&config, lib)?;
    println!(
        "{}: API table v{} OK",
        path.display(),
        trellis::ffi::TRELLIS_API_VERSION
    );
    Ok(())
}
