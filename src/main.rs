//! umu-front - Game launcher front-end for umu-run
//!
//! Manages a library of Windows games and starts them through umu-run.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use umu_front::catalog::{Catalog, SteamCatalog};
use umu_front::config::AppConfig;
use umu_front::library::EnrichmentWorker;
use umu_front::logging::{init_logger, log_error, log_info};
use umu_front::proton::list_proton_versions;
use umu_front::{GameFields, GameStore, Library, LibraryError};

/// How long `add` waits for the catalog lookup before giving up on it.
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "umu-front", version, about = "Launch Windows games through umu-run")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the library in display order
    List,
    /// Add a game, looking up its store id and cover art
    Add {
        #[command(flatten)]
        fields: FieldArgs,
        /// Skip the store lookup
        #[arg(long)]
        no_lookup: bool,
    },
    /// Change fields of the game at INDEX; omitted fields keep their value
    Edit {
        index: usize,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Remove the game at INDEX
    Delete { index: usize },
    /// Start the game at INDEX through the runner
    Launch {
        index: usize,
        /// Print the runner invocation instead of starting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Search the store catalog
    Search { name: String },
    /// List installed Proton versions
    Protons,
    /// Show or change settings
    Config {
        /// Runner binary to use instead of umu-run ("" resets)
        #[arg(long)]
        runner: Option<String>,
        /// Store search language, e.g. "english"
        #[arg(long)]
        language: Option<String>,
        /// Store search country code, e.g. "US"
        #[arg(long)]
        country: Option<String>,
    },
}

#[derive(Args, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    /// Windows executable to run
    #[arg(long = "exe")]
    exec_path: Option<String>,
    /// Wine prefix directory
    #[arg(long)]
    prefix: Option<String>,
    /// Directory name in compatibilitytools.d
    #[arg(long)]
    proton: Option<String>,
    /// Cover image file
    #[arg(long)]
    image: Option<String>,
    /// Raw WINEDLLOVERRIDES value
    #[arg(long)]
    dll_overrides: Option<String>,
}

impl FieldArgs {
    /// Apply the given options on top of `base`.
    fn merge_into(self, mut base: GameFields) -> GameFields {
        if let Some(v) = self.name {
            base.name = v;
        }
        if let Some(v) = self.exec_path {
            base.exec_path = v;
        }
        if let Some(v) = self.prefix {
            base.prefix = v;
        }
        if let Some(v) = self.proton {
            base.proton_ver = v;
        }
        if let Some(v) = self.image {
            base.image = v;
        }
        if let Some(v) = self.dll_overrides {
            base.dll_overrides = v;
        }
        base
    }
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn open_library(config: &AppConfig) -> Result<Library, String> {
    let store = GameStore::open_default().map_err(|e| e.to_string())?;
    let library = Library::open(store).map_err(|e| {
        format!("{}\nFix or move the file; it will not be overwritten.", e)
    })?;
    Ok(library.with_runner(config.runner()))
}

fn check_index(library: &Library, index: usize) -> Result<(), String> {
    if index >= library.len() {
        return Err(LibraryError::IndexOutOfRange { index, len: library.len() }.to_string());
    }
    Ok(())
}

fn run(command: Command) -> Result<(), String> {
    let config = AppConfig::load();

    match command {
        Command::List => {
            let library = open_library(&config)?;
            if library.is_empty() {
                println!("Library is empty. Add a game with `umu-front add --name <NAME> --exe <PATH>`.");
            }
            for (i, game) in library.games().iter().enumerate() {
                let id = if game.has_catalog_id() { game.id.as_str() } else { "-" };
                println!("{:>3}  {}  [{}]  {}", i, game.name, id, game.exec_path);
            }
        }

        Command::Add { fields, no_lookup } => {
            let fields = fields.merge_into(GameFields::default());
            if fields.name.trim().is_empty() || fields.exec_path.is_empty() {
                return Err("--name and --exe are required".to_string());
            }

            let mut library = open_library(&config)?;
            let catalog: Option<Arc<dyn Catalog>> = if no_lookup {
                None
            } else {
                Some(Arc::new(SteamCatalog::from_config(&config)))
            };

            let worker = EnrichmentWorker::spawn(catalog, library.images_dir());
            println!("Looking up store data...");

            let index = library
                .add_with_lookup(&worker, fields, LOOKUP_TIMEOUT)
                .map_err(|e| e.to_string())?;
            let game = &library.games()[index];
            println!("Added [{}] {}", index, game.name);
            if !game.image_url.is_empty() {
                println!("  cover: {}", game.image_url);
            }
        }

        Command::Edit { index, fields } => {
            let mut library = open_library(&config)?;
            check_index(&library, index)?;
            let updated = fields.merge_into(library.games()[index].fields());
            library.edit(index, updated).map_err(|e| e.to_string())?;
            println!("Updated [{}] {}", index, library.games()[index].name);
        }

        Command::Delete { index } => {
            let mut library = open_library(&config)?;
            check_index(&library, index)?;
            let removed = library.delete(index).map_err(|e| e.to_string())?;
            println!("Deleted {}", removed.name);
        }

        Command::Launch { index, dry_run } => {
            let mut library = open_library(&config)?;
            library.select(Some(index)).map_err(|e| e.to_string())?;

            if dry_run {
                let spec = library.launch_spec(index).map_err(|e| e.to_string())?;
                for (key, value) in &spec.env {
                    println!("{}={}", key, value.to_string_lossy());
                }
                println!("{} {}", spec.runner, spec.args.join(" "));
                return Ok(());
            }

            let pid = library.launch(index).map_err(|e| e.to_string())?;
            log_info(&format!("Runner started (pid {})", pid));
        }

        Command::Search { name } => {
            let catalog = SteamCatalog::from_config(&config);
            let items = catalog.search(&name).map_err(|e| e.to_string())?;
            if items.is_empty() {
                println!("No matches for '{}'", name);
            }
            for item in items {
                println!("{:>10}  {}", item.id, item.name);
            }
        }

        Command::Protons => {
            for version in list_proton_versions(&umu_front::paths::home_dir()) {
                println!("{}", version);
            }
        }

        Command::Config { runner, language, country } => {
            let mut config = config;
            let changed = runner.is_some() || language.is_some() || country.is_some();
            if let Some(runner) = runner {
                config.runner = Some(runner).filter(|r| !r.trim().is_empty());
            }
            if let Some(language) = language {
                config.catalog_language = language;
            }
            if let Some(country) = country {
                config.catalog_country = country;
            }
            if changed {
                config.save();
                log_info("Settings saved");
            }

            println!("runner:   {}", config.runner());
            println!("language: {}", config.catalog_language);
            println!("country:  {}", config.catalog_country);
        }
    }

    Ok(())
}
