// UI layer: the interactive session built on `dialoguer` prompts and
// `indicatif` spinners. All free-form input is parsed and validated here;
// the core modules only ever see typed values.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::albums::AlbumDirectory;
use crate::api::{ApiClient, ImmichApi};
use crate::config::{self, Config};
use crate::error::Error;
use crate::model::{AlbumTarget, AssetIdSet};
use crate::mutator::{AlbumMutator, Applied};
use crate::path::{expand_home, join_under_root};
use crate::resolver::{AssetResolver, Resolution};

/// Run a full session: collect the configuration, then add folders to
/// albums until the user stops. Returns an error only when the session
/// cannot go on (bad startup input, rejected credentials).
pub fn run_session(dry_run: bool) -> Result<()> {
    println!("=== Immich album manager ===");
    if dry_run {
        println!("[DRY-RUN] No album will be created or changed.");
    }

    let config = match prompt_config(dry_run)? {
        Some(config) => config,
        None => {
            println!("Cancelled.");
            return Ok(());
        }
    };
    let api = ApiClient::new(&config)?;

    println!();
    println!("Server:       {}", config.base_url);
    println!("API key:      {}", config.masked_api_key());
    println!("Library root: {}", config.library_root.display());

    main_menu(&config, &api)
}

/// Repeat album rounds until the user is done. Fatal errors end the
/// session; anything else is reported and the user may try again.
pub fn main_menu<A: ImmichApi + ?Sized>(config: &Config, api: &A) -> Result<()> {
    loop {
        if let Err(e) = album_round(config, api) {
            if e.downcast_ref::<Error>().map_or(false, Error::is_fatal) {
                return Err(e);
            }
            println!("[ERROR] {e}");
            if Confirm::new()
                .with_prompt("Try again?")
                .default(true)
                .interact()?
            {
                continue;
            }
            break;
        }
        if !Confirm::new()
            .with_prompt("Add another folder?")
            .default(false)
            .interact()?
        {
            break;
        }
    }
    Ok(())
}

fn prompt_config(dry_run: bool) -> Result<Option<Config>> {
    let host = loop {
        let host: String = Input::new()
            .with_prompt("Immich server address")
            .default(config::default_host())
            .interact_text()?;
        if let Err(e) = config::normalize_server(&host) {
            println!("{e}");
            continue;
        }
        if config::has_port(&host) || host.trim().starts_with("https://") {
            break host;
        }
        println!(
            "Warning: the address has no port; the usual form is IP:port (e.g. {}).",
            config::DEFAULT_HOST
        );
        if Confirm::new()
            .with_prompt("Use this address anyway?")
            .default(false)
            .interact()?
        {
            break host;
        }
    };

    let api_key = loop {
        let key: String = Password::new().with_prompt("Immich API key").interact()?;
        if config::is_valid_api_key(&key) {
            break key;
        }
        println!("The API key must not be empty.");
    };

    loop {
        let root: String = Input::new()
            .with_prompt("Library root (local path of the imported library)")
            .interact_text()?;
        let mut root = expand_home(root.trim());
        if root.is_relative() {
            root = std::env::current_dir()?.join(root);
        }
        match Config::new(&host, &api_key, root) {
            Ok(config) => return Ok(Some(config.with_dry_run(dry_run))),
            Err(e) => {
                println!("{e}");
                if !Confirm::new()
                    .with_prompt("Enter it again?")
                    .default(true)
                    .interact()?
                {
                    return Ok(None);
                }
            }
        }
    }
}

/// One pass: choose an album, choose a folder, apply.
fn album_round<A: ImmichApi + ?Sized>(config: &Config, api: &A) -> Result<()> {
    let target = match select_album(api)? {
        Some(target) => target,
        None => return Ok(()),
    };
    match &target {
        AlbumTarget::New { name } => println!("\nA new album will be created: {name}"),
        AlbumTarget::Existing(album) => println!("\nSelected album: {}", album.album_name),
    }

    let assets = match select_assets(config, api)? {
        Some(assets) => assets,
        None => return Ok(()),
    };

    if !Confirm::new()
        .with_prompt(format!("Add {} assets to '{}'?", assets.len(), target.name()))
        .default(true)
        .interact()?
    {
        println!("Skipped.");
        return Ok(());
    }

    let mutator = AlbumMutator::new(config, api);
    let applied = with_spinner("Updating album...", || mutator.apply(&target, &assets))?;
    report(&target, &applied);
    Ok(())
}

fn select_album<A: ImmichApi + ?Sized>(api: &A) -> Result<Option<AlbumTarget>> {
    let directory = AlbumDirectory::new(api);
    let albums = with_spinner("Loading albums...", || directory.list_albums())?;

    println!("\nFound {} albums.", albums.len());
    let mut items = vec!["Create a new album".to_string()];
    items.extend(albums.iter().map(|album| match album.asset_count {
        Some(count) => format!("{} ({} assets)", album.album_name, count),
        None => album.album_name.clone(),
    }));

    let choice = Select::new()
        .with_prompt("Choose an album")
        .items(&items)
        .default(0)
        .interact()?;
    if choice > 0 {
        return Ok(Some(AlbumTarget::Existing(albums[choice - 1].clone())));
    }

    loop {
        let name: String = Input::new()
            .with_prompt("New album name")
            .interact_text()?;
        let name = name.trim().to_string();
        match directory.check_available(&name) {
            Ok(()) => return Ok(Some(AlbumTarget::New { name })),
            Err(e @ (Error::NameConflict { .. } | Error::InvalidAlbumName)) => {
                println!("{e}; please choose another name.");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Ask for a folder until one resolves to at least one asset, or the
/// user gives up.
fn select_assets<A: ImmichApi + ?Sized>(config: &Config, api: &A) -> Result<Option<AssetIdSet>> {
    let resolver = AssetResolver::new(config, api);
    loop {
        let input: String = Input::new()
            .with_prompt(format!(
                "Path to add (relative to {})",
                config.library_root.display()
            ))
            .interact_text()?;
        let path: PathBuf = join_under_root(&config.library_root, &input);

        if !path.exists() {
            println!("Path does not exist: {}", path.display());
            if retry_path()? {
                continue;
            }
            return Ok(None);
        }

        println!("\nLooking up assets in: {}", path.display());
        let resolution = match with_spinner("Querying server...", || resolver.resolve_local(&path)) {
            Ok(resolution) => resolution,
            Err(e) if e.is_validation() => {
                println!("{e}");
                if retry_path()? {
                    continue;
                }
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        print_resolution(&resolution);

        if resolution.is_empty_path() || resolution.assets.is_empty() {
            println!("Warning: no assets found under this path. Is it part of the imported library?");
            if retry_path()? {
                continue;
            }
            return Ok(None);
        }

        if resolution.is_partial()
            && !Confirm::new()
                .with_prompt("Some folders could not be read. Continue with the assets that were found?")
                .default(false)
                .interact()?
        {
            return Ok(None);
        }

        return Ok(Some(resolution.assets));
    }
}

fn retry_path() -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Enter another path?")
        .default(true)
        .interact()?)
}

fn print_resolution(resolution: &Resolution) {
    println!(
        "Found {} assets in {} folder(s) under '{}'.",
        resolution.assets.len(),
        resolution.folders_visited,
        resolution.path
    );
    for failure in &resolution.failures {
        println!("  [ERROR] {}: {}", failure.path, failure.error);
    }
}

fn report(target: &AlbumTarget, applied: &Applied) {
    let result = &applied.result;
    let name = target.name();
    if result.dry_run {
        match target {
            AlbumTarget::New { .. } => println!(
                "[DRY-RUN] Would create album '{name}' with {} assets.",
                result.added
            ),
            AlbumTarget::Existing(_) => {
                println!("[DRY-RUN] Would add {} assets to album '{name}'.", result.added)
            }
        }
        return;
    }
    if applied.created {
        println!("[OK] Created album '{name}'.");
    }
    println!(
        "[OK] '{name}': {} added, {} already present.",
        result.added, result.already_present
    );
    if !result.failed.is_empty() {
        println!("[ERROR] {} assets could not be added:", result.failed.len());
        for id in &result.failed {
            println!("  {id}");
        }
    }
}

/// Show a spinner while `f` blocks on the network.
fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    let out = f();
    spinner.finish_and_clear();
    out
}
