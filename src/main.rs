//!
//! meeting-library CLI
//! -------------------
//! Loads a JSON seed of principals and resources into an in-memory platform and
//! prints one page of a principal's library as JSON, as seen by a given viewer.

use std::env;

use anyhow::{anyhow, Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use meeting_library::config::GlobalLibraryConfig;
use meeting_library::identity::{Principal, RequestContext, ROLE_ADMIN, ROLE_GLOBAL_ADMIN};
use meeting_library::storage::{MemoryStore, Seed};
use meeting_library::LibraryService;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} --seed <seed.json> --owner <principal id> [--viewer <user id>] [--admin | --global-admin]\n      [--namespace <ns>] [--limit <n>] [--token <paging token>] [--purge] [--config <config.json>]\n\nFlags:\n  --seed <path>        JSON fixture with `principals` and `resources`\n  --owner <id>         Library owner, e.g. u:cam:alice or g:cam:team\n  --viewer <id>        Viewing user; omit for an anonymous request\n  --admin              Viewer is an administrator of its own tenant\n  --global-admin       Viewer administers every tenant\n  --namespace <ns>     Library namespace (default: meetings)\n  --limit <n>          Page size\n  --token <t>          Continuation token from a previous page\n  --purge              Read once, purge, and read again (shows the rebuild)\n  --config <path>      Library config JSON; MEETING_LIBRARY_* env vars override it\n  -h, --help           Show this help"
    );
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().ok_or_else(|| anyhow!("missing value for {}", flag))
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("building log filter")?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args = env::args();
    let program = args.next().unwrap_or_else(|| "meeting-library".to_string());

    let mut seed_path: Option<String> = None;
    let mut owner: Option<String> = None;
    let mut viewer: Option<String> = None;
    let mut admin = false;
    let mut global_admin = false;
    let mut namespace = "meetings".to_string();
    let mut limit: Option<usize> = None;
    let mut token: Option<String> = None;
    let mut purge = false;
    let mut config_path: Option<String> = None;

    while let Some(a) = args.next() {
        match a.as_str() {
            "--seed" => seed_path = Some(next_value(&mut args, &a)?),
            "--owner" => owner = Some(next_value(&mut args, &a)?),
            "--viewer" => viewer = Some(next_value(&mut args, &a)?),
            "--admin" => admin = true,
            "--global-admin" => global_admin = true,
            "--namespace" => namespace = next_value(&mut args, &a)?,
            "--limit" => {
                let v = next_value(&mut args, &a)?;
                limit = Some(v.parse().with_context(|| format!("--limit '{}'", v))?);
            }
            "--token" => token = Some(next_value(&mut args, &a)?),
            "--purge" => purge = true,
            "--config" => config_path = Some(next_value(&mut args, &a)?),
            "-h" | "--help" => { print_usage(&program); return Ok(()); }
            other => { print_usage(&program); return Err(anyhow!("unknown argument '{}'", other)); }
        }
    }
    let (Some(seed_path), Some(owner)) = (seed_path, owner) else {
        print_usage(&program);
        return Err(anyhow!("--seed and --owner are required"));
    };

    let config = match config_path {
        Some(p) => GlobalLibraryConfig::load(p)?,
        None => GlobalLibraryConfig::default(),
    }.with_env_overrides()?;

    let seed = Seed::load(&seed_path)?;
    let store = MemoryStore::from_seed(&seed)?;
    info!(target: "meeting_library", "seed loaded: path='{}' principals={} resources={}", seed_path, seed.principals.len(), seed.resources.len());
    let service = LibraryService::with_memory_store(config, &store);

    let ctx = match viewer {
        Some(v) => {
            let mut p = Principal::user(v);
            if admin { p = p.with_role(ROLE_ADMIN); }
            if global_admin { p = p.with_role(ROLE_GLOBAL_ADMIN); }
            RequestContext::for_principal(p)
        }
        None => RequestContext::anonymous(),
    };

    let mut page = service.get_library(&namespace, &owner, &ctx, token.as_deref(), limit)?;
    if purge {
        service.purge(&namespace, &owner)?;
        page = service.get_library(&namespace, &owner, &ctx, token.as_deref(), limit)?;
    }
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
