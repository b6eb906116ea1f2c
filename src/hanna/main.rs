use clap::Parser;
use directories::ProjectDirs;
use hanna::api::HannaApi;
use hanna::commands::config::ConfigAction;
use hanna::commands::{CmdResult, NewSnippet, SnippetUpdate};
use hanna::config::HannaConfig;
use hanna::error::{HannaError, Result};
use hanna::model::CodeKind;
use hanna::repository::SnippetRepository;
use hanna::reserved::HostNames;
use hanna::store::sqlite::SqliteStore;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod args;
mod cli {
    pub mod print;
}

use args::{Cli, Commands};
use cli::print::{
    print_config, print_exported, print_full_snippets, print_messages, print_prepared,
    print_snippets,
};

const HOME_ENV: &str = "HANNA_HOME";
const DB_ENV: &str = "HANNA_DB";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: HannaApi<SqliteStore, HostNames>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = init_context()?;

    match cli.command {
        Some(Commands::Install) => finish(ctx.api.install()?),
        Some(Commands::Uninstall) => finish(ctx.api.uninstall()?),
        Some(Commands::Create {
            name,
            kind,
            not_consuming,
            attrs,
            code,
        }) => handle_create(&ctx, name, kind, not_consuming, attrs, code),
        Some(Commands::List { sort }) => handle_list(&ctx, sort),
        Some(Commands::View { keys }) => handle_view(&ctx, keys),
        Some(Commands::Update {
            key,
            rename,
            kind,
            consuming,
            not_consuming,
            attrs,
            clear_attrs,
            code,
            fields,
        }) => {
            let consuming = match (consuming, not_consuming) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let attrs = if clear_attrs {
                Some(String::new())
            } else if attrs.is_empty() {
                None
            } else {
                Some(attrs.join("\n"))
            };
            let update = SnippetUpdate {
                rename,
                kind: kind.as_deref().map(str::parse::<CodeKind>).transpose()?,
                consuming,
                attrs,
                code,
                fields: parse_fields(&fields)?,
            };
            finish(ctx.api.update(&key, update)?)
        }
        Some(Commands::Touch { keys }) => finish(ctx.api.touch(&keys)?),
        Some(Commands::Delete { keys }) => finish(ctx.api.delete(&keys)?),
        Some(Commands::Export { keys }) => handle_export(&ctx, keys),
        Some(Commands::Import { file }) => handle_import(&ctx, file),
        Some(Commands::Prepare { name, pairs }) => handle_prepare(&ctx, name, pairs),
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
        None => handle_list(&ctx, None),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "hanna", "hanna")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| HannaError::Api("Could not determine data dir".into()))
}

fn init_context() -> Result<AppContext> {
    let data_dir = data_dir()?;
    let config = HannaConfig::load(&data_dir)?;

    let db_path = match std::env::var_os(DB_ENV) {
        Some(path) => PathBuf::from(path),
        None => config.database_path(&data_dir),
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    debug!(path = %db_path.display(), "using database");

    let store = SqliteStore::open(&db_path)?;
    let repo = SnippetRepository::with_reserved(store, HostNames::new(&config.reserved_names))
        .with_max_name_retries(config.max_name_retries);
    let api = HannaApi::new(repo, data_dir).with_default_sort(config.sort_order());

    Ok(AppContext { api })
}

fn finish(result: CmdResult) -> Result<()> {
    print_messages(&result.messages);
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn handle_create(
    ctx: &AppContext,
    name: String,
    kind: String,
    not_consuming: bool,
    attrs: Vec<String>,
    code: Option<String>,
) -> Result<()> {
    let code = match code {
        Some(code) => code,
        None if !std::io::stdin().is_terminal() => read_stdin()?,
        None => String::new(),
    };
    let new = NewSnippet {
        name,
        kind: kind.parse()?,
        not_consuming,
        attrs: attrs.join("\n"),
        code,
    };
    finish(ctx.api.create(new)?)
}

fn handle_list(ctx: &AppContext, sort: Option<String>) -> Result<()> {
    let result = ctx.api.list(sort.as_deref())?;
    print_snippets(&result.listed);
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &AppContext, keys: Vec<String>) -> Result<()> {
    let result = ctx.api.view(&keys)?;
    print_full_snippets(&result.listed);
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, keys: Vec<String>) -> Result<()> {
    let result = ctx.api.export(&keys)?;
    print_exported(&result.exported);
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(ctx: &AppContext, file: Option<PathBuf>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => read_stdin()?,
    };
    finish(ctx.api.import(&text)?)
}

fn handle_prepare(ctx: &AppContext, name: String, pairs: Vec<String>) -> Result<()> {
    let result = ctx.api.prepare(&name, &pairs)?;
    if let Some(prepared) = &result.prepared {
        print_prepared(prepared);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let result = ctx.api.config(action.clone())?;
    if let (ConfigAction::ShowAll, Some(config)) = (&action, &result.config) {
        print_config(config);
    }
    print_messages(&result.messages);
    Ok(())
}

fn parse_fields(fields: &[String]) -> Result<Vec<(String, String)>> {
    fields
        .iter()
        .map(|f| {
            f.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| {
                    HannaError::InvalidArgument(format!("expected FIELD=VALUE, got '{}'", f))
                })
        })
        .collect()
}
