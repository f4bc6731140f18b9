use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use version_reconcile::cli::{run_reconciliation, write_outputs, ReconcileArgs};
use version_reconcile::config::{self, Config};
use version_reconcile::git::Git2Repository;
use version_reconcile::manifest::PubspecManifest;
use version_reconcile::ui;

#[derive(clap::Parser)]
#[command(
    name = "version-reconcile",
    version,
    about = "Reconcile the manifest version with the latest release tag and publish it"
)]
struct Args {
    #[arg(short, long, env = "INPUT_CONFIG", help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, default_value = ".", help = "Path inside the git repository")]
    repo: PathBuf,

    #[arg(short, long, env = "INPUT_BRANCH", help = "Branch that receives version bumps")]
    branch: Option<String>,

    #[arg(long, env = "INPUT_REMOTE", help = "Remote to fetch tags from and push to")]
    remote: Option<String>,

    #[arg(
        short,
        long,
        env = "INPUT_MANIFEST_PATH",
        help = "Manifest path relative to the repository root"
    )]
    manifest: Option<PathBuf>,

    #[arg(long, env = "INPUT_TAG_PREFIX", help = "Prefix for tag names (e.g. 'v')")]
    tag_prefix: Option<String>,

    #[arg(
        long,
        env = "INPUT_COMMIT_MESSAGE",
        help = "Commit message template with {previous} and {new}"
    )]
    commit_message: Option<String>,

    #[arg(
        long,
        env = "INPUT_TOKEN",
        hide_env_values = true,
        help = "Access token for pushing (falls back to GITHUB_TOKEN)"
    )]
    token: Option<String>,

    #[arg(long, help = "Use local tags only, don't fetch from the remote")]
    no_fetch: bool,

    #[arg(long, help = "Fail instead of bootstrapping when tags cannot be listed")]
    strict: bool,

    #[arg(long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(long, help = "Print the effective configuration and exit")]
    show_config: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

/// Treats empty values as unset; Actions passes unset inputs as "".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Command-line and environment values take precedence over the file.
fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(branch) = non_empty(args.branch.clone()) {
        config.git.branch = branch;
    }
    if let Some(remote) = non_empty(args.remote.clone()) {
        config.git.remote = remote;
    }
    if let Some(prefix) = args.tag_prefix.clone() {
        config.git.tag_prefix = prefix;
    }
    if let Some(message) = non_empty(args.commit_message.clone()) {
        config.git.commit_message = message;
    }
    if let Some(manifest) = args.manifest.clone().filter(|p| !p.as_os_str().is_empty()) {
        config.manifest.path = manifest;
    }
    if args.no_fetch {
        config.behavior.fetch_tags = false;
    }
    if args.strict {
        config.behavior.strict_marker_resolution = true;
    }
    config
}

fn main() -> Result<()> {
    let args = Args::parse();

    // --verbose wins; otherwise RUST_LOG, falling back to warnings only
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: Args) -> Result<()> {
    let file_config = config::load_config(args.config.as_deref())?;
    let config = apply_overrides(file_config, &args);

    if args.show_config {
        print!(
            "{}",
            toml::to_string_pretty(&config).context("Cannot render configuration")?
        );
        return Ok(());
    }

    let token = non_empty(args.token.clone())
        .or_else(|| non_empty(std::env::var("GITHUB_TOKEN").ok()));

    let repo = Git2Repository::open(&args.repo)
        .with_context(|| format!("Not in a git repository: {}", args.repo.display()))?
        .with_token(token.clone());
    let manifest = PubspecManifest::new(repo.workdir()?, config.manifest.path.clone());

    ui::display_status(&format!(
        "Reconciling {} against tags on '{}'",
        config.manifest.path.display(),
        config.git.remote
    ));

    let reconcile_args = ReconcileArgs {
        config,
        token,
        dry_run: args.dry_run,
    };
    let outcome = run_reconciliation(&repo, &manifest, &reconcile_args)?;

    for warning in &outcome.warnings {
        ui::display_warning(warning);
    }
    ui::display_plan(&outcome);

    match &outcome.result {
        Some(result) => {
            ui::display_result(result);
            write_outputs(result).context("Cannot write step outputs")?;
        }
        None => ui::display_status("Dry run: no files, commits or tags were changed"),
    }

    Ok(())
}
