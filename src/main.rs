//! dm CLI - personal command-line launcher.

use clap::{Parser, Subcommand};
use dm::cli::{self, Context};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Get the version string.
///
/// - Release builds (on a git tag): "0.3.0"
/// - Development builds: "0.3.0-dev (abc1234)"
/// - Dirty working directory: "0.3.0-dev (abc1234-dirty)"
fn version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("DM_GIT_HASH");
    const IS_RELEASE: &str = env!("DM_IS_RELEASE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            VERSION.to_string()
        } else {
            format!("{VERSION}-dev ({GIT_HASH})")
        }
    })
}

#[derive(Parser)]
#[command(name = "dm")]
#[command(author, version = version(), about = "Personal command-line launcher", long_about = None)]
struct Cli {
    /// Config profile to apply (overrides DM_PROFILE).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Ignore and don't write the merged-config cache.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Debug logging on stderr (overrides DM_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Opens the interactive menu when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the directory for a jump, or list jumps.
    Jump {
        /// Jump name or unique prefix.
        name: Option<String>,
    },

    /// Print shell integration (bash, zsh, powershell).
    Init {
        /// Shell to generate for.
        shell: String,

        /// Name of the generated function.
        #[arg(long, default_value = "j")]
        cmd: String,
    },

    /// Run an alias, or list aliases.
    Run {
        /// Alias name or unique prefix.
        name: Option<String>,

        /// Extra arguments appended to the command.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a project action, or list projects/actions.
    Project {
        /// Project name or unique prefix.
        name: Option<String>,

        /// Action name or unique prefix.
        action: Option<String>,

        /// Extra arguments appended to the command.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a plugin, or list plugins.
    Plugin {
        /// Plugin name or unique prefix.
        name: Option<String>,

        /// Arguments passed to the plugin.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Packs and their knowledge docs.
    Pack {
        #[command(subcommand)]
        command: Option<PackCommand>,
    },

    /// List everything dm can launch.
    List,

    /// Find files.
    Find(cli::find::FindArgs),

    /// Batch-rename files (dry run unless --apply).
    Rename(cli::rename::RenameArgs),

    /// Show recently modified files.
    Recent {
        /// Duration (e.g., "7d", "24h", "30m"). Defaults to 7d.
        #[arg(default_value = "7d")]
        within: String,

        /// Maximum number of files to show. Defaults to 20.
        #[arg(short, long)]
        limit: Option<usize>,

        /// Directory to search. Defaults to the current directory.
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Remove empty directories (dry run unless --apply).
    CleanEmpty {
        /// Directory to clean. Defaults to the current directory.
        root: Option<PathBuf>,

        /// Directory names to leave alone.
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Actually remove the directories.
        #[arg(long)]
        apply: bool,
    },

    /// Zip a directory into a timestamped archive.
    Backup {
        /// Directory to back up.
        source: PathBuf,

        /// Where to write the archive. Defaults to backup.dest.
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Globs to leave out.
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Describe this machine and session.
    Snapshot {
        /// Print JSON.
        #[arg(long)]
        json: bool,

        /// Also save to $DM_HOME/snapshots.
        #[arg(long)]
        save: bool,
    },

    /// Check configuration and environment health.
    Doctor {
        /// Print JSON.
        #[arg(long)]
        json: bool,
    },

    /// Inspect the configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Open the interactive menu.
    Menu,
}

#[derive(Subcommand)]
enum PackCommand {
    /// List packs (* marks enabled).
    List,

    /// List a pack's knowledge docs.
    Docs {
        /// Pack name.
        pack: String,
    },

    /// Print a knowledge doc.
    Show {
        /// Pack name.
        pack: String,

        /// Doc name.
        doc: String,
    },

    /// Search knowledge docs of enabled packs.
    Grep {
        /// Case-insensitive search term.
        term: String,

        /// Search only this pack.
        #[arg(short, long)]
        pack: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the merged configuration.
    Show,

    /// Print config, home and cache locations.
    Path,

    /// Delete cached merged configs.
    ClearCache,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("DM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run a command, returning the process exit code.
fn dispatch(cli: Cli) -> dm::Result<i32> {
    let profile = cli.profile;
    let no_cache = cli.no_cache;
    let ctx = || Context::load(profile.clone(), no_cache);

    let Some(command) = cli.command else {
        cli::menu::run(&ctx()?, version())?;
        return Ok(0);
    };

    match command {
        Commands::Jump { name } => cli::jump::run(&ctx()?, name.as_deref())?,
        Commands::Init { shell, cmd } => cli::init::run(&shell, &cmd)?,
        Commands::Run { name, args } => return cli::alias::run(&ctx()?, name.as_deref(), &args),
        Commands::Project { name, action, args } => {
            return cli::project::run(&ctx()?, name.as_deref(), action.as_deref(), &args);
        }
        Commands::Plugin { name, args } => {
            return cli::plugin::run(&ctx()?, name.as_deref(), &args);
        }
        Commands::Pack { command } => {
            let ctx = ctx()?;
            match command.unwrap_or(PackCommand::List) {
                PackCommand::List => cli::pack::list(&ctx)?,
                PackCommand::Docs { pack } => cli::pack::docs(&ctx, &pack)?,
                PackCommand::Show { pack, doc } => cli::pack::show(&ctx, &pack, &doc)?,
                PackCommand::Grep { term, pack } => cli::pack::grep(&ctx, &term, pack.as_deref())?,
            }
        }
        Commands::List => cli::list::run(&ctx()?)?,
        Commands::Find(args) => cli::find::run(&ctx()?, args)?,
        Commands::Rename(args) => cli::rename::run(args)?,
        Commands::Recent {
            within,
            limit,
            root,
        } => cli::recent::run(&ctx()?, &within, limit, root)?,
        Commands::CleanEmpty {
            root,
            exclude,
            apply,
        } => cli::clean::run(&ctx()?, root, &exclude, apply)?,
        Commands::Backup {
            source,
            dest,
            exclude,
        } => cli::backup::run(&ctx()?, &source, dest, &exclude)?,
        Commands::Snapshot { json, save } => cli::snapshot::run(&ctx()?, version(), json, save)?,
        Commands::Doctor { json } => return cli::doctor::run(profile.clone(), no_cache, json),
        Commands::Config { command } => match command {
            ConfigCommand::Show => cli::config::show(&ctx()?)?,
            ConfigCommand::Path => cli::config::path(profile.clone()),
            ConfigCommand::ClearCache => cli::config::clear_cache()?,
        },
        Commands::Menu => cli::menu::run(&ctx()?, version())?,
    }

    Ok(0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dispatch(cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("dm: error: {e}");
            ExitCode::FAILURE
        }
    }
}
