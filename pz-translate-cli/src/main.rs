use std::{collections::HashMap, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pz_translate::{CancelFlag, WarningLog};
use tracing_subscriber::EnvFilter;

use pz_translate_cli::{
    Config, Provider, TranslateArgs, gitattributes,
    inspect::{run_extract_command, run_template_command},
    load_registry,
    project::resolve_target,
    reencode::{parse_override, reencode_dir},
    run_translate_command, target_dir,
    validation::{validate_directory, validate_file_path, validate_language_id},
};

const EXIT_FAILURE: i32 = 1;
const EXIT_CANCELLED: i32 = 130;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: pz-translate.toml in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a project, a mod or a translate directory.
    Translate {
        /// Project, mod or translate directory (default: from the config file)
        dir: Option<PathBuf>,

        /// Source language id
        #[arg(long)]
        source: Option<String>,

        /// Language to translate; repeat for several
        #[arg(short, long = "language")]
        languages: Vec<String>,

        /// File type to translate, like UI or Sandbox; repeat for several
        #[arg(short, long = "file")]
        files: Vec<String>,

        /// Translate directory whose texts override existing translations
        #[arg(long)]
        import: Option<PathBuf>,

        /// Number of files translated at the same time
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Translation provider
        #[arg(long, value_enum)]
        provider: Option<Provider>,

        /// Translate texts one request at a time
        #[arg(long)]
        no_batch: bool,
    },

    /// Print the texts and warnings of one file as JSON.
    Extract {
        /// The input file
        file: PathBuf,

        /// Language id of the file (default: from its name)
        #[arg(long)]
        language: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the template of one file.
    Template {
        /// The input file
        file: PathBuf,

        /// Language id of the file (default: from its name)
        #[arg(long)]
        language: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the .gitattributes encoding manifest.
    Gitattributes {
        /// Translate directory (default: from the config file)
        dir: Option<PathBuf>,

        /// Replace an existing manifest
        #[arg(long)]
        force: bool,
    },

    /// Re-encode existing files in each language's charset.
    Reencode {
        /// Translate directory (default: from the config file)
        dir: Option<PathBuf>,

        /// Charset the files of a language are currently in, as LANG=CHARSET
        #[arg(long = "from", value_parser = parse_override)]
        from: Vec<(String, String)>,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn finish(warnings: &WarningLog) {
    println!("Finished with {} warnings.", warnings.count());
}

fn run_translate(config: Config) -> Result<i32, String> {
    let registry = load_registry(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {}", e))?;
    let cancel = CancelFlag::new();

    let summary = runtime.block_on(async {
        let flag = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Cancelling; waiting for running requests to finish");
                flag.cancel();
            }
        });
        run_translate_command(&config, &registry, cancel.clone()).await
    })?;

    println!(
        "✅ Wrote {} files ({} texts machine translated, {} passes interrupted)",
        summary.written, summary.translated, summary.interrupted
    );
    finish(&summary.warnings);
    Ok(if summary.cancelled { EXIT_CANCELLED } else { 0 })
}

fn run(args: Args) -> Result<i32, String> {
    let mut config = Config::discover(args.config.as_deref())?;

    match args.commands {
        Commands::Translate {
            dir,
            source,
            languages,
            files,
            import,
            jobs,
            provider,
            no_batch,
        } => {
            let overrides = TranslateArgs {
                dir,
                source,
                languages,
                files,
                import,
                jobs,
                provider,
                no_batch,
            };
            overrides.apply(&mut config);
            run_translate(config)
        }
        Commands::Extract {
            file,
            language,
            output,
        } => {
            validate_file_path(&file)?;
            let registry = load_registry(&config)?;
            if let Some(language) = &language {
                validate_language_id(language, &registry)?;
            }
            run_extract_command(&file, language.as_deref(), output.as_deref(), &registry)?;
            Ok(0)
        }
        Commands::Template {
            file,
            language,
            output,
        } => {
            validate_file_path(&file)?;
            let registry = load_registry(&config)?;
            if let Some(language) = &language {
                validate_language_id(language, &registry)?;
            }
            run_template_command(&file, language.as_deref(), output.as_deref(), &registry)?;
            Ok(0)
        }
        Commands::Gitattributes { dir, force } => {
            let dir = target_dir(dir.as_deref(), &config);
            validate_directory(&dir)?;
            let registry = load_registry(&config)?;
            let mut warnings = WarningLog::new();
            for translate_dir in resolve_target(&dir, &mut warnings)?.translate_dirs() {
                if gitattributes::write_manifest(&translate_dir, &registry, force)? {
                    println!("✅ Wrote {}", translate_dir.join(gitattributes::FILE_NAME).display());
                } else {
                    println!(
                        "{} already exists; use --force to replace it",
                        translate_dir.join(gitattributes::FILE_NAME).display()
                    );
                }
            }
            finish(&warnings);
            Ok(0)
        }
        Commands::Reencode { dir, from } => {
            let dir = target_dir(dir.as_deref(), &config);
            validate_directory(&dir)?;
            let registry = load_registry(&config)?;
            for (language, _) in &from {
                validate_language_id(language, &registry)?;
            }
            let read_as: HashMap<String, String> = from.into_iter().collect();
            let mut warnings = WarningLog::new();
            let mut files = 0;
            for translate_dir in resolve_target(&dir, &mut warnings)?.translate_dirs() {
                let report = reencode_dir(
                    &translate_dir,
                    &config.translate.source,
                    &registry,
                    &read_as,
                    &mut warnings,
                )?;
                files += report.files;
            }
            println!("✅ Re-encoded {} files", files);
            finish(&warnings);
            Ok(0)
        }
        Commands::Completions { shell } => {
            let mut command = Args::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(0)
        }
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose, args.quiet);

    let code = match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {}", e);
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}
