use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::{debug, info};

use apigen_core::config::{self, ApigenConfig, CONFIG_FILE_NAME, TargetKind};
use apigen_core::error::GenerateError;
use apigen_core::parse;
use apigen_core::parse::spec::OpenApiDocument;
use apigen_core::{ClientGenerator, CodeGenerator, GeneratedFile};
use apigen_csharp::{CSharpGenerator, CSharpLanguage, CSharpRenderer};
use apigen_typescript::{TypeScriptGenerator, TypeScriptLanguage, TypeScriptRenderer};

#[derive(Parser)]
#[command(
    name = "apigen",
    about = "OpenAPI 3.x client generator for C# and TypeScript",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate client code for every target in the config
    Generate {
        /// Path to the OpenAPI document (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only generate this target
        #[arg(short, long, value_enum)]
        target: Option<Target>,
    },

    /// Parse a document and check that every operation can be generated
    Validate {
        /// Path to the OpenAPI document (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Dump the resolved client and type models
    Inspect {
        /// Path to the OpenAPI document (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Language whose type names appear in the dump
        #[arg(short, long, value_enum, default_value_t = Target::Csharp)]
        target: Target,

        /// Output format
        #[arg(long, value_enum, default_value_t = InspectFormat::Yaml)]
        format: InspectFormat,
    },

    /// Create a default .apigen.yaml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Csharp,
    Typescript,
}

impl From<Target> for TargetKind {
    fn from(target: Target) -> Self {
        match target {
            Target::Csharp => TargetKind::Csharp,
            Target::Typescript => TargetKind::Typescript,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            target,
        } => cmd_generate(input, output, target),
        Commands::Validate { input } => cmd_validate(input),
        Commands::Inspect {
            input,
            target,
            format,
        } => cmd_inspect(input, target, format),
        Commands::Init { force } => cmd_init(force),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "apigen", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn try_load_config() -> Result<Option<ApigenConfig>> {
    let path = Path::new(CONFIG_FILE_NAME);
    let loaded = config::load_config(path).map_err(|e| anyhow!(e))?;
    if loaded.is_some() {
        debug!("loaded {}", path.display());
    }
    Ok(loaded)
}

fn resolve_input(input: Option<PathBuf>, config: &ApigenConfig) -> PathBuf {
    input.unwrap_or_else(|| PathBuf::from(&config.input))
}

fn load_document(path: &Path) -> Result<OpenApiDocument> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let document = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse::from_json(&content),
        Some("yaml" | "yml") => parse::from_yaml(&content),
        _ => parse::from_str(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(document)
}

fn get_generator(
    target: TargetKind,
) -> Box<dyn CodeGenerator<Config = ApigenConfig, Error = GenerateError>> {
    match target {
        TargetKind::Csharp => Box::new(CSharpGenerator),
        TargetKind::Typescript => Box::new(TypeScriptGenerator),
    }
}

fn write_files(output_dir: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = output_dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

fn cmd_generate(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    target: Option<Target>,
) -> Result<()> {
    let config = try_load_config()?.unwrap_or_default();
    let input = resolve_input(input, &config);
    let output = output.unwrap_or_else(|| PathBuf::from(&config.output));
    let document = load_document(&input)?;

    let targets: Vec<TargetKind> = match target {
        Some(target) => vec![target.into()],
        None => config.targets.clone(),
    };
    if targets.is_empty() {
        bail!("no targets configured in {CONFIG_FILE_NAME}");
    }

    for target in targets {
        let dir = output.join(target.dir_name());
        info!("generating {} client into {}", target.dir_name(), dir.display());

        let files = get_generator(target)
            .generate(&document, &config)
            .with_context(|| format!("failed to generate {} client", target.dir_name()))?;
        write_files(&dir, &files)?;
        eprintln!("Generated {} file(s) in {}", files.len(), dir.display());
    }
    Ok(())
}

fn cmd_validate(input: Option<PathBuf>) -> Result<()> {
    let config = try_load_config()?.unwrap_or_default();
    let input = resolve_input(input, &config);
    let document = load_document(&input)?;

    let language = CSharpLanguage::from_options(&config.csharp);
    let renderer = CSharpRenderer::new(&config.settings.type_naming)?;
    let models = ClientGenerator::new(&config.settings, &language, &renderer)
        .build_models(&document)
        .with_context(|| format!("{} cannot be generated", input.display()))?;

    let operations: usize = models.clients.iter().map(|c| c.operations.len()).sum();
    eprintln!(
        "Valid: {} v{} (OpenAPI {})",
        document.info.title, document.info.version, document.openapi
    );
    eprintln!("  {} paths, {} operations", document.paths.len(), operations);
    eprintln!("  {} clients, {} types", models.clients.len(), models.dtos.len());
    Ok(())
}

fn cmd_inspect(input: Option<PathBuf>, target: Target, format: InspectFormat) -> Result<()> {
    let config = try_load_config()?.unwrap_or_default();
    let input = resolve_input(input, &config);
    let document = load_document(&input)?;

    let models = match target {
        Target::Csharp => {
            let language = CSharpLanguage::from_options(&config.csharp);
            let renderer = CSharpRenderer::new(&config.settings.type_naming)?;
            ClientGenerator::new(&config.settings, &language, &renderer).build_models(&document)?
        }
        Target::Typescript => {
            let language = TypeScriptLanguage::from_options(&config.typescript);
            let renderer =
                TypeScriptRenderer::new(&config.settings.type_naming, config.typescript.template)?;
            ClientGenerator::new(&config.settings, &language, &renderer).build_models(&document)?
        }
    };

    let summary = serde_json::json!({
        "title": document.info.title,
        "version": document.info.version,
        "clients": models.clients,
        "types": models.dtos,
        "utilities": models.utilities,
    });

    let text = match format {
        InspectFormat::Yaml => serde_yaml_ng::to_string(&summary)?,
        InspectFormat::Json => serde_json::to_string_pretty(&summary)?,
    };
    println!("{text}");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!("{CONFIG_FILE_NAME} already exists (use --force to overwrite)");
    }
    fs::write(path, config::default_config_content())
        .with_context(|| format!("failed to write {CONFIG_FILE_NAME}"))?;
    eprintln!("Created {CONFIG_FILE_NAME}");
    Ok(())
}
