//! PDF Remote Signer CLI
//!
//! Signs PDF documents through a remote signing backend, with the signature
//! itself produced by the local certificate agent.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use pdf_remote_signer::{
    services::read_candidate, AgentConfig, CertificateProvider, ClientConfiguration,
    ConfigManager, DigestAlgorithm, DownloadTarget, ExportFormat, FileNaming, LocalAgentProvider,
    ProgressFactory, ProgressStyle, RemoteSigningClient, RemoteSigningConfig, SigningError,
    SigningIdentity, SigningWorkflow, Thumbprint, WorkflowOptions,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pdf-remote-signer")]
#[command(about = "Sign PDF documents with a local certificate through a remote signing backend")]
#[command(long_about = "
PDF Remote Signer - two-phase remote PDF signing client

EXAMPLES:
    # List the certificates usable for signing
    pdf-remote-signer certificates

    # Sign a document with a chosen certificate
    pdf-remote-signer sign contract.pdf --thumbprint 5F1C0A...

    # Name the output after the source document
    pdf-remote-signer sign contract.pdf -t 5F1C0A... --derive-name -o ./signed

    # Point at another backend
    pdf-remote-signer config set api_base_url https://sign.example.com/api

ENVIRONMENT VARIABLES:
    PDF_SIGNER_AGENT_TOKEN   Bearer token for the local signing agent
    RUST_LOG                 Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List certificates offered by the local signing agent
    Certificates {
        /// Include certificates that are not eligible for signing
        #[arg(short, long)]
        all: bool,

        /// Local signing agent URL (overrides config)
        #[arg(long, value_name = "URL")]
        agent_url: Option<String>,

        /// Bearer token for the local signing agent
        #[arg(
            long,
            value_name = "TOKEN",
            env = "PDF_SIGNER_AGENT_TOKEN",
            hide_env_values = true
        )]
        agent_token: Option<String>,
    },

    /// Sign a PDF document
    Sign {
        /// PDF document to sign
        #[arg(value_name = "INPUT_FILE")]
        input_file: PathBuf,

        /// Thumbprint of the signing certificate
        #[arg(short, long, value_name = "THUMBPRINT")]
        thumbprint: String,

        /// Directory the signed document is written to (overrides config)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// File name of the signed document (overrides config)
        #[arg(short = 'n', long, value_name = "NAME", conflicts_with = "derive_name")]
        output_name: Option<String>,

        /// Name the signed document `<input>-signed.pdf`
        #[arg(long)]
        derive_name: bool,

        /// Media type of the input (derived from the extension by default)
        #[arg(long, value_name = "TYPE")]
        media_type: Option<String>,

        /// Signing backend API base URL (overrides config)
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,

        /// Local signing agent URL (overrides config)
        #[arg(long, value_name = "URL")]
        agent_url: Option<String>,

        /// Bearer token for the local signing agent
        #[arg(
            long,
            value_name = "TOKEN",
            env = "PDF_SIGNER_AGENT_TOKEN",
            hide_env_values = true
        )]
        agent_token: Option<String>,

        /// Digest algorithm the agent applies
        #[arg(long, value_enum)]
        digest: Option<DigestAlgorithmArg>,

        /// Progress indicator style
        #[arg(long, value_enum)]
        progress: Option<ProgressStyleArg>,

        /// Dry run - validate configuration and input without signing
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Create default configuration file
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Export configuration
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import configuration
    Import {
        /// Configuration file to import
        file: PathBuf,
        /// Import format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum DigestAlgorithmArg {
    Sha256,
    Sha384,
    Sha512,
}

impl From<DigestAlgorithmArg> for DigestAlgorithm {
    fn from(arg: DigestAlgorithmArg) -> Self {
        match arg {
            DigestAlgorithmArg::Sha256 => DigestAlgorithm::Sha256,
            DigestAlgorithmArg::Sha384 => DigestAlgorithm::Sha384,
            DigestAlgorithmArg::Sha512 => DigestAlgorithm::Sha512,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum ProgressStyleArg {
    Spinner,
    Plain,
    Silent,
}

impl From<ProgressStyleArg> for ProgressStyle {
    fn from(arg: ProgressStyleArg) -> Self {
        match arg {
            ProgressStyleArg::Spinner => ProgressStyle::Spinner,
            ProgressStyleArg::Plain => ProgressStyle::Plain,
            ProgressStyleArg::Silent => ProgressStyle::Silent,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum ExportFormatArg {
    Toml,
    Json,
    Yaml,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Toml => ExportFormat::Toml,
            ExportFormatArg::Json => ExportFormat::Json,
            ExportFormatArg::Yaml => ExportFormat::Yaml,
        }
    }
}

/// Parameters for the sign command
struct SignCommandArgs {
    input_file: PathBuf,
    thumbprint: String,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
    derive_name: bool,
    media_type: Option<String>,
    api_url: Option<String>,
    agent_url: Option<String>,
    agent_token: Option<String>,
    digest: Option<DigestAlgorithmArg>,
    progress: Option<ProgressStyleArg>,
    dry_run: bool,
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Certificates {
            all,
            agent_url,
            agent_token,
        } => {
            handle_certificates_command(all, agent_url, agent_token).await?;
        }

        Commands::Sign {
            input_file,
            thumbprint,
            output_dir,
            output_name,
            derive_name,
            media_type,
            api_url,
            agent_url,
            agent_token,
            digest,
            progress,
            dry_run,
        } => {
            let args = SignCommandArgs {
                input_file,
                thumbprint,
                output_dir,
                output_name,
                derive_name,
                media_type,
                api_url,
                agent_url,
                agent_token,
                digest,
                progress,
                dry_run,
                verbose: cli.verbose,
            };
            handle_sign_command(args).await?;
        }

        Commands::Config(config_cmd) => {
            handle_config_command(config_cmd)?;
        }
    }

    Ok(())
}

/// Configuration file values, or defaults when there is no file.
///
/// A file that exists but does not load is an error, never a fallback.
fn load_configuration(config_manager: &ConfigManager) -> Result<ClientConfiguration> {
    config_manager
        .load_or_default()
        .into_diagnostic()
        .context("Configuration file is not usable")
}

fn build_agent(
    config: &ClientConfiguration,
    agent_token: Option<String>,
) -> Result<LocalAgentProvider> {
    let mut agent_config = AgentConfig::new(config.agent_url().into_diagnostic()?)
        .with_timeout(config.network_timeout_seconds);
    if let Some(token) = agent_token {
        agent_config = agent_config.with_token(token);
    }
    if !config.verify_tls {
        agent_config = agent_config.with_insecure_tls();
    }

    LocalAgentProvider::new(agent_config)
        .into_diagnostic()
        .context("Failed to create signing agent client")
}

fn build_remote(config: &ClientConfiguration) -> Result<RemoteSigningClient> {
    let mut remote_config = RemoteSigningConfig::new(config.api_base_url().into_diagnostic()?)
        .with_timeout(config.network_timeout_seconds);
    if !config.verify_tls {
        remote_config = remote_config.with_insecure_tls();
    }

    RemoteSigningClient::new(remote_config)
        .into_diagnostic()
        .context("Failed to create signing backend client")
}

fn print_identity(identity: &SigningIdentity, show_eligibility: bool) {
    println!("  {}", identity.thumbprint());
    println!("    Subject: {}", identity.subject_name());
    if let Some(issuer) = identity.issuer_name() {
        println!("    Issuer: {issuer}");
    }
    let identifiers = identity.identifiers();
    if let Some(cpf) = &identifiers.cpf {
        println!("    CPF: {cpf}");
    }
    if let Some(cnpj) = &identifiers.cnpj {
        println!("    CNPJ: {cnpj}");
    }
    if show_eligibility && !identity.is_eligible() {
        println!("    (not eligible: no CPF or CNPJ in subject)");
    }
}

async fn handle_certificates_command(
    all: bool,
    agent_url: Option<String>,
    agent_token: Option<String>,
) -> Result<()> {
    let mut config = load_configuration(&ConfigManager::new().into_diagnostic()?)?;
    if let Some(url) = agent_url {
        config.agent_url = url;
    }

    let agent = build_agent(&config, agent_token)?;
    agent
        .initialize()
        .await
        .into_diagnostic()
        .context("Failed to connect to the local signing agent")?;

    let identities: Vec<SigningIdentity> = agent
        .list_identities()
        .await
        .into_diagnostic()?
        .into_iter()
        .filter(|identity| all || identity.is_eligible())
        .collect();

    if identities.is_empty() {
        println!("No certificates available for signing.");
        return Ok(());
    }

    println!("Certificates ({}):", identities.len());
    for identity in &identities {
        print_identity(identity, all);
    }

    Ok(())
}

async fn handle_sign_command(args: SignCommandArgs) -> Result<()> {
    let mut config = load_configuration(&ConfigManager::new().into_diagnostic()?)?;

    // Command line arguments override the configuration file
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    if let Some(url) = args.agent_url {
        config.agent_url = url;
    }
    if let Some(digest) = args.digest {
        config.digest_algorithm = DigestAlgorithm::from(digest).as_str().to_string();
    }
    if let Some(dir) = args.output_dir {
        config.download_directory = dir;
    }
    if let Some(name) = args.output_name {
        config.download_file_name = name;
        config.derive_file_name = false;
    }
    if args.derive_name {
        config.derive_file_name = true;
    }
    config.verbose |= args.verbose;

    config
        .validate()
        .into_diagnostic()
        .context("Invalid signing configuration")?;

    let thumbprint = Thumbprint::new(&args.thumbprint)
        .into_diagnostic()
        .context("Invalid certificate thumbprint")?;
    let digest_algorithm = config.digest_algorithm().into_diagnostic()?;
    let progress_style = match args.progress {
        Some(style) => Some(style.into()),
        None => config.progress_style().into_diagnostic()?,
    };
    let naming = if config.derive_file_name {
        FileNaming::DerivedFromSource
    } else {
        FileNaming::Fixed(config.download_file_name.clone())
    };
    let download = DownloadTarget::new(config.download_directory.clone(), naming);

    let candidate = read_candidate(&args.input_file, args.media_type.as_deref())
        .await
        .into_diagnostic()?;

    if args.dry_run {
        println!("🔍 Dry run mode - validating configuration");
        println!("  Input file: {}", args.input_file.display());
        println!("  Media type: {}", candidate.media_type);
        println!(
            "  Output file: {}",
            download
                .directory()
                .join(download.file_name_for(&candidate.file_name))
                .display()
        );
        println!("  Certificate: {thumbprint}");
        println!("  Digest algorithm: {digest_algorithm}");
        println!("  Signing backend: {}", config.api_base_url);
        println!("  Signing agent: {}", config.agent_url);
        if !candidate.is_pdf() {
            println!("❌ Input is not a PDF document");
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        return Ok(());
    }

    let agent = build_agent(&config, args.agent_token)?;
    let remote = build_remote(&config)?;
    let mut workflow = SigningWorkflow::new(
        Arc::new(agent),
        Arc::new(remote),
        WorkflowOptions {
            digest_algorithm,
            download,
        },
    )
    .with_progress(ProgressFactory::create_reporter(progress_style));

    let result = run_signing(&mut workflow, candidate, &thumbprint).await;
    match result {
        Ok(outcome) => {
            println!("✅ Document signed successfully!");
            println!("  Output: {}", outcome.path.display());
            println!("  File size: {} bytes", outcome.size);
            if config.verbose {
                println!("  SHA-256: {}", outcome.sha256);
            }
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_message());
            log::debug!("{e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run_signing(
    workflow: &mut SigningWorkflow,
    candidate: pdf_remote_signer::CandidateFile,
    thumbprint: &Thumbprint,
) -> Result<pdf_remote_signer::SignOutcome, SigningError> {
    workflow.initialize().await?;
    workflow.select_file(candidate)?;
    workflow.select_identity(thumbprint)?;
    workflow.sign_document().await
}

fn print_configuration(config: &ClientConfiguration, config_manager: &ConfigManager) {
    println!("📋 Current Configuration:");
    println!("  Signing backend: {}", config.api_base_url);
    println!("  Signing agent: {}", config.agent_url);
    println!("  Digest algorithm: {}", config.digest_algorithm);
    println!(
        "  Download directory: {}",
        config.download_directory.display()
    );
    if config.derive_file_name {
        println!("  Download file name: <input>-signed.pdf");
    } else {
        println!("  Download file name: {}", config.download_file_name);
    }
    println!("  Network timeout: {}s", config.network_timeout_seconds);
    println!("  Verify TLS: {}", config.verify_tls);
    println!("  Progress style: {}", config.progress_style);
    println!(
        "  Configuration file: {}",
        config_manager.config_path().display()
    );
}

fn handle_config_command(config_cmd: ConfigCommands) -> Result<()> {
    let config_manager = ConfigManager::new().into_diagnostic()?;

    match config_cmd {
        ConfigCommands::Show => {
            if !config_manager.config_path().exists() {
                println!("📋 No configuration file found. Use 'config init' to create one.");
                return Ok(());
            }
            let config = config_manager
                .load()
                .into_diagnostic()
                .context("Configuration file is not usable")?;
            print_configuration(&config, &config_manager);
        }

        ConfigCommands::Init => {
            let _config = config_manager.load_or_create_default().into_diagnostic()?;
            println!(
                "✅ Configuration initialized: {}",
                config_manager.config_path().display()
            );
            println!("   Edit the file to customize settings, or use 'config set' commands.");
        }

        ConfigCommands::Set { key, value } => {
            config_manager
                .update_value(&key, &value)
                .into_diagnostic()?;
            println!("✅ Configuration updated: {key} = {value}");
        }

        ConfigCommands::Export { format, output } => {
            let content = config_manager
                .export_config(format.into())
                .into_diagnostic()?;

            if let Some(output_path) = output {
                std::fs::write(&output_path, content).into_diagnostic()?;
                println!("✅ Configuration exported to: {}", output_path.display());
            } else {
                println!("{content}");
            }
        }

        ConfigCommands::Import { file, format } => {
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            config_manager
                .import_config(&content, format.into())
                .into_diagnostic()?;
            println!("✅ Configuration imported from: {}", file.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_sign_arguments() {
        let cli = Cli::parse_from([
            "pdf-remote-signer",
            "sign",
            "contract.pdf",
            "--thumbprint",
            "5F1C0A",
            "--digest",
            "sha384",
            "--derive-name",
            "-v",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Sign {
                input_file,
                thumbprint,
                digest,
                derive_name,
                ..
            } => {
                assert_eq!(input_file, PathBuf::from("contract.pdf"));
                assert_eq!(thumbprint, "5F1C0A");
                assert_eq!(
                    DigestAlgorithm::from(digest.unwrap()),
                    DigestAlgorithm::Sha384
                );
                assert!(derive_name);
            }
            _ => panic!("expected sign command"),
        }
    }

    #[test]
    fn test_output_name_conflicts_with_derive_name() {
        let result = Cli::try_parse_from([
            "pdf-remote-signer",
            "sign",
            "a.pdf",
            "-t",
            "AA",
            "--output-name",
            "x.pdf",
            "--derive-name",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_agent_token_flag() {
        let cli = Cli::parse_from([
            "pdf-remote-signer",
            "certificates",
            "--agent-token",
            "s3cret",
        ]);
        match cli.command {
            Commands::Certificates { agent_token, .. } => {
                assert_eq!(agent_token.as_deref(), Some("s3cret"));
            }
            _ => panic!("expected certificates command"),
        }
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.toml"));

        let config = load_configuration(&manager).unwrap();
        assert_eq!(config, ClientConfiguration::default());
    }

    #[test]
    fn test_broken_config_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pdf-remote-signer").join("config.toml");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "api_base_url = \"htps://sign.corp.example/api\"\n").unwrap();

        let result = load_configuration(&ConfigManager::with_path(&path));
        let report = result.unwrap_err();
        assert!(report.to_string().contains("Configuration file is not usable"));
    }
}
