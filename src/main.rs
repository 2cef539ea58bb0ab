//! deploy-trust: synthesizes the cross-account CI/CD IAM stacks.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use deploy_trust::{
    CrossAccountParameters, DEFAULT_PARAMETER_FILE, Stack, StackEnvironment, TargetAccountConfig,
    ToolsAccountConfig, build_target_account_stack, build_tools_account_stack, load_parameters,
    write_assembly,
};

/// Declares the roles, user and secret that let a CI runner in a tools
/// account deploy into target accounts.
#[derive(Parser, Debug)]
#[command(name = "deploy-trust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write templates and a manifest to the output directory
    Synth {
        #[command(subcommand)]
        stack: StackCommand,

        /// Output directory
        #[arg(long, default_value = "cdk.out", global = true)]
        out: PathBuf,
    },

    /// Print the rendered template to stdout
    Print {
        #[command(subcommand)]
        stack: StackCommand,
    },

    /// Print the JSON schema of the parameter file
    Schema,
}

#[derive(Subcommand, Debug)]
enum StackCommand {
    /// The per-environment stack: execution role and cross-account role
    Target(TargetArgs),

    /// The tools-account stack: deployment user, access key and secret
    Tools(ToolsArgs),
}

#[derive(Args, Debug)]
struct EnvArgs {
    /// Account id the stack is deployed into
    #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
    account: Option<String>,

    /// Region the stack is deployed into
    #[arg(long, env = "CDK_DEFAULT_REGION")]
    region: Option<String>,
}

#[derive(Args, Debug)]
struct TargetArgs {
    #[command(flatten)]
    env: EnvArgs,

    /// ARN of the tools-account identity allowed to assume the cross-account role
    #[arg(long, env = "TRUSTED_PRINCIPAL_ARN")]
    trusted_principal_arn: Option<String>,

    /// Override the stack name
    #[arg(long)]
    stack_name: Option<String>,
}

#[derive(Args, Debug)]
struct ToolsArgs {
    #[command(flatten)]
    env: EnvArgs,

    /// Parameter file mapping environment names to cross-account role ARNs
    #[arg(long, default_value = DEFAULT_PARAMETER_FILE)]
    params: PathBuf,

    /// Override the stack name
    #[arg(long)]
    stack_name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the flags when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Synth { stack, out } => {
            let stack = build_stack(&stack)?;
            let manifest = write_assembly(&out, std::slice::from_ref(&stack))
                .with_context(|| format!("failed to write assembly to {}", out.display()))?;
            info!(
                event = "Synth",
                phase = "Done",
                out = out.display().to_string(),
                stacks = manifest.stacks.len()
            );
            println!("{stack}");
            Ok(())
        }

        Commands::Print { stack } => {
            let stack = build_stack(&stack)?;
            let template = stack.to_template()?;
            println!("{}", serde_json::to_string_pretty(&template)?);
            Ok(())
        }

        Commands::Schema => {
            let schema = <CrossAccountParameters as utoipa::PartialSchema>::schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn environment(args: &EnvArgs) -> anyhow::Result<StackEnvironment> {
    StackEnvironment::from_parts(args.account.clone(), args.region.clone())
        .context("invalid deployment environment (set --account/--region or CDK_DEFAULT_ACCOUNT/CDK_DEFAULT_REGION)")
}

fn build_stack(command: &StackCommand) -> anyhow::Result<Stack> {
    match command {
        StackCommand::Target(args) => {
            let mut config =
                TargetAccountConfig::new(environment(&args.env)?, args.trusted_principal_arn.as_deref())
                    .context("invalid target-account configuration")?;
            if let Some(name) = &args.stack_name {
                config = config.with_stack_name(name);
            }
            build_target_account_stack(&config).context("failed to declare target-account stack")
        }

        StackCommand::Tools(args) => {
            let params = load_parameters(&args.params)
                .with_context(|| format!("failed to load {}", args.params.display()))?;
            let mut config =
                ToolsAccountConfig::new(environment(&args.env)?, params.cross_account_role_arn)
                    .context("invalid tools-account configuration")?;
            if let Some(name) = &args.stack_name {
                config = config.with_stack_name(name);
            }
            build_tools_account_stack(&config).context("failed to declare tools-account stack")
        }
    }
}
