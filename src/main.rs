use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use api_tester::{
    apply_matches, build_commands, classify, describe_index, find_operation, CliConfig,
    DescriptionError, DescriptionIndex, Outcome, RequestExecutor, Session, SynthesisOptions,
};
use clap::Parser;
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "api-tester",
    version,
    about = "Browse and invoke the operations of an OpenAPI description",
    after_help = "Run without an operation to list categories and operations."
)]
struct Cli {
    /// Parsed OpenAPI description (JSON)
    #[arg(long, env = "API_TESTER_DESCRIPTION")]
    description: PathBuf,
    /// Base URL the operation paths are appended to [default: http://localhost:8000]
    #[arg(long, env = "API_TESTER_BASE_URL")]
    base_url: Option<String>,
    /// Fail instead of substituting an empty value for unbound path parameters
    #[arg(long)]
    strict: bool,
    /// `<category> <operation> [--<param> VALUE ...] [--body TEXT]`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "OPERATION")]
    operation: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    debug!(?cli, "CLI arguments parsed");
    let raw = load_description(&cli.description)?;
    let index = DescriptionIndex::build(&raw);
    info!(
        path = %cli.description.display(),
        categories = index.categories().len(),
        operations = index.operations().len(),
        "loaded API description"
    );

    if cli.operation.is_empty() {
        print!("{}", describe_index(&index));
        return Ok(ExitCode::SUCCESS);
    }

    let config = CliConfig::default();
    let command = build_commands(&config, &index).no_binary_name(true);
    let matches = match command.try_get_matches_from(&cli.operation) {
        Ok(matches) => matches,
        Err(err) => err.exit(),
    };

    let Some((category_cmd, category_matches)) = matches.subcommand() else {
        return Err("missing category".into());
    };
    let Some((operation_cmd, op_matches)) = category_matches.subcommand() else {
        return Err("missing operation".into());
    };
    let op = find_operation(&index, category_cmd, operation_cmd)
        .ok_or_else(|| format!("unknown operation: {category_cmd} {operation_cmd}"))?;

    let mut session = Session::new(config.base_url(cli.base_url.as_deref()))
        .with_options(SynthesisOptions { strict: cli.strict });
    session.select_category(op.category.clone().unwrap_or_default());
    apply_matches(&mut session, op, op_matches);

    let executor = RequestExecutor::default();
    let (request, result) = session.invoke(&executor).await?;
    let classification = classify(result);

    eprintln!("{request}");
    eprintln!("{} ({})", classification.label, classification.display_status);
    println!("{}", serde_json::to_string_pretty(&result.payload)?);

    Ok(match classification.label {
        Outcome::Success => ExitCode::SUCCESS,
        Outcome::Failure => ExitCode::FAILURE,
    })
}

fn load_description(path: &Path) -> Result<Value, DescriptionError> {
    let content = fs::read_to_string(path).map_err(|source| DescriptionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DescriptionError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
