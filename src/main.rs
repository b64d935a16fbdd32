mod error;
mod language;
mod openai;
mod schema;

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use structopt::StructOpt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::GenerateError;
use crate::openai::{OpenAiClient, PhraseGenerator};

const DEFAULT_MODEL: &str = "gpt-5.2";

// No Debug on purpose: the credential must never be formatted.
#[derive(Deserialize)]
struct Environment {
    openai_api_key: String,
    openai_model: Option<String>,
    openai_base_url: Option<String>,
}

#[derive(StructOpt, Debug)]
#[structopt(
    name = "animal-language-phrases",
    about = "Generate a schema-constrained batch of invented animal language phrases"
)]
struct Args {
    /// Model to invoke, overriding OPENAI_MODEL from the environment
    #[structopt(short, long)]
    model: Option<String>,

    /// Request timeout in seconds for the generation call
    #[structopt(long, default_value = "120")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::from_args();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            let code = error
                .downcast_ref::<GenerateError>()
                .map_or(1, GenerateError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let environment = envy::from_env::<Environment>().map_err(|error| {
        GenerateError::Configuration(format!("failed to read the environment: {error}"))
    })?;

    let model = args
        .model
        .or(environment.openai_model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let mut client = OpenAiClient::new(
        environment.openai_api_key,
        model,
        Duration::from_secs(args.timeout_secs),
    );
    if let Some(base_url) = environment.openai_base_url {
        client = client.with_base_url(base_url);
    }

    let mut stdout = std::io::stdout();
    run_pipeline(&client, &mut stdout).await
}

/// Ask the generator for one batch and write it out verbatim, newline
/// terminated. stdout carries nothing else; diagnostics go to stderr.
async fn run_pipeline(
    generator: &impl PhraseGenerator,
    output: &mut impl Write,
) -> anyhow::Result<()> {
    let batch = generator.generate().await?;

    writeln!(output, "{batch}").context("Failed to write phrase batch to standard output")?;

    Ok(())
}
