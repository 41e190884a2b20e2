use std::path::PathBuf;
use clap::Parser;
use log::{debug, info};
use htmlforge::error::Error;
use htmlforge::{GenerationRequest, GeneratorConfig, HtmlGenerator};

/// Filename the generated document is saved under by default
const DEFAULT_OUTPUT: &str = "generated_app.html";

/// Generate a self-contained HTML web app from a description
#[derive(Debug, Parser)]
#[command(name = "htmlforge", version)]
struct Cli
{   /// Description of the app, e.g. "a simple calculator app"
    #[arg(required = false)]
    description: Vec<String>
  , /// JSON configuration file
    #[arg(long, env = "HTMLFORGE_CONFIG")]
    config: Option<PathBuf>
  , /// Where to write the document
    #[arg(long, short, default_value = DEFAULT_OUTPUT)]
    output: PathBuf
  , /// Also print the document source
    #[arg(long)]
    stdout: bool
}

#[tokio::main]
async fn main() -> Result<(), Error>
{   env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config
    {   Some(path) => GeneratorConfig::from_json_file(path)?
      , None => GeneratorConfig::from_env()
    };
    let generator = HtmlGenerator::from_config(config)?;

    let availability = generator.warm_up().await;
    debug!("Backend availability: {:?}", availability);
    if availability.templates_only()
    {   info!("No model available, using template generation");
    }

    let request = GenerationRequest::new(cli.description.join(" "));
    let outcome = generator.generate_detailed(&request).await;

    if let Some(notice) = outcome.notice()
    {   eprintln!("{}", notice);
    }
    if cli.stdout
    {   println!("{}", outcome.html);
    }

    std::fs::write(&cli.output, outcome.html.as_bytes()).map_err(|e| {
      Error::Other(format!("{}: {}", cli.output.display(), e))
    })?;
    eprintln!(
      "Wrote {} bytes from {:?} to {}",
      outcome.html.len(),
      outcome.backend,
      cli.output.display()
    );
    Ok(())
}
