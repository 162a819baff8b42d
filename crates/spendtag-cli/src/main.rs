mod display;
mod server;

use std::io::{BufRead, BufReader};
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use spendtag_ai::config::{ENV_API_KEY, ENV_BASE_URL, ENV_MODEL, ENV_PROVIDER, ENV_TIMEOUT_SECS};
use spendtag_ai::{ModelConfig, Pipeline};
use spendtag_core::ClassificationInput;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::display::{Format, render, render_labels};

#[derive(Parser)]
#[command(name = "spendtag", version, about = "Expense categorisation: rules first, model second")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Command,
}

/// Model provider settings. Each flag overrides its `SPENDTAG_*` variable.
#[derive(Args)]
struct ModelArgs {
    /// Provider API key (falls back to SPENDTAG_API_KEY, then GEMINI_API_KEY).
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Provider: gemini or openai.
    #[arg(long, global = true)]
    provider: Option<String>,

    /// Override the provider base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Override the provider model name.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Per-request model timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<String>,

    /// Classify with rules only, even if a key is configured.
    #[arg(long, global = true)]
    no_model: bool,
}

impl ModelArgs {
    fn flag_for(&self, key: &str) -> Option<&String> {
        match key {
            k if k == ENV_API_KEY => self.api_key.as_ref(),
            k if k == ENV_PROVIDER => self.provider.as_ref(),
            k if k == ENV_BASE_URL => self.base_url.as_ref(),
            k if k == ENV_MODEL => self.model.as_ref(),
            k if k == ENV_TIMEOUT_SECS => self.timeout_secs.as_ref(),
            _ => None,
        }
    }

    /// Flags first, then the process environment.
    fn config(&self) -> anyhow::Result<Option<ModelConfig>> {
        if self.no_model {
            return Ok(None);
        }
        let config = ModelConfig::from_lookup(|key| {
            self.flag_for(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })
        .context("reading model configuration")?;
        Ok(config)
    }

    fn pipeline(&self) -> anyhow::Result<Pipeline> {
        let config = self.config()?;
        match &config {
            Some(c) => info!(provider = %c.provider, model = %c.model, timeout = ?c.timeout, "model enabled"),
            None => info!("no API key configured, using rules only"),
        }
        Pipeline::from_config(config).context("building model client")
    }
}

#[derive(Subcommand)]
enum Command {
    /// Classify a single expense.
    Classify {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Classify JSON lines ({"title": ..., "notes": ...}) from a file or stdin.
    Batch {
        /// Input file; reads stdin when omitted.
        path: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// List the category labels.
    Labels,
    /// Run the HTTP API.
    Serve {
        #[arg(long, env = "SPENDTAG_ADDR", default_value = "0.0.0.0:8080")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Classify {
            title,
            notes,
            format,
        } => {
            let pipeline = cli.model.pipeline()?;
            let input = ClassificationInput::new(title, notes);
            let result = pipeline.classify(&input).await;
            println!("{}", render(&input, &result, format)?);
        }
        Command::Batch { path, format } => {
            let pipeline = cli.model.pipeline()?;
            let inputs = match path {
                Some(path) => {
                    let file = std::fs::File::open(&path)
                        .with_context(|| format!("opening {}", path.display()))?;
                    read_inputs(BufReader::new(file))?
                }
                None => read_inputs(std::io::stdin().lock())?,
            };
            info!(count = inputs.len(), "classifying batch");
            let results = pipeline.classify_many(&inputs).await;
            for (input, result) in inputs.iter().zip(&results) {
                println!("{}", render(input, result, format)?);
            }
        }
        Command::Labels => println!("{}", render_labels()),
        Command::Serve { addr } => {
            let pipeline = cli.model.pipeline()?;
            if !pipeline.model_enabled() {
                warn!("serving without a model; every answer will be rule-based");
            }
            server::serve(addr, pipeline).await?;
        }
    }

    Ok(())
}

/// Parse one expense per non-blank line.
fn read_inputs(reader: impl BufRead) -> anyhow::Result<Vec<ClassificationInput>> {
    let mut inputs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let input: ClassificationInput = serde_json::from_str(&line)
            .with_context(|| format!("parsing line {}", idx + 1))?;
        inputs.push(input);
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_inputs_skips_blank_lines() {
        let data = "{\"title\":\"Bus\"}\n\n  \n{\"title\":\"Rent\",\"notes\":null}\n";
        let inputs = read_inputs(data.as_bytes()).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].title, "Bus");
        assert_eq!(inputs[0].notes, "");
        assert_eq!(inputs[1].title, "Rent");
    }

    #[test]
    fn read_inputs_reports_line_number() {
        let data = "{\"title\":\"ok\"}\nnot json\n";
        let err = read_inputs(data.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "parsing line 2");
    }

    #[test]
    fn flags_override_environment() {
        let args = ModelArgs {
            api_key: Some("flag-key".into()),
            provider: Some("openai".into()),
            base_url: None,
            model: None,
            timeout_secs: Some("2.5".into()),
            no_model: false,
        };
        let config = args.config().unwrap().unwrap();
        assert_eq!(config.api_key, "flag-key");
        assert_eq!(config.provider.as_str(), "openai");
        assert_eq!(config.timeout, std::time::Duration::from_millis(2500));
    }

    #[test]
    fn no_model_disables_client() {
        let args = ModelArgs {
            api_key: Some("flag-key".into()),
            provider: None,
            base_url: None,
            model: None,
            timeout_secs: None,
            no_model: true,
        };
        assert!(args.config().unwrap().is_none());
        assert!(!args.pipeline().unwrap().model_enabled());
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
        let cli = Cli::try_parse_from(["spendtag", "classify", "--title", "Uber", "--format", "text"])
            .unwrap();
        assert!(matches!(cli.command, Command::Classify { format: Format::Text, .. }));
    }
}
