//! NLPA CLI - Command-line interface
//!
//! Usage:
//!   nlpa annotate <infile> <outfile>
//!   nlpa serve --port 5000
//!   nlpa --uncased annotate <infile> <outfile>

use anyhow::Context;
use clap::{Parser, Subcommand};
use nlpa_api::{logging, state::AppState};
use nlpa_core::{AppConfig, Mmif, View};
use nlpa_pipeline::Annotator;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "nlpa")]
#[command(about = "spaCy-style NLP annotation of MMIF documents")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables still override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Restore capitalization with the uncased NER model before parsing
    #[arg(long, global = true)]
    uncased: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate a MMIF file without starting a server
    Annotate {
        /// Input MMIF file
        infile: PathBuf,
        /// Where to write the annotated MMIF
        outfile: PathBuf,
    },
    /// Run the HTTP server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// Read `infile`, annotate it and write the result to `outfile`
async fn annotate_file(
    annotator: &Annotator,
    infile: &Path,
    outfile: &Path,
) -> anyhow::Result<Mmif> {
    let input = tokio::fs::read_to_string(infile)
        .await
        .with_context(|| format!("failed to read {}", infile.display()))?;

    let mmif = annotator.annotate(Mmif::from_json(&input)?).await?;

    tokio::fs::write(outfile, mmif.to_json(true)?)
        .await
        .with_context(|| format!("failed to write {}", outfile.display()))?;
    tracing::info!(views = mmif.views.len(), "Wrote {}", outfile.display());

    Ok(mmif)
}

fn view_summary(view: &View) -> String {
    format!(
        "<View id={} annotations={} app={}>",
        view.id,
        view.annotations.len(),
        view.metadata.app
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    logging::init(&config.logging);

    match cli.command {
        Commands::Annotate { infile, outfile } => {
            let annotator = Annotator::from_config(&config, cli.uncased)?;
            println!("{}", serde_json::to_string_pretty(annotator.metadata())?);

            let mmif = annotate_file(&annotator, &infile, &outfile).await?;
            for view in &mmif.views {
                println!("{}", view_summary(view));
            }
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let state = AppState::from_config(config, cli.uncased)?;
            nlpa_api::serve(Arc::new(state)).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nlpa_core::Document;
    use nlpa_pipeline::testing::{sample_doc, StaticPipeline, SAMPLE_TEXT};

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::parse_from(["nlpa", "annotate", "--uncased", "in.json", "out.json"]);
        assert!(cli.uncased);
        assert!(cli.config.is_none());
        match cli.command {
            Commands::Annotate { infile, outfile } => {
                assert_eq!(infile, PathBuf::from("in.json"));
                assert_eq!(outfile, PathBuf::from("out.json"));
            }
            Commands::Serve { .. } => panic!("expected annotate"),
        }

        let cli = Cli::parse_from(["nlpa", "--config", "nlpa.toml", "serve", "--port", "8000"]);
        assert_eq!(cli.config, Some(PathBuf::from("nlpa.toml")));
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert_eq!(port, Some(8000));
            }
            Commands::Annotate { .. } => panic!("expected serve"),
        }
    }

    #[tokio::test]
    async fn test_annotate_file() {
        let dir = tempfile::tempdir().unwrap();
        let infile = dir.path().join("in.mmif");
        let outfile = dir.path().join("out.mmif");
        let input = Mmif::new(vec![Document::text("m1", SAMPLE_TEXT)]);
        std::fs::write(&infile, input.to_json(false).unwrap()).unwrap();

        let annotator = Annotator::new(Arc::new(StaticPipeline::new(sample_doc())));
        let mmif = annotate_file(&annotator, &infile, &outfile).await.unwrap();

        let written = Mmif::from_json(&std::fs::read_to_string(&outfile).unwrap()).unwrap();
        assert_eq!(written.views.len(), 1);
        assert_eq!(
            view_summary(&mmif.views[0]),
            format!(
                "<View id=v_0 annotations={} app={}>",
                mmif.views[0].annotations.len(),
                nlpa_pipeline::metadata::APP_IDENTIFIER
            )
        );
    }

    #[tokio::test]
    async fn test_annotate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let annotator = Annotator::new(Arc::new(StaticPipeline::new(sample_doc())));

        let result = annotate_file(
            &annotator,
            &dir.path().join("missing.mmif"),
            &dir.path().join("out.mmif"),
        )
        .await;
        assert!(result.is_err());
    }
}
