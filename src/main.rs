use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_article::pipeline::ArticleWorkflow;
use transcript_article::utils;
use transcript_article::{Cli, Commands, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "transcript_article=debug"
    } else {
        "transcript_article=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Article { url, api_key } => {
            // Check for required external dependencies (non-fatal)
            let missing_deps = utils::check_dependencies(&config.captions.yt_dlp_path).await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            let url = match url {
                Some(url) => url,
                None => prompt_for_url()?,
            };
            let api_key = config.api_key(api_key.as_deref())?;

            let workflow = ArticleWorkflow::from_config(&config, &api_key, cli.quiet)?;
            let started = std::time::Instant::now();

            tracing::info!("Starting article pipeline for URL: {}", url);
            match workflow.create_article(&url).await {
                Ok(run) => {
                    println!(
                        "{} Article saved to: {}",
                        style("✔").green(),
                        run.paths.article.display()
                    );
                    println!("  Record saved to: {}", run.paths.record.display());
                    println!(
                        "  Completed in {}",
                        utils::format_duration(started.elapsed().as_secs_f64())
                    );
                }
                Err(e) => {
                    let error = anyhow::Error::from(e);
                    eprintln!("{} {:#}", style("✘ Error:").red().bold(), error);
                    return Err(error);
                }
            }
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::config_path()?.display());
                println!("Edit it to change the model, pacing or chunk sizes.");
            }
        }
    }

    Ok(())
}

/// Ask for the video URL on the terminal
fn prompt_for_url() -> Result<String> {
    let term = console::Term::stdout();
    term.write_str("Enter the YouTube video URL: ")
        .context("Failed to write prompt")?;

    let url = term.read_line().context("Failed to read URL")?;
    let url = url.trim().to_string();
    if url.is_empty() {
        anyhow::bail!("Please provide a valid YouTube URL");
    }

    Ok(url)
}
