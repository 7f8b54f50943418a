use anyhow::Result;
use clap::{CommandFactory, Parser};
use flowprompt::app;
use flowprompt::cli::{Cli, Commands, ConfigAction};
use flowprompt::config::Config;
use flowprompt::output;
use flowprompt::script::Chunker;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(secs) = cli.countdown {
                config.session.countdown_secs = secs;
            }
            if let Some(path) = cli.recording {
                config.session.recording_path = Some(path);
            }

            if cli.script.is_none() && !std::io::stdin().is_terminal() {
                // Pipe mode: chunk the piped script and print it
                let text = app::read_script_source(None)?;
                let analysis = app::build_analysis(&config, &text, cli.no_analyze).await?;
                print!("{}", output::format_script_listing(&analysis.script));
            } else {
                // Prompter mode: stdin stays available for operator input
                let text = app::read_script_source(cli.script.as_deref())?;
                let analysis = app::build_analysis(&config, &text, cli.no_analyze).await?;
                if !cli.quiet {
                    eprintln!(
                        "{} ({} chunks, ~{:.0}s)",
                        analysis.summary.bold(),
                        analysis.script.len(),
                        analysis.total_duration_sec
                    );
                }
                app::run_session(&config, analysis.script, cli.quiet)?;
            }
        }
        Some(Commands::Chunk { file, target, json }) => {
            let config = load_config(cli.config.as_deref())?;
            let text = app::read_script_source(file.as_deref())?;
            let chunker = Chunker::with_config(config.chunker_config());
            let mut script = chunker.chunk(&text)?;
            if let Some(target_ms) = target {
                script = script.scaled_to_target(target_ms);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&script)?);
            } else {
                print!("{}", output::format_script_listing(&script));
            }
        }
        Some(Commands::Analyze { file, json }) => {
            let mut config = load_config(cli.config.as_deref())?;
            // Explicit analyze request: try the remote service even when the
            // config leaves it disabled.
            config.analyzer.enabled = true;
            let text = app::read_script_source(file.as_deref())?;
            let analysis = app::build_analysis(&config, &text, false).await?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "chunks": analysis.script.iter().collect::<Vec<_>>(),
                        "totalDurationSec": analysis.total_duration_sec,
                        "summary": analysis.summary,
                    }))?
                );
            } else {
                eprintln!("{}", analysis.summary.bold());
                print!("{}", output::format_script_listing(&analysis.script));
            }
        }
        Some(Commands::Config { action }) => {
            handle_config_command(action, cli.config.as_deref())?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "flowprompt",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/flowprompt/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        let default_path = Config::default_path();
        Config::load_or_default(&default_path)
    };

    Ok(config.with_env_overrides())
}

fn handle_config_command(action: ConfigAction, custom_path: Option<&std::path::Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(custom_path)?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            let path = custom_path
                .map(|p| p.to_path_buf())
                .unwrap_or_else(Config::default_path);
            println!("{}", path.display());
        }
        ConfigAction::Dump => {
            println!("# flowprompt configuration (defaults)");
            print!("{}", toml::to_string_pretty(&Config::default())?);
        }
    }
    Ok(())
}
