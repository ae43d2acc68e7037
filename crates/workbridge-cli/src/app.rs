use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;
use workbridge_core::mention::TriggerState;
use workbridge_core::project::{CacheOptions, FileCache, WorkspaceApi};
use workbridge_core::remote::{EditorController, RemoteControlClient};
use workbridge_core::Settings;

use crate::commands::{format_file_row, format_trigger, parse_arg_value, Command};

pub async fn run(command: Command, settings: Settings) -> Result<()> {
    match command {
        Command::Files {
            session,
            query,
            limit,
            watch,
        } => run_files(&settings, &session, &query, limit, watch).await,
        Command::Open {
            session,
            path,
            line,
            column,
        } => {
            let controller = connect(&settings, &session).await?;
            match line {
                Some(line) => controller.open_file_at_position(&path, line, column).await?,
                None => controller.open_file(&path).await?,
            }
            println!("Opened {path}");
            Ok(())
        }
        Command::OpenDir { session, path } => {
            connect(&settings, &session).await?.open_directory(&path).await?;
            println!("Revealed {path}");
            Ok(())
        }
        Command::Reveal { session, path } => {
            connect(&settings, &session)
                .await?
                .reveal_in_explorer(&path)
                .await?;
            println!("Revealed {path}");
            Ok(())
        }
        Command::Explorer { session } => {
            connect(&settings, &session).await?.focus_explorer().await?;
            Ok(())
        }
        Command::Exec {
            session,
            command,
            args,
        } => {
            let args = args.iter().map(|a| parse_arg_value(a)).collect();
            connect(&settings, &session)
                .await?
                .execute_command(&command, args)
                .await?;
            println!("Sent {command}");
            Ok(())
        }
        Command::Mention { text, caret } => {
            let caret = caret.unwrap_or(text.len());
            println!("{}", format_trigger(&TriggerState::evaluate(&text, caret, None)));
            Ok(())
        }
    }
}

async fn connect(settings: &Settings, session: &str) -> Result<EditorController> {
    let api = WorkspaceApi::new(settings.server.base_url.clone())?;
    let client = RemoteControlClient::new(&settings.remote);
    let controller = EditorController::new(
        session,
        settings.workspace.root.clone(),
        Arc::new(client),
        Arc::new(api),
    );
    let port = controller
        .refresh_port()
        .await
        .with_context(|| format!("Editor is not available for session {session}"))?;
    debug!("Editor for session {session} listens on port {port}");
    Ok(controller)
}

async fn run_files(
    settings: &Settings,
    session: &str,
    query: &str,
    limit: Option<usize>,
    watch: bool,
) -> Result<()> {
    let api = WorkspaceApi::new(settings.server.base_url.clone())?;
    let cache = FileCache::new(session, Arc::new(api), CacheOptions::from(&settings.cache));

    let summary = cache.load(false).await;
    if !summary.report.failed.is_empty() {
        eprintln!(
            "warning: {} director{} could not be listed",
            summary.report.failed.len(),
            if summary.report.failed.len() == 1 { "y" } else { "ies" }
        );
    }
    if summary.report.truncated {
        eprintln!("warning: discovery was truncated by configured limits");
    }
    print_files(&cache, query, limit);

    if watch {
        let mut versions = cache.subscribe();
        let mut last_refresh = cache.last_refresh();
        loop {
            tokio::select! {
                changed = versions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // Reprint once per completed pass, not per streamed directory.
                    let refreshed = cache.last_refresh();
                    if refreshed != last_refresh {
                        last_refresh = refreshed;
                        println!();
                        print_files(&cache, query, limit);
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    }

    cache.shutdown();
    Ok(())
}

fn print_files(cache: &FileCache, query: &str, limit: Option<usize>) {
    for item in cache.get_filtered_files(query, limit) {
        println!("{}", format_file_row(&item));
    }
}
