//! Output renderers for screens, dialogs, and JSON mode.

use anyhow::anyhow;
use audify_api_models::UserProfile;
use audify_screens::AuthSession;
use audify_screens::presentation::{ErrorDialog, InfoDialog, RESULT_COLUMNS, ResultTable};
use audify_screens::routes::{LANDING_PROMPT, LANDING_TITLE, OPTIONS_MENU};
use audify_screens::similarity::SIMILARITY_HEADING;
use audify_screens::{Route, SimilarityResult};
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json(value: &Value) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_result_table(table: &ResultTable, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<Value> = table
                .rows
                .iter()
                .map(|row| {
                    json!({
                        "index": row.index,
                        "album_cover": row.album_cover,
                        "track_name": row.track_name,
                        "artist": row.artist,
                        "album_name": row.album_name,
                        "tempo": row.tempo,
                        "popularity": row.popularity,
                    })
                })
                .collect();
            print_json(&json!({ "title": table.title, "tracks": rows }))?;
        }
        OutputFormat::Table => {
            println!("{}", table.title);
            println!("{}", RESULT_COLUMNS.join("\t"));
            for row in &table.rows {
                println!("{}", row.cells().join("\t"));
            }
        }
    }
    Ok(())
}

pub(crate) fn render_error_dialog(dialog: &ErrorDialog) {
    eprintln!("{}: {}", dialog.title, dialog.text);
    if let Some(detail) = &dialog.detail {
        eprintln!("  {detail}");
    }
}

pub(crate) fn render_similarity(result: SimilarityResult, format: OutputFormat) -> CliResult<()> {
    match (format, result) {
        (OutputFormat::Json, SimilarityResult::Percentage(value)) => print_json(&json!({
            "similarity_percentage": value,
            "display": result.display(),
        })),
        (OutputFormat::Json, SimilarityResult::Failed) => {
            print_json(&json!({ "error": result.display() }))
        }
        (OutputFormat::Table, _) => {
            println!("{SIMILARITY_HEADING}: {}", result.display());
            Ok(())
        }
    }
}

pub(crate) fn render_session(
    session: &AuthSession,
    profile: Option<&UserProfile>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "access_token": session.access_token(),
            "refresh_token": session.refresh_token(),
            "display_name": profile.and_then(|p| p.display_name.as_deref()),
            "image_url": profile.and_then(|p| p.image_url.as_deref()),
        })),
        OutputFormat::Table => {
            println!("access token: {}", session.access_token());
            if !session.refresh_token().is_empty() {
                println!("refresh token: {}", session.refresh_token());
            }
            render_profile_lines(profile);
            Ok(())
        }
    }
}

pub(crate) fn render_profile(profile: &UserProfile, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "display_name": profile.display_name,
            "image_url": profile.image_url,
        })),
        OutputFormat::Table => {
            render_profile_lines(Some(profile));
            Ok(())
        }
    }
}

fn render_profile_lines(profile: Option<&UserProfile>) {
    let Some(profile) = profile else {
        println!("profile: unavailable");
        return;
    };
    println!(
        "logged in as: {}",
        profile.display_name.as_deref().unwrap_or("<no display name>")
    );
    if let Some(image) = &profile.image_url {
        println!("avatar: {image}");
    }
}

pub(crate) fn render_route(route: Route, format: OutputFormat) -> CliResult<()> {
    let menu: Vec<Value> = match route {
        Route::Options => OPTIONS_MENU
            .iter()
            .map(|entry| json!({ "label": entry.label, "path": entry.route.path() }))
            .collect(),
        _ => Vec::new(),
    };
    match format {
        OutputFormat::Json => print_json(&json!({
            "route": route.to_string(),
            "path": route.path(),
            "title": route.title(),
            "menu": menu,
        })),
        OutputFormat::Table => {
            println!("{} ({})", route.title(), route.path());
            match route {
                Route::Landing => {
                    println!("{LANDING_TITLE}");
                    println!("{LANDING_PROMPT} -> {}", Route::landing_target().path());
                }
                Route::Options => {
                    for entry in &OPTIONS_MENU {
                        println!("  {} -> {}", entry.label, entry.route.path());
                    }
                }
                Route::Home => println!("run `audify optimize <LINK>`"),
                Route::Similarity => println!("run `audify compare <LINK1> <LINK2>`"),
                Route::NotFound => {}
            }
            Ok(())
        }
    }
}

pub(crate) fn render_info(info: &InfoDialog, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "title": info.title,
            "paragraphs": info.paragraphs,
            "link": { "label": info.link_label, "url": info.link_url },
        })),
        OutputFormat::Table => {
            println!("{}", info.title);
            for paragraph in info.paragraphs {
                println!();
                println!("{paragraph}");
            }
            println!();
            println!("{}: {}", info.link_label, info.link_url);
            Ok(())
        }
    }
}
