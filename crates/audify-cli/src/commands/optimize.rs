use std::future::{Future, pending};
use std::sync::Arc;

use anyhow::anyhow;
use audify_client::PlaylistBackend;
use audify_screens::presentation::{ErrorDialog, ResultTable};
use audify_screens::{AuthSession, HomeScreen, HomeSettings, ModifyError, Settlement};
use tracing::debug;

use crate::cli::OptimizeArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_error_dialog, render_result_table};

pub(crate) async fn handle_optimize(ctx: &AppContext, args: OptimizeArgs) -> CliResult<()> {
    run_optimize(ctx, args, interrupted()).await
}

/// Resolves on Ctrl-C; never resolves when the signal cannot be watched.
pub(crate) async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        pending::<()>().await;
    }
}

async fn run_optimize<I>(ctx: &AppContext, args: OptimizeArgs, interrupt: I) -> CliResult<()>
where
    I: Future<Output = ()>,
{
    let backend = Arc::new(ctx.backend());
    let home = HomeScreen::new(backend, HomeSettings::from_config(&ctx.config));
    home.set_link(args.link);

    let settlement = drive(&home, interrupt).await?;
    match settlement {
        Settlement::Succeeded { .. } => {}
        Settlement::Cancelled | Settlement::Superseded => {
            eprintln!("Optimization cancelled.");
            return Ok(());
        }
        Settlement::Failed(err) => {
            let view = home.view();
            let dialog = ErrorDialog::from_view(&view).unwrap_or_else(|| ErrorDialog::new(None));
            render_error_dialog(&dialog);
            return Err(CliError::failure(anyhow!(err.user_message())));
        }
    }

    let session = args
        .access_token
        .map(|token| AuthSession::new(token, ""))
        .unwrap_or_default();
    let view = home.view();
    if let Some(table) = ResultTable::from_view(&view, session.is_logged_in()) {
        render_result_table(&table, ctx.output)?;
    }

    if args.apply {
        match home.modify_playlist(&session).await {
            Ok(text) => eprintln!("{text}"),
            Err(ModifyError::NotAuthenticated) => {
                return Err(CliError::validation(
                    ModifyError::NotAuthenticated.acknowledgement(),
                ));
            }
            Err(err) => {
                debug!(error = %err, "write-back failed");
                return Err(CliError::failure(anyhow!(
                    "{} ({err})",
                    err.acknowledgement()
                )));
            }
        }
    }
    Ok(())
}

/// Submit the screen's link and wait for the request to settle, echoing
/// status phrases to stderr. `interrupt` resolving cancels the request.
async fn drive<B, I>(home: &HomeScreen<B>, interrupt: I) -> CliResult<Settlement>
where
    B: PlaylistBackend + 'static,
    I: Future<Output = ()>,
{
    let mut updates = home.subscribe();
    let ticket = home
        .submit()
        .map_err(|err| CliError::validation(format!("{}: {err}", ErrorDialog::TEXT)))?;

    let mut last_phrase = updates.borrow_and_update().loading_phrase;
    if let Some(phrase) = last_phrase {
        eprintln!("{phrase}");
    }

    let settled = ticket.settled();
    tokio::pin!(settled);
    tokio::pin!(interrupt);
    let mut interrupt_armed = true;
    let mut watching = true;

    let outcome = loop {
        tokio::select! {
            biased;
            outcome = &mut settled => break outcome,
            () = &mut interrupt, if interrupt_armed => {
                interrupt_armed = false;
                home.cancel();
            }
            changed = updates.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let phrase = updates.borrow_and_update().loading_phrase;
                if let Some(text) = phrase
                    && phrase != last_phrase
                {
                    eprintln!("{text}");
                }
                last_phrase = phrase;
            }
        }
    };

    outcome.ok_or_else(|| CliError::failure(anyhow!("optimize task ended unexpectedly")))
}
