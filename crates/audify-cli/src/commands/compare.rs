use std::future::Future;
use std::sync::Arc;

use anyhow::anyhow;
use audify_screens::similarity::{SIMILARITY_ERROR_TEXT, SIMILARITY_LOADING_TEXT};
use audify_screens::{SimilarityResult, SimilarityScreen};

use crate::cli::CompareArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::optimize::interrupted;
use crate::output::render_similarity;

pub(crate) async fn handle_compare(ctx: &AppContext, args: CompareArgs) -> CliResult<()> {
    run_compare(ctx, args, interrupted()).await
}

async fn run_compare<I>(ctx: &AppContext, args: CompareArgs, interrupt: I) -> CliResult<()>
where
    I: Future<Output = ()>,
{
    let screen = SimilarityScreen::new(Arc::new(ctx.backend()));
    screen.set_playlist1(args.playlist1);
    screen.set_playlist2(args.playlist2);

    let ticket = screen
        .submit()
        .map_err(|err| CliError::validation(err.to_string()))?;
    eprintln!("{SIMILARITY_LOADING_TEXT}");

    let outcome = tokio::select! {
        outcome = ticket.settled() => outcome.flatten(),
        () = interrupt => {
            screen.close_modal();
            eprintln!("Comparison cancelled.");
            return Ok(());
        }
    };

    match outcome {
        Some(result @ SimilarityResult::Percentage(_)) => render_similarity(result, ctx.output),
        Some(SimilarityResult::Failed) => Err(CliError::failure(anyhow!(SIMILARITY_ERROR_TEXT))),
        None => Err(CliError::failure(anyhow!(
            "compare task ended without a result"
        ))),
    }
}
