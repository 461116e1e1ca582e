use audify_screens::Route;
use audify_screens::presentation::InfoDialog;

use crate::cli::OpenArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_info, render_route};

pub(crate) fn handle_open(ctx: &AppContext, args: &OpenArgs) -> CliResult<()> {
    let route = Route::from_path(&args.path);
    if route == Route::NotFound {
        return Err(CliError::validation(format!(
            "no screen at '{}' ({})",
            args.path.trim(),
            route.title()
        )));
    }
    render_route(route, ctx.output)
}

pub(crate) fn handle_info(ctx: &AppContext) -> CliResult<()> {
    render_info(&InfoDialog::default(), ctx.output)
}
