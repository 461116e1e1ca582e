use std::sync::Arc;

use anyhow::anyhow;
use audify_screens::{AuthAction, AuthError, AuthSession, AuthWidget, RedirectResult};

use crate::cli::{CallbackArgs, LogoutArgs, WhoamiArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_profile, render_session};

pub(crate) fn handle_login(ctx: &AppContext) -> CliResult<()> {
    let mut widget = AuthWidget::new(
        Arc::new(ctx.spotify()?),
        ctx.spotify_settings()?.clone(),
        RedirectResult::none(),
    );
    match widget.click() {
        AuthAction::Redirect { url } => {
            eprintln!("Open this URL in a browser, then pass the redirect URL to `audify callback`:");
            println!("{url}");
            Ok(())
        }
        AuthAction::Logout { .. } => Err(CliError::failure(anyhow!(
            "unexpected logout action for an empty session"
        ))),
    }
}

pub(crate) async fn handle_callback(ctx: &AppContext, args: CallbackArgs) -> CliResult<()> {
    let redirect = RedirectResult::from_url(&args.redirect_url);
    let mut widget = AuthWidget::new(
        Arc::new(ctx.spotify()?),
        ctx.spotify_settings()?.clone(),
        redirect,
    );
    match widget.mount().await {
        Ok(true) => render_session(widget.session(), widget.profile(), ctx.output),
        Ok(false) => Err(CliError::validation(
            "redirect URL does not carry an authorization code",
        )),
        Err(err @ AuthError::Denied { .. }) => Err(CliError::validation(err.to_string())),
        Err(err @ AuthError::Exchange(_)) => Err(CliError::failure(err)),
    }
}

pub(crate) fn handle_logout(ctx: &AppContext, args: LogoutArgs) -> CliResult<()> {
    let settings = ctx.spotify_settings()?.clone();
    let mut widget = AuthWidget::new(Arc::new(ctx.spotify()?), settings, RedirectResult::none());
    widget.restore_session(AuthSession::new(args.access_token.unwrap_or_default(), ""));
    if !widget.is_logged_in() {
        eprintln!("Already logged out.");
        return Ok(());
    }
    match widget.click() {
        AuthAction::Logout {
            logout_url,
            navigate_to,
        } => {
            eprintln!("Session cleared. Open the Spotify logout page to end the browser session:");
            println!("{logout_url}");
            eprintln!("returning to {}", navigate_to.path());
            Ok(())
        }
        AuthAction::Redirect { .. } => Err(CliError::failure(anyhow!(
            "unexpected login action for an active session"
        ))),
    }
}

pub(crate) async fn handle_whoami(ctx: &AppContext, args: WhoamiArgs) -> CliResult<()> {
    let session = AuthSession::new(args.access_token, "");
    if !session.is_logged_in() {
        return Err(CliError::validation("an access token is required"));
    }
    let settings = ctx.spotify_settings()?.clone();
    let mut widget = AuthWidget::new(Arc::new(ctx.spotify()?), settings, RedirectResult::none());
    widget.restore_session(session);
    match widget.refresh_profile().await {
        Some(profile) => render_profile(profile, ctx.output),
        None => Err(CliError::failure(anyhow!(
            "could not load the Spotify profile for this token"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    use crate::client::tests::{context_for, context_with_spotify};

    fn callback(url: &str) -> CallbackArgs {
        CallbackArgs {
            redirect_url: url.parse().expect("valid URL"),
        }
    }

    #[tokio::test]
    async fn callback_exchanges_code_and_loads_profile() {
        let server = MockServer::start_async().await;
        let token = server.mock(|when, then| {
            when.method(POST).path("/api/token");
            then.status(200).json_body(json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1",
                "token_type": "Bearer",
                "expires_in": 3600
            }));
        });
        let profile = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/me")
                .header("authorization", "Bearer access-1");
            then.status(200).json_body(json!({
                "display_name": "Listener",
                "images": [{ "url": "https://i.scdn.co/avatar" }]
            }));
        });

        let ctx = context_with_spotify(&server);
        handle_callback(&ctx, callback("http://localhost:3000/?code=XYZ"))
            .await
            .expect("login completes");
        token.assert();
        profile.assert();
    }

    #[tokio::test]
    async fn callback_without_code_makes_no_exchange() {
        let server = MockServer::start_async().await;
        let token = server.mock(|when, then| {
            when.method(POST).path("/api/token");
            then.status(200).json_body(json!({ "access_token": "unused" }));
        });

        let ctx = context_with_spotify(&server);
        let err = handle_callback(&ctx, callback("http://localhost:3000/"))
            .await
            .expect_err("no code present");
        assert_eq!(err.exit_code(), 2);
        token.assert_hits(0);
    }

    #[tokio::test]
    async fn denied_consent_is_validation_error() {
        let server = MockServer::start_async().await;
        let ctx = context_with_spotify(&server);
        let err = handle_callback(&ctx, callback("http://localhost:3000/?error=access_denied"))
            .await
            .expect_err("consent denied");
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("access_denied"));
    }

    #[test]
    fn login_and_logout_need_spotify_settings() {
        let server = MockServer::start();
        let ctx = context_for(&server);
        assert_eq!(handle_login(&ctx).expect_err("unconfigured").exit_code(), 2);

        let ctx = context_with_spotify(&server);
        assert!(handle_login(&ctx).is_ok());
        assert!(
            handle_logout(
                &ctx,
                LogoutArgs {
                    access_token: Some("token".into())
                }
            )
            .is_ok()
        );
    }

    #[tokio::test]
    async fn whoami_reports_rejected_token() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/me");
            then.status(401).json_body(json!({
                "error": { "status": 401, "message": "The access token expired" }
            }));
        });

        let ctx = context_with_spotify(&server);
        let err = handle_whoami(
            &ctx,
            WhoamiArgs {
                access_token: "stale".into(),
            },
        )
        .await
        .expect_err("expired token");
        assert_eq!(err.exit_code(), 3);
    }
}
