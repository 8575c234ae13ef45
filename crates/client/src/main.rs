//! `cmsadmin`: sign in to the admin backend and print the session.
//!
//! Environment:
//! - `CMSADMIN_USERNAME`, `CMSADMIN_PASSWORD` (required), `CMSADMIN_TENANT` (optional)
//! - `CMSADMIN_API_URL`, `CMSADMIN_LOCALE`, `CMSADMIN_HOME_PATH`, ... (see `Preferences`)
//! - `CMSADMIN_PREFERENCES`: path of a JSON document overriding preferences
//! - `CMSADMIN_CATALOG`: path of a JSON message catalog for menu titles
//! - `CMSADMIN_LOG_FORMAT`: `json` (default) or `compact`

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde_json::json;

use cmsadmin_auth::menu::{Catalog, localize_forest};
use cmsadmin_auth::SessionStore;
use cmsadmin_client::{AuthFlow, HttpAdminApi, LoginOutcome};
use cmsadmin_core::Preferences;
use cmsadmin_observability::tracing::LogFormat;

#[tokio::main]
async fn main() -> Result<()> {
    let format = std::env::var("CMSADMIN_LOG_FORMAT")
        .ok()
        .and_then(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    cmsadmin_observability::init_with(format);

    let mut prefs = Preferences::from_env();
    if let Ok(path) = std::env::var("CMSADMIN_PREFERENCES") {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read preferences at {path}"))?;
        prefs = prefs.merge_overrides(&raw)?;
    }
    let username = std::env::var("CMSADMIN_USERNAME").context("CMSADMIN_USERNAME is not set")?;
    let password = std::env::var("CMSADMIN_PASSWORD").context("CMSADMIN_PASSWORD is not set")?;
    let tenant = std::env::var("CMSADMIN_TENANT").ok().filter(|t| !t.is_empty());

    let catalog = match std::env::var("CMSADMIN_CATALOG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read catalog at {path}"))?;
            Catalog::from_json(prefs.locale.clone(), &raw)?
        }
        Err(_) => Catalog::new(prefs.locale.clone()),
    };

    tracing::info!(api = %prefs.api_base_url, locale = %prefs.locale, "starting");

    let api = Arc::new(HttpAdminApi::new(prefs.api_base_url.clone())?);
    let flow = AuthFlow::new(api, SessionStore::new(), prefs);

    match flow.login(&username, &password, tenant.as_deref()).await? {
        LoginOutcome::Authenticated => {}
        LoginOutcome::SecondFactorRequired(challenge) => {
            let mut attempts = 0;
            loop {
                let code = prompt("Authenticator code: ")?;
                match flow.verify_second_factor(&challenge, &code).await {
                    Ok(()) => break,
                    Err(e) if attempts < 2 => {
                        eprintln!("{e}");
                        attempts += 1;
                    }
                    Err(e) => bail!(e),
                }
            }
        }
    }

    let profile = flow.complete_login().await?;
    let session = flow.session().snapshot();
    let menus = localize_forest(session.access_menus(), &catalog);

    let out = json!({
        "profile": profile,
        "landing": flow.landing_path(),
        "accessCodes": session.access_codes().sorted(),
        "menus": menus,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);

    flow.logout().await;
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{label}");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
