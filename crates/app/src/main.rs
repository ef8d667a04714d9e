//! Headless assessor client
//!
//! Restores the stored session, keeps the live channel open for the
//! signed-in user and logs notifications until interrupted.

use std::process::ExitCode;

use assessor_app::{init_tracing, AppContext};
use assessor_domain::Result;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, kind = err.label(), "assessor client failed");
            eprintln!("assessor: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = assessor_infra::config::load()?;
    init_tracing(&config.logging)?;

    let context = AppContext::new_with_config(config)?;
    match context.start() {
        Some(session) => info!(user_id = %session.user_id, role = ?session.role, "session restored"),
        None => warn!("no stored session, live updates stay off until sign-in"),
    }

    let mut refresh = context.refresh.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = refresh.changed() => {
                if changed.is_err() {
                    break;
                }
                for toast in context.toasts.snapshot() {
                    info!(severity = ?toast.severity, message = %toast.message, "notification");
                    context.toasts.dismiss(toast.id);
                }
            }
        }
    }

    context.shutdown();
    Ok(())
}
