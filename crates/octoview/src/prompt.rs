//! Terminal implementation of the authorization step.

use std::io::Write;

use async_trait::async_trait;
use octoview_oauth::oauth::parse_callback;
use octoview_oauth::{AuthorizationOutcome, AuthorizationPrompt, AuthorizationRequest};

/// Prints the authorization URL, tries to open a browser, and reads the
/// redirect URL (or `code#state`) back from stdin. An empty line cancels.
pub struct ConsolePrompt;

#[async_trait]
impl AuthorizationPrompt for ConsolePrompt {
    async fn authorize(&self, request: &AuthorizationRequest) -> AuthorizationOutcome {
        eprintln!("GitHub Authentication");
        eprintln!("=====================");
        eprintln!();
        eprintln!("Open this URL in your browser:");
        eprintln!();
        eprintln!("  {}", request.url);
        eprintln!();

        if open_url(&request.url).is_err() {
            eprintln!("(Could not open browser automatically)");
            eprintln!();
        }

        eprintln!(
            "After approving, your browser is sent to {}.",
            request.redirect_uri
        );
        eprintln!("Paste that full address here (empty line to cancel):");
        eprintln!();

        let line = match tokio::task::spawn_blocking(read_line).await {
            Ok(Ok(line)) => line,
            Ok(Err(e)) => return AuthorizationOutcome::Error(format!("Failed to read input: {}", e)),
            Err(e) => return AuthorizationOutcome::Error(format!("Input task failed: {}", e)),
        };

        outcome_from_input(&line)
    }
}

fn read_line() -> std::io::Result<String> {
    eprint!("redirect> ");
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input)
}

fn outcome_from_input(input: &str) -> AuthorizationOutcome {
    let input = input.trim();
    if input.is_empty() {
        return AuthorizationOutcome::Cancelled;
    }
    match parse_callback(input) {
        Ok((code, state)) => AuthorizationOutcome::Success { code, state },
        Err(e) => AuthorizationOutcome::Error(e.to_string()),
    }
}

/// Try to open a URL in the default browser.
fn open_url(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).status()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).status()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .status()?;
    }
    Ok(())
}
