//! Tera Term macro generation and execution

use super::{check_exit, LaunchRequest};
use crate::credentials::LoginRole;
use crate::error::{AppError, AppResult};
use crate::logging::sanitize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Encode a password as Tera Term `#NN` byte codes.
///
/// With `login` set, double quotes are doubled first: the connect command
/// embeds the password inside a double-quoted `/passwd=` argument.
pub fn encode_macro_password(password: &str, login: bool) -> String {
    let mut encoded = String::new();
    for c in password.chars() {
        let mut chunk = c.to_string();
        if login && c == '"' {
            chunk.push('"');
        }
        for b in chunk.bytes() {
            let _ = write!(encoded, "#{}", b);
        }
    }
    encoded
}

/// Single-quoted macro literals cannot contain quotes or line breaks
fn check_literal(field: &str, value: &str) -> AppResult<()> {
    if value.contains(['\'', '\r', '\n']) {
        return Err(AppError::LaunchRejected(format!(
            "{} contains characters that cannot be passed to the terminal",
            field
        )));
    }
    Ok(())
}

/// Build the login macro for a default or su request
pub fn build_macro(request: &LaunchRequest, su_prompt: &str) -> AppResult<String> {
    check_literal("Address", &request.ip)?;
    check_literal("Username", &request.primary.username)?;

    let mut content = format!(
        "connect '{ip}:22 /ssh /2 /auth=password /user={user} /passwd=\"'{password}'\"'\n",
        ip = request.ip,
        user = request.primary.username,
        password = encode_macro_password(&request.primary.password, true),
    );

    if request.role == LoginRole::Su {
        let su = request
            .secondary
            .as_ref()
            .ok_or(AppError::SuRoleNotConfigured)?;
        check_literal("su username", &su.username)?;
        check_literal("su prompt", su_prompt)?;
        let _ = write!(
            content,
            "wait '$'\nsendln 'su - {user}'\nwait '{prompt}'\nsendln {password}\nwait '#'\n",
            user = su.username,
            prompt = su_prompt,
            password = encode_macro_password(&su.password, false),
        );
    }

    if let Some(oc) = &request.oc {
        for (field, value) in [
            ("OC url", &oc.url),
            ("OC username", &oc.credential.username),
            ("OC password", &oc.credential.password),
        ] {
            if value.contains(['"', '\'', '\r', '\n']) {
                return Err(AppError::LaunchRejected(format!(
                    "{} contains characters that cannot be passed to the terminal",
                    field
                )));
            }
        }
        let _ = write!(
            content,
            "sendln \"oc login {url} --username {user} --password '{password}'\"\nwait '#'\n",
            url = oc.url,
            user = oc.credential.username,
            password = oc.credential.password,
        );
    }

    if let Some(title) = request.display.as_ref().and_then(|d| d.title.as_deref()) {
        check_literal("Title", title)?;
        let _ = writeln!(content, "settitle '{}'", title);
    }

    content.push_str("end\n");
    Ok(content)
}

fn macro_file_name() -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S%.3f");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("login_{}_{}.ttl", timestamp, &suffix[..8])
}

/// Write the macro, run `ttpmacro` on it and remove it again
pub(crate) async fn run_macro(ttpmacro_path: &str, macro_dir: &Path, content: &str) -> AppResult<()> {
    let macro_path: PathBuf = macro_dir.join(macro_file_name());
    tokio::fs::write(&macro_path, content)
        .await
        .map_err(|e| AppError::LaunchRejected(format!("Cannot write macro: {}", e)))?;
    tracing::debug!("Wrote macro {:?}: {}", macro_path, sanitize(content));

    let status = tokio::process::Command::new(ttpmacro_path)
        .arg(&macro_path)
        .status()
        .await;

    // SECURITY: the macro holds passwords; never leave it behind
    if let Err(e) = tokio::fs::remove_file(&macro_path).await {
        tracing::warn!("Failed to remove macro {:?}: {}", macro_path, e);
    }

    check_exit(ttpmacro_path, status)?;
    tracing::info!("Terminal macro completed");
    Ok(())
}
