//! Remote desktop launch through `cmdkey` + `mstsc`

use super::check_exit;
use crate::credentials::Credential;
use crate::error::AppResult;

fn termsrv_target(ip: &str) -> String {
    format!("TERMSRV/{}", ip)
}

/// Register a temporary credential, open the RDP client, then drop the credential
pub(crate) async fn launch(ip: &str, credential: &Credential) -> AppResult<()> {
    let target = termsrv_target(ip);

    let stored = tokio::process::Command::new("cmdkey")
        .arg(format!("/generic:{}", target))
        .arg(format!("/user:{}", credential.username))
        .arg(format!("/pass:{}", credential.password))
        .status()
        .await;
    check_exit("cmdkey", stored)?;

    let session = tokio::process::Command::new("mstsc")
        .arg(format!("/v:{}", ip))
        .status()
        .await;

    // SECURITY: remove the stored credential whatever happened to the session
    let removed = tokio::process::Command::new("cmdkey")
        .arg(format!("/delete:{}", target))
        .status()
        .await;
    if let Err(e) = check_exit("cmdkey", removed) {
        tracing::warn!("Failed to remove RDP credential for {}: {}", ip, e);
    }

    check_exit("mstsc", session)?;
    tracing::info!("RDP session to {} started", ip);
    Ok(())
}
