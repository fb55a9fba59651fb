//! Startup tasks.

use inkpost_core::domain::User;
use inkpost_core::ports::PasswordService;

use crate::config::AdminAccount;
use crate::state::AppState;

/// Create the configured staff account unless the username is taken.
pub async fn ensure_admin(
    state: &AppState,
    passwords: &dyn PasswordService,
    account: &AdminAccount,
) -> anyhow::Result<()> {
    if state.users.find_by_username(&account.username).await?.is_some() {
        tracing::debug!(username = %account.username, "Admin account already exists");
        return Ok(());
    }

    let hash = passwords.hash(&account.password)?;
    let user = User::new(account.username.clone(), account.email.clone(), hash, true);
    state.users.create(user).await?;

    tracing::info!(username = %account.username, "Admin account created");
    Ok(())
}
