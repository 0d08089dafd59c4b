//! Opening a connection for a CLI run

use uuid::Uuid;
use zeroize::Zeroizing;

use crate::client::HttpTransport;
use crate::config::settings::{ConnectionSettings, PASSWORD_ENV};
use crate::error::{PolicyError, PolicyResult};

/// Options shared by every command that talks to the Policy Service
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Abort a restore on the first failed document
    pub fail_fast: bool,
    /// Tracking id sent with every request; generated when absent
    pub tracking_id: Option<String>,
}

impl RunOptions {
    /// The tracking id for this run
    pub fn tracking_id(&self) -> String {
        self.tracking_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

/// Open an authenticated transport, prompting for the password if needed
pub fn open_transport(
    connection: &ConnectionSettings,
    options: &RunOptions,
) -> PolicyResult<HttpTransport> {
    connection.validate()?;

    let password = match connection.resolved_password() {
        Some(password) => password,
        None => prompt_password(connection)?,
    };

    let tracking_id = options.tracking_id();
    println!("Connecting to: {}", connection.base_url());
    println!("Tracking id:   {}", tracking_id);
    HttpTransport::new(connection, password, Some(&tracking_id))
}

/// Prompt for the password (hidden input)
fn prompt_password(connection: &ConnectionSettings) -> PolicyResult<Zeroizing<String>> {
    let prompt = format!("Password for {}@{}: ", connection.username, connection.host);
    rpassword::prompt_password(prompt)
        .map(Zeroizing::new)
        .map_err(|e| {
            PolicyError::Config(format!(
                "No password configured and none could be read ({}); set {}",
                e, PASSWORD_ENV
            ))
        })
}

/// Render an elapsed run time
pub fn format_elapsed(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m {}s", minutes, total_seconds % 60);
    }

    format!("{}h {}m", minutes / 60, minutes % 60)
}
