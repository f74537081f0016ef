//! Connect to a box and press OK.
//!
//! ```sh
//! cargo run --example send-key -- 10.0.0.9 [password]
//! ```

use anyhow::{bail, Context};

use rfb_remote::{keys, Config, ControllerState, RemoteController};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let host = args.next().context("usage: send-key <host> [password]")?;

    let mut config = Config::new(host);
    if let Some(password) = args.next() {
        config = config.with_password(password);
    }

    let mut remote = RemoteController::new(config)?;
    remote.connect()?;

    if remote.needs_credentials() {
        bail!("server wants a password; pass one as the second argument");
    }
    if remote.state() != ControllerState::Connected {
        let detail = remote.last_error().unwrap_or_else(|| "timed out".into());
        bail!("connection failed: {detail}");
    }

    println!("connected to {}", remote.server_name().unwrap_or_default());
    remote.toggle_key(keys::OK);
    remote.disconnect();
    Ok(())
}
