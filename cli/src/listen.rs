use std::sync::Arc;

use livereload_config::ClientConfig;
use livereload_core::{
    reaction_fn, LiveReloadError, NotificationClient, ReactionCallback,
};
use livereload_websocket::WebSocketTransport;
use tokio::process::Command;
use tracing::info;

use crate::cli::ListenArgs;

pub fn client_config(args: ListenArgs, mut config: ClientConfig) -> ClientConfig {
    if let Some(page_url) = args.page_url {
        config.page_url = Some(page_url);
    }
    if let Some(path) = args.path {
        config.path = path;
    }
    if let Some(max_attempts) = args.max_attempts {
        config.reconnect = config.reconnect.with_max_attempts(max_attempts);
    }
    config
}

pub async fn run(args: ListenArgs, config: ClientConfig) -> Result<(), LiveReloadError> {
    let reaction = match args.exec.clone() {
        Some(command) => exec_reaction(command),
        None => log_reaction(),
    };

    let config = client_config(args, config);
    config.validate()?;

    let transport = Arc::new(WebSocketTransport::new(config.websocket.clone()));
    let client = NotificationClient::new(config.endpoint()?, config.reconnect, transport, reaction)?;
    client.start()?;

    tokio::select! {
        result = client.wait() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C");
            client.stop().await;
            Ok(())
        }
    }
}

fn log_reaction() -> ReactionCallback {
    reaction_fn(|notification| async move {
        match notification.as_text() {
            Some(text) => info!(sequence = notification.sequence(), payload = %text, "Reload requested"),
            None => info!(
                sequence = notification.sequence(),
                bytes = notification.payload().len(),
                "Reload requested"
            ),
        }
        Ok(())
    })
}

fn exec_reaction(command: String) -> ReactionCallback {
    let command = Arc::new(command);

    reaction_fn(move |notification| {
        let command = command.clone();
        async move {
            info!(
                sequence = notification.sequence(),
                command = %command,
                "Reload requested, running command"
            );

            let status = shell(&command).status().await?;
            if status.success() {
                Ok(())
            } else {
                Err(LiveReloadError::ReactionError(format!(
                    "`{}` exited with {}",
                    command, status
                )))
            }
        }
    })
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut shell = Command::new("sh");
    shell.arg("-c").arg(command);
    shell
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut shell = Command::new("cmd");
    shell.arg("/C").arg(command);
    shell
}
