use std::{io::IsTerminal, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::DEFAULT_CONFIG_FILE, load_settings, ChatClient, ClientError, ClientEvent,
    ComposeError, SocketIoTransport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod render;

use render::Renderer;

#[derive(Parser, Debug)]
struct Args {
    /// Chat server base url, e.g. http://192.168.1.20:5000
    #[arg(long)]
    server_url: Option<String>,
    /// Display name; asked for on stdin when not given.
    #[arg(long)]
    name: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(url) = args.server_url {
        settings.server_url = url;
    }
    if let Some(name) = args.name {
        settings.display_name = Some(name);
    }

    let transport = SocketIoTransport::new(&settings.server_url, settings.reconnect_delay())
        .context("invalid server url")?;
    tracing::info!(url = %transport.url(), "connecting");
    let handle = transport.spawn();
    let transport_task = handle.abort_handle();
    let client = ChatClient::new(Arc::new(handle.requests), settings.send_cooldown());

    let renderer = Renderer {
        color: !args.no_color && std::io::stdout().is_terminal(),
    };
    let mut views = client.subscribe_events();
    tokio::spawn(async move {
        loop {
            match views.recv().await {
                Ok(ClientEvent::View(update)) => println!("{}", renderer.render(&update)),
                Ok(ClientEvent::NameRejected(err)) => eprintln!("{err}"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "renderer fell behind");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let events = handle.events;
    let runner = Arc::clone(&client);
    let session = tokio::spawn(async move { runner.run(events).await });

    if let Some(name) = settings.display_name.as_deref() {
        submit_name(&client, name).await;
    } else {
        eprintln!("Enter a display name (max 32 characters):");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if client.local_name().await.is_none() {
                    submit_name(&client, &line).await;
                } else {
                    submit_message(&client, &line).await;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    transport_task.abort();
    session.abort();
    Ok(())
}

async fn submit_name(client: &ChatClient, raw: &str) {
    match client.set_name(raw).await {
        Ok(_) => {}
        // Rejections the user should see arrive as `NameRejected`.
        Err(ClientError::Compose(_)) => {}
        Err(err) => tracing::error!(error = %err, "failed to send display name"),
    }
}

async fn submit_message(client: &ChatClient, raw: &str) {
    match client.send_message(raw).await {
        Ok(()) | Err(ClientError::Compose(ComposeError::MessageEmpty)) => {}
        Err(ClientError::Compose(err)) => eprintln!("{err}"),
        Err(err) => tracing::error!(error = %err, "failed to send message"),
    }
}
