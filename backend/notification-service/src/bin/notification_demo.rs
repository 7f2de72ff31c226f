//! Scripted walk-through against a running (or embedded) notification service.
//!
//! Set NOTIFICATION_SERVICE_ADDR (e.g. http://127.0.0.1:50051) to target an
//! existing server; otherwise a server is started in-process on a free port.
use anyhow::Context;
use notification_service::{server, NotificationClient, NotificationService, StatusRegistry};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut embedded = None;
    let addr = match std::env::var("NOTIFICATION_SERVICE_ADDR") {
        Ok(addr) => addr,
        Err(_) => {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .context("Failed to bind embedded server")?;
            let local = listener.local_addr()?;
            let (tx, rx) = oneshot::channel::<()>();
            let core = NotificationService::new(Arc::new(StatusRegistry::new()));
            let task = tokio::spawn(server::serve_with_listener(listener, core, async {
                rx.await.ok();
            }));
            println!("Started embedded server on {}", local);
            embedded = Some((tx, task));
            format!("http://{}", local)
        }
    };

    let client = NotificationClient::connect(addr.clone())
        .await
        .with_context(|| format!("Failed to connect to {}", addr))?;

    for (client_id, hello) in [("client_1", true), ("client_2", true), ("client_1", false)] {
        let response = if hello {
            client.send_hello(client_id).await?
        } else {
            client.send_goodbye(client_id).await?
        };
        println!(
            "{} {}: {}",
            if hello { "HELLO" } else { "GOODBYE" },
            client_id,
            response.message
        );
    }

    let all: BTreeMap<_, _> = client.get_client_status(None).await?.into_iter().collect();
    println!("All client statuses: {:?}", all);

    let client_1 = client.get_client_status(Some("client_1")).await?;
    println!("Client 1 status: {:?}", client_1);

    if let Some((tx, task)) = embedded {
        let _ = tx.send(());
        task.await?.context("Embedded server error")?;
    }

    Ok(())
}
