//! SkillShare command line client
//!
//! Checks the session, prints the feed and unread notifications, then follows
//! live notifications until interrupted.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillshare_client::api::OAuthProvider;
use skillshare_client::{App, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SkillShare client");
    tracing::info!("Backend origin: {}", config.api_origin);
    tracing::info!("Broker endpoint: {}", config.ws_url);

    if config.session_cookie.is_none() {
        tracing::warn!("No session cookie configured (SKILLSHARE_SESSION_COOKIE)");
    }

    let app = App::new(&config)?;

    let Some(identity) = app.start().await else {
        println!("Not logged in. Sign in at:");
        println!("  {}", app.session.login_url(OAuthProvider::Google));
        println!("  {}", app.session.login_url(OAuthProvider::Facebook));
        return Ok(());
    };
    println!("Logged in as {}", identity.display_name());

    // Feed
    match app.feed.load().await {
        Ok(count) => {
            println!("\n{} posts", count);
            for post in app.feed.posts().await.iter().take(10) {
                println!(
                    "  [{}] {} ({} likes, {} comments)",
                    post.id,
                    post.content,
                    post.likes.len(),
                    post.comments.len()
                );
            }
        }
        Err(e) => eprintln!("{}", e.user_message("Failed to load posts")),
    }

    // Notifications
    if let Err(e) = app.notifications.load().await {
        eprintln!("{}", e.user_message("Failed to load notifications"));
    }
    println!("\n{} unread notifications", app.notifications.unread_count().await);

    if !app.notifications.is_attached() {
        return Ok(());
    }

    println!("\nWaiting for notifications (Ctrl-C to quit)");
    let mut toasts = app.notifications.toasts();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = toasts.recv() => match received {
                Ok(notification) => {
                    let sender = app.notifications.sender(&notification).await;
                    println!("{}: {}", sender.name, notification.content);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} notifications", skipped);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    tracing::info!("Shutting down");
    if let Some(broker) = app.broker() {
        broker.disconnect();
    }
    Ok(())
}
