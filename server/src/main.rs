#[macro_use]
extern crate rocket;

use folio_server::{alerts::TelegramAlerts, config::Env};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

#[launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();

    let env = envy::from_env::<Env>().expect("Failed to load environment variables");

    let alerts = env
        .telegram()
        .map(|(token, chat_id)| TelegramAlerts::new(token, chat_id));
    let subscriber = tracing_subscriber::registry()
        .with(alerts)
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    tracing::info!(
        "Serving dashboard data for {} (Arcade profile {})",
        env.github_username,
        env.arcade_profile_id
    );

    folio_server::build(env).expect("Failed to build the server")
}
