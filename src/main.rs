use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use massagebook::auth;
use massagebook::config::AppConfig;
use massagebook::db;
use massagebook::routes;
use massagebook::services::email::sendgrid::SendGridEmailProvider;
use massagebook::services::messaging::twilio::TwilioSmsProvider;
use massagebook::services::payments::stripe::StripeGateway;
use massagebook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.jwt_secret == "changeme" {
        tracing::warn!("JWT_SECRET is not set, using the insecure default");
    }

    let conn = db::init_db(&config.database_url)?;
    auth::bootstrap_admin(&conn, &config)?;

    if config.stripe_secret_key.is_empty() {
        tracing::warn!("STRIPE_SECRET_KEY not set, payment intents will be refused");
    }
    let payments = StripeGateway::new(config.stripe_secret_key.clone());
    let email = SendGridEmailProvider::new(
        config.sendgrid_api_key.clone(),
        config.from_email.clone(),
    );
    let messaging = TwilioSmsProvider::new(
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
        config.twilio_phone_number.clone(),
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        payments: Box::new(payments),
        email: Box::new(email),
        messaging: Box::new(messaging),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(business = %config.business_name, "starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
