use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use portalized::auth::token::TokenService;
use portalized::config::Settings;
use portalized::domain::ports::PushNotifier;
use portalized::infrastructure::mailer::LogMailer;
use portalized::infrastructure::password::BcryptHasher;
use portalized::infrastructure::push::{FcmNotifier, NoopNotifier};
use portalized::infrastructure::stripe::{StripeGateway, WebhookVerifier};
use portalized::{build_server, create_pool, run_migrations, AppState, Integrations};

fn startup_error(e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

fn push_notifier(credentials: Option<&str>) -> Arc<dyn PushNotifier> {
    match credentials.map(FcmNotifier::from_credentials_json) {
        Some(Ok(fcm)) => Arc::new(fcm),
        Some(Err(e)) => {
            log::warn!("Firebase credentials unusable, push disabled: {}", e);
            Arc::new(NoopNotifier)
        }
        None => {
            log::warn!("FIREBASE_CREDENTIALS not set, push disabled");
            Arc::new(NoopNotifier)
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().map_err(startup_error)?;

    let pool = create_pool(&settings.database_url).map_err(startup_error)?;
    run_migrations(&pool).map_err(startup_error)?;

    if settings.stripe_webhook_secret.is_empty() {
        log::warn!("STRIPE_WEBHOOK_SECRET not set, webhooks will be rejected");
    }

    let integrations = Integrations {
        payments: Arc::new(StripeGateway::new(
            &settings.stripe_api_base,
            &settings.stripe_secret_key,
        )),
        mailer: Arc::new(LogMailer::new(&settings.email_from)),
        push: push_notifier(settings.firebase_credentials.as_deref()),
        hasher: Arc::new(BcryptHasher::default()),
    };
    let state = AppState::new(
        pool,
        TokenService::new(&settings.jwt_secret),
        WebhookVerifier::new(&settings.stripe_webhook_secret),
        &settings.frontend_url,
        integrations,
    );

    if let Some(seed) = settings.superadmin.clone() {
        let accounts = state.accounts.clone();
        actix_web::web::block(move || accounts.ensure_superadmin(&seed.email, &seed.password))
            .await
            .map_err(startup_error)?
            .map_err(startup_error)?;
    }

    log::info!("Starting server at http://{}:{}", settings.host, settings.port);

    build_server(state, &settings.host, settings.port)?.await
}
