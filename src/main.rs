use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedule_assistant::api::router;
use schedule_assistant::clock::{Clock, FixedClock, SystemClock};
use schedule_assistant::config::{AppConfig, ReminderConfig};
use schedule_assistant::error::AppError;
use schedule_assistant::notify::{EmailChannel, LogMailTransport, ReminderChannel, WebhookChannel};
use schedule_assistant::services::{AssistantService, ReminderScheduler, Responder};
use schedule_assistant::state::AppState;
use schedule_assistant::store::{CsvScheduleStore, ScheduleRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "schedule_assistant=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::new_from_env()?;

    let store: Arc<dyn ScheduleRepository> = Arc::new(CsvScheduleStore::new(&config.schedule_path));
    let clock: Arc<dyn Clock> = match config.fixed_now {
        Some(now) => {
            warn!("clock pinned to {}", now);
            Arc::new(FixedClock(now))
        }
        None => Arc::new(SystemClock),
    };
    let responder = Arc::new(match config.response_seed {
        Some(seed) => Responder::seeded(seed),
        None => Responder::from_entropy(),
    });

    if config.reminder.enabled {
        let channels = reminder_channels(&config.reminder)?;
        if channels.is_empty() {
            warn!("reminders enabled but no channel is configured");
        }
        let scheduler = ReminderScheduler::new(
            store.clone(),
            clock.clone(),
            channels,
            config.reminder.interval_secs,
            config.reminder.lead_minutes,
        );
        tokio::spawn(scheduler.start());
    }

    let state = AppState {
        assistant: Arc::new(AssistantService::new(store, clock, responder)),
    };

    let app = router(state);

    info!("serving schedule from {}", config.schedule_path.display());
    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn reminder_channels(config: &ReminderConfig) -> Result<Vec<Arc<dyn ReminderChannel>>, AppError> {
    let mut channels: Vec<Arc<dyn ReminderChannel>> = Vec::new();
    if let Some(recipient) = &config.email_to {
        channels.push(Arc::new(EmailChannel::new(recipient.clone(), Arc::new(LogMailTransport))));
    }
    if let Some(url) = &config.webhook_url {
        channels.push(Arc::new(WebhookChannel::new(url.clone())?));
    }
    Ok(channels)
}
