//! Background step that moves orders out of pending/confirmed once they
//! have waited longer than the configured grace period.

use actix_web::rt::task::JoinHandle;
use actix_web::web;
use tokio::time::{interval, MissedTickBehavior};

use crate::config::AutoAdvanceSettings;
use crate::domain::ports::RestaurantRepository;

use super::restaurant_service::RestaurantService;

/// Start the periodic step on the current runtime. Returns `None` when the
/// step is disabled.
pub fn spawn<R: RestaurantRepository>(
    service: web::Data<RestaurantService<R>>,
    settings: AutoAdvanceSettings,
) -> Option<JoinHandle<()>> {
    let period = settings.interval?;
    let grace = settings.grace;

    log::info!(
        "Auto-advancing orders every {:?} after a {}s grace period",
        period,
        grace.num_seconds()
    );

    Some(actix_web::rt::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            run_once(&service, grace).await;
        }
    }))
}

async fn run_once<R: RestaurantRepository>(
    service: &web::Data<RestaurantService<R>>,
    grace: chrono::Duration,
) {
    let service = service.clone();
    match web::block(move || service.advance_stale_orders(grace)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => log::error!("Auto-advance step failed: {}", e),
        Err(e) => log::error!("Auto-advance step was cancelled: {}", e),
    }
}
