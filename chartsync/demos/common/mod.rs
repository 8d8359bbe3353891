#![allow(dead_code)]

use std::sync::Arc;

use chartsync::DataService;

#[must_use]
pub fn get_service() -> Arc<dyn DataService> {
    match std::env::var("CHARTSYNC_BASE_URL") {
        Ok(base) if std::env::var("CHARTSYNC_DEMOS_USE_MOCK").is_err() => {
            match chartsync_http::HttpDataService::new(base) {
                Ok(svc) => return Arc::new(svc),
                Err(e) => eprintln!("invalid CHARTSYNC_BASE_URL ({e}); falling back to mock"),
            }
        }
        _ => {}
    }
    println!("--- (Using Mock Data Service) ---");
    Arc::new(chartsync_mock::MockDataService::new())
}

// Initialise an INFO `Subscriber` for `tracing` logs
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(cfg!(debug_assertions))
        .init();
}
