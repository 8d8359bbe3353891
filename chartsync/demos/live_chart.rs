mod common;

use std::time::Duration;

use chartsync::{AssetRef, IndicatorSettings, SyncConfig, SyncOrchestrator, Tz};
use common::{get_service, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // 1. Pick a service: the mock unless CHARTSYNC_BASE_URL points at a live one.
    let service = get_service();

    // 2. Build a view for Tencent with a short refresh interval for the demo.
    let config = SyncConfig::default().with_refresh_interval(Duration::from_secs(5));
    let view = SyncOrchestrator::builder(service, AssetRef::stock("0700.HK"))
        .config(config)
        .build();

    // 3. Initial full load.
    view.mount().await;
    let snap = view.snapshot();
    if let Some(err) = &snap.error {
        println!("load failed: {err}");
        return Ok(());
    }
    println!(
        "{} candles of {} in {}",
        snap.series.len(),
        snap.asset,
        snap.currency.as_deref().unwrap_or("?")
    );

    // 4. Render the tail with indicators in the viewer's zone.
    let points = view.chart(&IndicatorSettings::default(), "Europe/London");
    for p in points.iter().rev().take(3).rev() {
        println!(
            "{}  close={:.2}  sma20={:?}  bb=({:?}, {:?})",
            p.point.date, p.point.price, p.indicators.ma1, p.indicators.bb_lower, p.indicators.bb_upper
        );
    }

    // 5. Exchange hours as seen from London.
    if let Some(status) = view.market_status(Tz::Europe__London) {
        println!(
            "market {} ({} until {:?}, {} London time)",
            if status.is_open { "open" } else { "closed" },
            status.countdown,
            status.transition,
            status.next_transition_viewer
        );
    }

    // 6. Watch two auto-refresh cycles.
    let mut rx = view.subscribe();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(12);
    while let Ok(Ok(())) = tokio::time::timeout_at(deadline, rx.changed()).await {
        let snap = rx.borrow_and_update().clone();
        if !snap.is_loading {
            println!(
                "refreshed: last={:?} next in {}",
                snap.last_price(),
                view.scheduler().countdown_display()
            );
        }
    }

    view.unmount();
    Ok(())
}
