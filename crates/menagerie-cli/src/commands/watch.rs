//! Long-running health check loop.

use std::time::Duration;

use menagerie_core::TickScheduler;

use super::Session;

pub fn run(duration_secs: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;
    let scheduler = TickScheduler::new(session.config.tick.interval())?;
    let runtime = tokio::runtime::Runtime::new()?;

    let _guard = runtime.enter();
    let handle = scheduler.start(move |now| {
        if !session.manager.tick(now) {
            return;
        }
        for event in session.manager.drain_events() {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "failed to encode event"),
            }
        }
        session.persist();
    });

    runtime.block_on(async move {
        match duration_secs {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                }
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "cannot listen for Ctrl-C");
                }
            }
        }
        handle.cancel().await;
    });
    Ok(())
}
