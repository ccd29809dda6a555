use futures::StreamExt;
use std::time::Duration;
use unistore::{LogInterceptor, PrintInterceptor, Store};

mod config;
mod counter;

use config::DemoConfig;
use counter::{CounterAction, CounterState};

/// How long to wait for the fetch effect chain before giving up
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting unistore-demo");

    let config = DemoConfig::load();
    log::debug!("Config: {:?}", config);

    let store = Store::with(
        CounterState::new(config.initial_counter),
        counter::reducers(),
        counter::effects(Duration::from_millis(config.response_delay_ms)),
    )?;

    // Interceptors are notified in this order
    if config.log_transitions {
        store.register_interceptor(LogInterceptor::new());
    }
    if config.print_transitions {
        store.register_interceptor(PrintInterceptor::new());
    }

    let mut milestones = store.select(&counter::milestone_count());
    let counter = counter::counter();

    store.dispatch(CounterAction::Increment(42));
    store.dispatch(CounterAction::Decrement(1));
    log::info!("Counter after local actions: {}", store.select_current(&counter));

    store.dispatch(CounterAction::Fetch);

    let reached = tokio::time::timeout(SETTLE_TIMEOUT, async {
        while let Some(count) = milestones.next().await {
            if count > 0 {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    if !reached {
        anyhow::bail!("fetch effect did not complete within {:?}", SETTLE_TIMEOUT);
    }

    log::info!("Final counter: {}", store.select_current(&counter));
    store.teardown();

    log::info!("Exiting unistore-demo");
    Ok(())
}
