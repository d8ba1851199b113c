use dioxus::prelude::*;

mod api;
mod app;
mod components;
mod shared;
mod utils;

#[cfg(feature = "server")]
mod backend;

pub const MAIN_CSS: Asset = asset!("/assets/main.css");

#[cfg(feature = "server")]
use std::sync::Arc;

fn main() {
    #[cfg(feature = "server")]
    {
        dotenvy::dotenv().ok();
        backend::init_tracing();

        let config = match backend::DashboardConfig::from_env() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("invalid configuration: {e:#}");
                std::process::exit(2);
            }
        };

        let mut args = std::env::args();
        let _bin = args.next();
        if let Some(cmd) = args.next() {
            if cmd == "check" {
                // One refresh cycle from the terminal; non-zero exit when nothing answered
                match run_check(&config) {
                    Ok(true) => return,
                    Ok(false) => std::process::exit(1),
                    Err(e) => {
                        eprintln!("check: {e:#}");
                        std::process::exit(2);
                    }
                }
            }
        }

        tracing::info!(
            "[boot] polling {} every {} s",
            config.base_url,
            config.refresh_interval.as_secs()
        );
        let spawned = std::thread::Builder::new()
            .name("scheduler-rt".into())
            .spawn(move || {
                let rt = match tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                {
                    Ok(rt) => rt,
                    Err(e) => {
                        tracing::error!("[scheduler] failed to build runtime: {e}");
                        return;
                    }
                };
                rt.block_on(async move {
                    let coordinator = match backend::RefreshCoordinator::from_config(&config) {
                        Ok(c) => Arc::new(c),
                        Err(e) => {
                            tracing::error!("[scheduler] failed to start: {e:#}");
                            return;
                        }
                    };
                    if !backend::coordinator::install(coordinator.clone()) {
                        tracing::warn!("[scheduler] coordinator already installed");
                        return;
                    }
                    coordinator.start().await;

                    // keep this runtime alive until the process is interrupted
                    if tokio::signal::ctrl_c().await.is_ok() {
                        coordinator.stop().await;
                        std::process::exit(130);
                    }
                    futures::future::pending::<()>().await;
                });
            });
        if let Err(e) = spawned {
            tracing::error!("[scheduler] failed to spawn thread: {e}");
        }
    }
    dioxus::launch(app::App);
}

#[cfg(feature = "server")]
fn run_check(config: &backend::DashboardConfig) -> anyhow::Result<bool> {
    use backend::RefreshOutcome;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let coordinator = backend::RefreshCoordinator::from_config(config)?;
        let report = coordinator.refresh_all().await;
        for outcome in &report.outcomes {
            match &outcome.result {
                Ok(()) => println!("{:<12} ok", outcome.name),
                Err(e) => println!("{:<12} error: {e}", outcome.name),
            }
        }
        Ok(!matches!(
            report.outcome(),
            RefreshOutcome::AllFailed | RefreshOutcome::Skipped
        ))
    })
}
