//! Commands and routes wired up by the demo subcommands

use std::{sync::Arc, time::Duration};

use anyhow::bail;
use tokio_util::sync::CancellationToken;

use crate::{
    command::{AsyncRelayCommand, CompositeCommand, ProgressAsyncRelayCommand},
    domain::{error::CommandError, parameter::Parameter},
    navigation::{NavigationService, ViewModel}
};

/// Sleep `delay` per step, stopping early when `token` fires.
///
/// `fail_at` makes the given step fail.
async fn step_through(
    steps: u32,
    delay: Duration,
    token: &CancellationToken,
    fail_at: Option<u32>
) -> anyhow::Result<()> {
    for step in 0..steps {
        tokio::select! {
            _ = token.cancelled() => return Err(CommandError::Cancelled.into()),
            _ = tokio::time::sleep(delay) => {}
        }
        if fail_at == Some(step) {
            bail!("segment {} is corrupted", step);
        }
    }
    Ok(())
}

/// Three commands run together through a composite: two cancellable relay
/// commands taking a step count and a progress-reporting import
pub struct Pipeline {
    pub sync:   Arc<AsyncRelayCommand<u32>>,
    pub index:  Arc<AsyncRelayCommand<u32>>,
    pub import: Arc<ProgressAsyncRelayCommand>,
    pub all:    CompositeCommand,
    interrupt:  CancellationToken
}

impl Pipeline {
    pub fn new(import_steps: u32, delay: Duration, fail_index: bool) -> Self {
        let sync = Arc::new(
            AsyncRelayCommand::new(move |steps: u32, token: CancellationToken| async move {
                step_through(steps, delay, &token, None).await
            })
            .named("sync")
            .with_predicate(|steps| *steps > 0)
        );

        let index = Arc::new(
            AsyncRelayCommand::new(move |steps: u32, token: CancellationToken| async move {
                let fail_at = fail_index.then_some(steps / 2);
                step_through(steps, delay, &token, fail_at).await
            })
            .named("index")
        );

        let interrupt = CancellationToken::new();
        let import_interrupt = interrupt.clone();
        let import = Arc::new(
            ProgressAsyncRelayCommand::new(move |sink| {
                let interrupt = import_interrupt.clone();
                async move {
                    for step in 1..=import_steps {
                        step_through(1, delay, &interrupt, None).await?;
                        sink.report((step * 100 / import_steps) as i32);
                    }
                    anyhow::Ok(())
                }
            })
            .named("import")
        );

        let all = CompositeCommand::named("pipeline");
        all.register(sync.clone());
        all.register(index.clone());
        all.register(import.clone());

        Self { sync, index, import, all, interrupt }
    }

    /// Request cancellation of every running command
    pub fn cancel(&self) {
        self.sync.cancel();
        self.index.cancel();
        self.interrupt.cancel();
    }
}

/// View model of the about page
#[derive(Debug)]
pub struct AboutViewModel {
    pub version: String
}

impl ViewModel for AboutViewModel {
    fn create(parameter: &Parameter) -> anyhow::Result<Self> {
        let version =
            parameter.downcast_ref::<String>().cloned().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
        Ok(Self { version })
    }
}

/// Route key served by [`AboutViewModel`]
pub const ABOUT_KEY: &str = "about";

pub fn configure_routes(navigation: &NavigationService) {
    navigation.configure("home", "pages/home.page");
    navigation.configure("settings", "pages/settings.page");
    navigation.configure("library", "pages/library.page");
    navigation.configure_view::<AboutViewModel>("AboutView");
}
