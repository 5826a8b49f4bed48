use crate::clock::{GameTime, WorldClock};
use crate::commands::CommandRegistry;
use crate::config::Config;
use crate::content::ContentRegistry;
use crate::error::AppResult;
use crate::renderer::Presenter;
use crate::services::{AccountService, CharacterService};
use crate::storage::Storage;
use std::sync::Arc;
use std::time::Duration;

pub struct Services {
    pub account: Arc<AccountService>,
    pub character: Arc<CharacterService>,
}

/// Everything a session needs, built once and handed to every connection.
pub struct Registry {
    pub config: Arc<Config>,
    pub content: Arc<ContentRegistry>,
    pub commands: Arc<CommandRegistry>,
    pub clock: Arc<WorldClock>,
    pub storage: Arc<dyn Storage>,
    pub presenter: Arc<dyn Presenter>,
    pub services: Services,
}

impl Registry {
    pub fn new(
        config: Arc<Config>,
        content: Arc<ContentRegistry>,
        storage: Arc<dyn Storage>,
        presenter: Arc<dyn Presenter>,
    ) -> AppResult<Self> {
        let services = Services {
            account: Arc::new(AccountService::new(storage.clone(), config.clone())?),
            character: Arc::new(CharacterService::new(storage.clone(), content.clone(), config.clone())),
        };

        let clock = Arc::new(WorldClock::new(
            GameTime::default(),
            config.clock_minutes_per_tick,
            Duration::from_millis(config.clock_tick_ms),
        ));

        Ok(Self {
            config,
            content,
            commands: Arc::new(CommandRegistry::with_defaults()),
            clock,
            storage,
            presenter,
            services,
        })
    }

    /// Start the world clock and the autosave loop.
    pub fn spawn_background_tasks(self: &Arc<Self>) {
        let _ = self.clock.spawn(self.content.clone());

        if self.config.autosave_secs == 0 {
            tracing::info!("autosave disabled");
            return;
        }

        let characters = self.services.character.clone();
        let every = Duration::from_secs(self.config.autosave_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let saved = characters.save_online().await;
                if saved > 0 {
                    tracing::debug!(saved, "autosave");
                }
            }
        });
    }
}
