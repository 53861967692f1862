use std::sync::Arc;

use binbuddy_core::{
    entity::{DateEntity, entities_for},
    model::{AddressCandidate, EntryConfig},
    plugin::CouncilPlugin,
    refresh::RefreshCoordinator,
    schedule::{DailyScheduler, Scheduler, TickReason},
};
use chrono::{DateTime, Local};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::config::EntryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    AddressSearch,
    DatesView,
}

pub(crate) struct App {
    pub plugin: CouncilPlugin,
    pub store: EntryStore,

    pub screen: Screen,

    pub address_input: String,
    pub candidates: Vec<AddressCandidate>,
    pub candidate_index: usize,

    pub coordinator: Option<RefreshCoordinator>,
    pub scheduler: Option<DailyScheduler>,
    /// Set once the initial refresh for the current entry has succeeded.
    pub activated: bool,
    pub entities: Vec<DateEntity>,
    pub last_refreshed: Option<DateTime<Local>>,

    pub is_loading: bool,
    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(plugin: CouncilPlugin, store: EntryStore) -> Self {
        Self {
            plugin,
            store,
            screen: Screen::AddressSearch,
            address_input: String::new(),
            candidates: Vec::new(),
            candidate_index: 0,
            coordinator: None,
            scheduler: None,
            activated: false,
            entities: Vec::new(),
            last_refreshed: None,
            is_loading: false,
            error_message: None,
        }
    }

    pub(crate) fn current_candidate(&self) -> Option<AddressCandidate> {
        self.candidates.get(self.candidate_index).cloned()
    }

    /// Bind the entry to a coordinator and start ticking. The entry stays
    /// pending until the initial tick's refresh succeeds.
    pub(crate) fn begin_setup(&mut self, entry: EntryConfig, ticks: &UnboundedSender<TickReason>) {
        self.deactivate();

        let coordinator = RefreshCoordinator::new(Arc::clone(&self.plugin.schedule_port), entry);

        let mut scheduler = DailyScheduler::default();
        let sender = ticks.clone();
        scheduler.on_tick(Arc::new(move |reason| {
            sender.send(reason).ok();
        }));

        self.coordinator = Some(coordinator);
        scheduler.start();
        self.scheduler = Some(scheduler);
    }

    /// Stop refreshing and return to the address search.
    pub(crate) fn deactivate(&mut self) {
        if let Some(mut scheduler) = self.scheduler.take() {
            scheduler.stop();
        }
        self.coordinator = None;
        self.activated = false;
        self.entities.clear();
        self.last_refreshed = None;
        self.screen = Screen::AddressSearch;
    }

    pub(crate) fn request_refresh(&self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.request_immediate_refresh();
        }
    }

    /// Run one refresh cycle for the current entry.
    pub(crate) async fn run_cycle(&mut self, reason: TickReason) {
        if self.activated {
            self.run_refresh().await;
        } else if reason == TickReason::Initial {
            self.run_setup_refresh().await;
        }
    }

    // Initial refresh: entities, persistence and the dates view all wait on it.
    async fn run_setup_refresh(&mut self) {
        let Some(coordinator) = self.coordinator.as_mut() else {
            return;
        };
        let entry_id = coordinator.location().to_string();

        let outcome = coordinator
            .first_refresh()
            .await
            .map(|dates| entities_for(&self.plugin.meta, &entry_id, dates));

        match outcome {
            Ok(entities) => {
                if let Some(coordinator) = &self.coordinator
                    && let Err(err) = self.store.save(coordinator.entry())
                {
                    warn!("Could not save address: {err:#}");
                }
                info!(entry = %entry_id, entities = entities.len(), "Address activated");
                self.entities = entities;
                self.activated = true;
                self.error_message = None;
                self.last_refreshed = Some(Local::now());
                self.screen = Screen::DatesView;
            }
            Err(err) => {
                let message = format!("Setup failed: {:#}", anyhow::Error::from(err));
                self.deactivate();
                self.error_message = Some(message);
            }
        }
    }

    async fn run_refresh(&mut self) {
        let Some(coordinator) = self.coordinator.as_mut() else {
            return;
        };

        match coordinator.refresh().await {
            Ok(_) => {
                self.error_message = None;
                self.last_refreshed = Some(Local::now());
            }
            Err(err) => {
                self.error_message = Some(format!("Refresh failed: {:#}", anyhow::Error::from(err)));
            }
        }
    }
}
