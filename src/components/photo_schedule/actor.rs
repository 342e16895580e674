use super::defaults::DEFAULT_WEEKLY;
use super::models::{HolidaySchedule, SnapshotSource};
use super::sheet::{parse_schedule_sheet, RowIssue};
use super::store::{RefreshTicket, ScheduleStore};
use crate::components::fetch::Fetcher;
use crate::config::Config;
use crate::error::{component_error, BoardResult};
use crate::utils::clock::SimulatedClock;
use chrono::{Datelike, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};

/// Outcome of one photo sheet refresh
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    pub generation: u64,
    /// False when a newer refresh had already published
    pub published: bool,
    pub source: SnapshotSource,
    pub weekly_rows: usize,
    pub holiday_rows: usize,
    pub holiday_dates: usize,
    pub issues: Vec<RowIssue>,
    /// Diagnostic of a sheet that could not be used at all
    pub malformed: Option<String>,
}

/// The photo schedule actor that processes refresh requests
pub struct PhotoScheduleActor {
    config: Arc<RwLock<Config>>,
    fetcher: Arc<dyn Fetcher>,
    clock: SimulatedClock,
    store: ScheduleStore,
    command_rx: mpsc::Receiver<PhotoScheduleCommand>,
}

/// Commands that can be sent to the photo schedule actor
pub enum PhotoScheduleCommand {
    Refresh(mpsc::Sender<BoardResult<RefreshSummary>>),
    Shutdown,
}

/// Handle for communicating with the photo schedule actor
#[derive(Clone)]
pub struct PhotoScheduleActorHandle {
    command_tx: mpsc::Sender<PhotoScheduleCommand>,
}

impl PhotoScheduleActorHandle {
    /// Refresh the schedule from the photo sheet
    pub async fn refresh(&self) -> BoardResult<RefreshSummary> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(PhotoScheduleCommand::Refresh(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BoardResult<()> {
        let _ = self.command_tx.send(PhotoScheduleCommand::Shutdown).await;
        Ok(())
    }
}

/// One refresh, detached from the mailbox so a slow sheet does not block others
struct RefreshJob {
    ticket: RefreshTicket,
    sheet_url: Option<String>,
    reference_year: i32,
    fetcher: Arc<dyn Fetcher>,
    store: ScheduleStore,
}

impl RefreshJob {
    async fn run(self) -> BoardResult<RefreshSummary> {
        let Some(url) = self.sheet_url.as_deref() else {
            warn!("Photo sheet URL is not configured, using the default schedule");
            let published = self.store.publish(
                self.ticket,
                SnapshotSource::Defaults,
                DEFAULT_WEEKLY.clone(),
                HolidaySchedule::new(),
            );
            return Ok(self.summary(published, SnapshotSource::Defaults));
        };

        let text = match self.fetcher.fetch_text(url).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error fetching photo schedule: {}", e);
                return Err(e);
            }
        };

        let parsed = parse_schedule_sheet(&text, &DEFAULT_WEEKLY, self.reference_year);
        let holiday_dates = parsed.holidays.len();
        let source = match parsed.report.malformed {
            Some(_) => SnapshotSource::Defaults,
            None => SnapshotSource::Sheet {
                fetched_at: Utc::now(),
            },
        };

        let published = self.store.publish(
            self.ticket,
            source.clone(),
            parsed.weekly,
            parsed.holidays,
        );

        let mut summary = self.summary(published, source);
        summary.weekly_rows = parsed.report.weekly_rows;
        summary.holiday_rows = parsed.report.holiday_rows;
        summary.holiday_dates = holiday_dates;
        summary.issues = parsed.report.issues;
        summary.malformed = parsed.report.malformed.map(|e| e.to_string());

        info!(
            "Photo schedule refreshed: {} weekly rows, {} holiday dates, {} skipped",
            summary.weekly_rows,
            summary.holiday_dates,
            summary.issues.len()
        );
        Ok(summary)
    }

    fn summary(&self, published: bool, source: SnapshotSource) -> RefreshSummary {
        RefreshSummary {
            generation: self.ticket.generation(),
            published,
            source,
            weekly_rows: 0,
            holiday_rows: 0,
            holiday_dates: 0,
            issues: Vec::new(),
            malformed: None,
        }
    }
}

impl PhotoScheduleActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: Arc<RwLock<Config>>,
        fetcher: Arc<dyn Fetcher>,
        clock: SimulatedClock,
        store: ScheduleStore,
    ) -> (Self, PhotoScheduleActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config,
            fetcher,
            clock,
            store,
            command_rx,
        };

        (actor, PhotoScheduleActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Photo schedule actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                PhotoScheduleCommand::Refresh(response_tx) => {
                    let job = self.refresh_job().await;
                    tokio::spawn(async move {
                        let result = job.run().await;
                        let _ = response_tx.send(result).await;
                    });
                }
                PhotoScheduleCommand::Shutdown => {
                    info!("Photo schedule actor shutting down");
                    break;
                }
            }
        }

        info!("Photo schedule actor shut down");
    }

    async fn refresh_job(&self) -> RefreshJob {
        let sheet_url = self.config.read().await.photo_sheet_url.clone();
        RefreshJob {
            ticket: self.store.begin_refresh(),
            sheet_url,
            reference_year: self.clock.real_now().year(),
            fetcher: Arc::clone(&self.fetcher),
            store: self.store.clone(),
        }
    }
}
