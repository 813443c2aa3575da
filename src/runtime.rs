/*
 *  runtime.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display loop - one tokio task serializing ticks, control and fetches
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, info, warn};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;

use crate::display::error::FontError;
use crate::display::font::SpriteFont;
use crate::display::scheduler::{FetchOutcome, Scheduler, SchedulerEvent};
use crate::display::task::{TaskKind, TaskSpec};
use crate::feeds::Fetcher;
use crate::playlist::PlaylistRunner;

const CONTROL_QUEUE: usize = 32;
const EVENT_QUEUE: usize = 64;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("display loop has exited")]
    Closed,
    #[error(transparent)]
    Font(#[from] FontError),
}

/// Requests into the display loop
pub enum Control {
    SwitchTo(TaskSpec),
    Stop,
    PlayPlaylist(PlaylistRunner),
    PausePlaylist,
    ResumePlaylist,
    RegisterFont(SpriteFont, oneshot::Sender<Result<(), FontError>>),
    Status(oneshot::Sender<Status>),
    Shutdown,
}

/// Snapshot of the loop for callers outside it
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub kind: Option<TaskKind>,
    pub jobs: usize,
    pub playlist: Option<String>,
    pub playlist_paused: bool,
}

/// Cloneable front door to a running display loop
#[derive(Clone)]
pub struct DisplayHandle {
    tx: mpsc::Sender<Control>,
    events: broadcast::Sender<SchedulerEvent>,
}

/// Loop side of [`display_channel`]
pub struct ControlReceiver {
    rx: mpsc::Receiver<Control>,
    events: broadcast::Sender<SchedulerEvent>,
}

pub fn display_channel() -> (DisplayHandle, ControlReceiver) {
    let (tx, rx) = mpsc::channel(CONTROL_QUEUE);
    let (events, _) = broadcast::channel(EVENT_QUEUE);
    (DisplayHandle { tx, events: events.clone() }, ControlReceiver { rx, events })
}

impl DisplayHandle {
    async fn send(&self, control: Control) -> Result<(), RuntimeError> {
        self.tx.send(control).await.map_err(|_| RuntimeError::Closed)
    }

    pub async fn switch_to(&self, spec: TaskSpec) -> Result<(), RuntimeError> {
        self.send(Control::SwitchTo(spec)).await
    }

    pub async fn stop(&self) -> Result<(), RuntimeError> {
        self.send(Control::Stop).await
    }

    pub async fn play(&self, runner: PlaylistRunner) -> Result<(), RuntimeError> {
        self.send(Control::PlayPlaylist(runner)).await
    }

    /// Hold the running playlist on its current step
    pub async fn pause_playlist(&self) -> Result<(), RuntimeError> {
        self.send(Control::PausePlaylist).await
    }

    pub async fn resume_playlist(&self) -> Result<(), RuntimeError> {
        self.send(Control::ResumePlaylist).await
    }

    pub async fn register_font(&self, font: SpriteFont) -> Result<(), RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Control::RegisterFont(font, reply)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)??;
        Ok(())
    }

    pub async fn status(&self) -> Result<Status, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.send(Control::Status(reply)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    pub async fn is_active(&self, kind: TaskKind) -> Result<bool, RuntimeError> {
        Ok(self.status().await?.kind == Some(kind))
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Control::Shutdown).await
    }

    /// Scheduler events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }
}

fn end_playlist(playlist: &mut Option<PlaylistRunner>, why: &str) {
    if let Some(runner) = playlist.take() {
        info!("Playlist '{}' ended: {}", runner.name(), why);
    }
}

fn spawn_fetches<F: Fetcher>(scheduler: &mut Scheduler, fetcher: &Arc<F>, tx: &mpsc::UnboundedSender<FetchOutcome>) {
    for req in scheduler.take_fetch_requests() {
        let fetcher = Arc::clone(fetcher);
        let tx = tx.clone();
        tokio::spawn(async move {
            let kind = req.query.kind();
            if !req.token.is_live() {
                return;
            }
            let result = fetcher.fetch(&req.query).await;
            // loop gone means shutdown, nothing to deliver to
            let _ = tx.send(FetchOutcome { token: req.token, kind, result });
        });
    }
}

/// Drive `scheduler` until shutdown or every handle is dropped. Returns
/// the scheduler, stopped, so its sink can be inspected or reused.
pub async fn run_display_loop<F: Fetcher>(
    mut scheduler: Scheduler,
    fetcher: Arc<F>,
    control: ControlReceiver,
) -> Scheduler {
    let ControlReceiver { mut rx, events } = control;
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchOutcome>();
    let mut playlist: Option<PlaylistRunner> = None;

    info!("Display loop started");
    loop {
        let now = Instant::now().into_std();

        if let Some(runner) = playlist.as_mut() {
            if let Some(step) = runner.next_due(now) {
                let task = step.task.clone();
                scheduler.switch_to_at(task, now);
            }
            if runner.is_finished() {
                end_playlist(&mut playlist, "last item done");
            }
        }

        scheduler.poll(now);
        spawn_fetches(&mut scheduler, &fetcher, &fetch_tx);

        for event in scheduler.drain_events() {
            match &event {
                SchedulerEvent::AutoStopped { .. } => end_playlist(&mut playlist, "sink failing"),
                SchedulerEvent::BudgetExhausted(_) => {
                    if let Some(runner) = playlist.as_mut() {
                        runner.skip();
                    }
                }
                _ => {}
            }
            // no subscribers is fine
            let _ = events.send(event);
        }

        let playlist_due = playlist
            .as_ref()
            .filter(|r| !r.is_paused())
            .map(|r| r.deadline().unwrap_or(now));
        let deadline = match (scheduler.next_deadline(), playlist_due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        let sleep = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(Instant::from_std(at)).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            control = rx.recv() => match control {
                None | Some(Control::Shutdown) => {
                    info!("Display loop shutting down");
                    break;
                }
                Some(Control::SwitchTo(spec)) => {
                    end_playlist(&mut playlist, "manual switch");
                    scheduler.switch_to_at(spec, Instant::now().into_std());
                }
                Some(Control::Stop) => {
                    end_playlist(&mut playlist, "stopped");
                    scheduler.stop();
                }
                Some(Control::PlayPlaylist(runner)) => {
                    end_playlist(&mut playlist, "replaced");
                    info!("Playlist '{}' starting", runner.name());
                    playlist = Some(runner);
                }
                Some(Control::PausePlaylist) => match playlist.as_mut() {
                    Some(runner) => runner.pause(Instant::now().into_std()),
                    None => debug!("No playlist to pause"),
                },
                Some(Control::ResumePlaylist) => match playlist.as_mut() {
                    Some(runner) => runner.resume(Instant::now().into_std()),
                    None => debug!("No playlist to resume"),
                },
                Some(Control::RegisterFont(font, reply)) => {
                    let result = scheduler.register_font(font);
                    if let Err(e) = &result {
                        warn!("Font registration failed: {}", e);
                    }
                    let _ = reply.send(result);
                }
                Some(Control::Status(reply)) => {
                    let _ = reply.send(Status {
                        kind: scheduler.current_kind(),
                        jobs: scheduler.job_count(),
                        playlist: playlist.as_ref().map(|r| r.name().to_string()),
                        playlist_paused: playlist.as_ref().is_some_and(|r| r.is_paused()),
                    });
                }
            },
            Some(outcome) = fetch_rx.recv() => {
                let accepted = scheduler.deliver(outcome);
                debug!("Fetch result {}", if accepted { "applied" } else { "dropped" });
            }
            _ = sleep => {}
        }
    }

    scheduler.stop();
    for event in scheduler.drain_events() {
        let _ = events.send(event);
    }
    scheduler
}
