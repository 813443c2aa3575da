/*
 *  display/scheduler.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display task scheduler - owns the single active task, its jobs and
 *  the output sink
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

use chrono::{Local, NaiveDateTime};
use embedded_graphics::pixelcolor::Rgb888;
use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

use crate::display::components::{
    ChannelTicker, ClockFace, ScrollState, ScrollingLine, StockTicker, WeatherTicker,
};
use crate::display::error::{FontError, SinkError};
use crate::display::font::{FontTable, SpriteFont};
use crate::display::generators::{AnimationParams, GeneratorState};
use crate::display::jobs::{JobClass, JobHandle, JobId, JobSet, Liveness};
use crate::display::task::{TaskKind, TaskSpec};
use crate::display::traits::{BoxedSink, PanelCommand, PanelGeometry};
use crate::feeds::{FeedKind, FetchError, FetchQuery, Record};
use crate::vframebuf::Frame;

/// Delay before a failed one-shot command is sent again
pub const COMMAND_RETRY: Duration = Duration::from_secs(1);

const MIN_TICK: Duration = Duration::from_millis(10);
const MAX_TICK: Duration = Duration::from_secs(1);

/// Scheduler tunables, see the `scheduler` config section
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerPolicy {
    /// Consecutive sink failures before auto stop, 0 disables
    pub sink_failure_threshold: u32,
    /// Display tick for live clocks
    pub clock_tick: Duration,
    /// Display tick for stock, channel and weather tickers
    pub ticker_tick: Duration,
    /// Pixels per scroll tick
    pub scroll_step: u32,
    /// Blank pixels between the end of looping text and its repeat
    pub scroll_gap: u32,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            sink_failure_threshold: 5,
            clock_tick: Duration::from_millis(250),
            ticker_tick: Duration::from_millis(100),
            scroll_step: 1,
            scroll_gap: 12,
        }
    }
}

impl SchedulerPolicy {
    pub fn normalized(&self) -> Self {
        Self {
            clock_tick: self.clock_tick.clamp(MIN_TICK, MAX_TICK),
            ticker_tick: self.ticker_tick.clamp(MIN_TICK, MAX_TICK),
            scroll_step: self.scroll_step.max(1),
            ..self.clone()
        }
    }
}

/// Notices for the runtime, drained after each turn of the loop
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    Switched { from: Option<TaskKind>, to: Option<TaskKind> },
    /// Finite run finished, scheduler is idle
    BudgetExhausted(TaskKind),
    SinkFailed { consecutive: u32, error: String },
    /// Too many sink failures in a row, scheduler is idle
    AutoStopped { kind: TaskKind, failures: u32 },
    FetchFailed { kind: FeedKind, error: String },
}

/// A fetch the runtime should run off the loop
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub query: FetchQuery,
    /// Liveness of the refresh job that asked; stale once it is cancelled
    pub token: Liveness,
}

/// Result of a fetch, carried back to the loop
#[derive(Debug)]
pub struct FetchOutcome {
    pub token: Liveness,
    pub kind: FeedKind,
    pub result: Result<Record, FetchError>,
}

enum TickOutput {
    Frame(Frame),
    Command(PanelCommand),
}

#[derive(Debug, PartialEq, Eq)]
enum WriteOutcome {
    Sent,
    Failed,
    Stopped,
}

/// Per-run content state, rebuilt on every switch
enum Content {
    Command(PanelCommand),
    Clock { face: ClockFace, line: ScrollingLine, fg: Rgb888, bg: Rgb888 },
    Stock { ticker: StockTicker, line: ScrollingLine, bg: Rgb888 },
    Channel { ticker: ChannelTicker, line: ScrollingLine, bg: Rgb888 },
    Weather { ticker: WeatherTicker, line: ScrollingLine, bg: Rgb888 },
    Animation { state: Box<GeneratorState>, params: AnimationParams },
    Sprite { text: String, line: ScrollingLine, fg: Rgb888, bg: Rgb888 },
}

impl Content {
    fn build(spec: &TaskSpec, geometry: PanelGeometry, fonts: &FontTable, policy: &SchedulerPolicy) -> Self {
        let line = |font: &Option<String>| {
            ScrollingLine::new(
                fonts.resolve(font.as_deref()),
                ScrollState::new(policy.scroll_step, policy.scroll_gap),
            )
        };
        match spec {
            TaskSpec::Clock(t) => match t.clock.command() {
                Some(cmd) => Content::Command(cmd),
                None => Content::Clock {
                    face: ClockFace::new(t.clock.clone(), Duration::from_secs(t.update_secs as u64)),
                    line: line(&t.font),
                    fg: t.color.rgb(),
                    bg: t.bg_color.rgb(),
                },
            },
            TaskSpec::Text(t) => Content::Command(t.command()),
            TaskSpec::Stock(t) => Content::Stock {
                ticker: StockTicker::new(t.format, t.color.rgb()),
                line: line(&t.font),
                bg: t.bg_color.rgb(),
            },
            TaskSpec::ChannelStats(t) => Content::Channel {
                ticker: ChannelTicker::new(t.format, t.color.rgb()),
                line: line(&t.font),
                bg: t.bg_color.rgb(),
            },
            TaskSpec::Weather(t) => Content::Weather {
                ticker: WeatherTicker::new(t.format, t.color.rgb()),
                line: line(&t.font),
                bg: t.bg_color.rgb(),
            },
            TaskSpec::Animation(a) => Content::Animation {
                state: Box::new(GeneratorState::new(a.kind, geometry, &a.params)),
                params: a.params.clone(),
            },
            TaskSpec::SpriteScroll(t) => Content::Sprite {
                text: t.text.clone(),
                line: line(&t.font),
                fg: t.color.rgb(),
                bg: t.bg_color.rgb(),
            },
        }
    }

    fn produce(&mut self, geometry: PanelGeometry, now: Instant, wall: &NaiveDateTime) -> TickOutput {
        match self {
            Content::Command(cmd) => TickOutput::Command(cmd.clone()),
            Content::Clock { face, line, fg, bg } => {
                let text = face.text(now, wall);
                TickOutput::Frame(line.frame(&text, *fg, *bg, geometry))
            }
            Content::Stock { ticker, line, bg } => {
                let s = ticker.styled();
                TickOutput::Frame(line.frame(&s.text, s.fg, *bg, geometry))
            }
            Content::Channel { ticker, line, bg } => {
                let s = ticker.styled();
                TickOutput::Frame(line.frame(&s.text, s.fg, *bg, geometry))
            }
            Content::Weather { ticker, line, bg } => {
                let s = ticker.styled();
                TickOutput::Frame(line.frame(&s.text, s.fg, *bg, geometry))
            }
            Content::Animation { state, params } => TickOutput::Frame(state.step(geometry, params)),
            Content::Sprite { text, line, fg, bg } => TickOutput::Frame(line.frame(text, *fg, *bg, geometry)),
        }
    }

    /// Feed the ticker listens to, if any
    fn feed(&self) -> Option<FeedKind> {
        match self {
            Content::Stock { .. } => Some(FeedKind::Stock),
            Content::Channel { .. } => Some(FeedKind::ChannelStats),
            Content::Weather { .. } => Some(FeedKind::Weather),
            _ => None,
        }
    }

    /// Hand a fetch result to the ticker; false if it is for another feed
    fn apply(&mut self, kind: FeedKind, result: Result<Record, String>) -> bool {
        if self.feed() != Some(kind) {
            return false;
        }
        match (self, result) {
            (Content::Stock { ticker, .. }, Ok(Record::Stock(q))) => ticker.update(Ok(q)),
            (Content::Stock { ticker, .. }, Err(e)) => ticker.update(Err(e)),
            (Content::Channel { ticker, .. }, Ok(Record::ChannelStats(s))) => ticker.update(Ok(s)),
            (Content::Channel { ticker, .. }, Err(e)) => ticker.update(Err(e)),
            (Content::Weather { ticker, .. }, Ok(Record::Weather(r))) => ticker.update(Ok(r)),
            (Content::Weather { ticker, .. }, Err(e)) => ticker.update(Err(e)),
            _ => return false,
        }
        true
    }
}

enum ActiveTask {
    Idle,
    Running {
        kind: TaskKind,
        jobs: JobSet,
        content: Content,
        query: Option<FetchQuery>,
        /// Outlives a one-shot refresh job so its in-flight fetch can be dropped
        refresh: Option<Liveness>,
    },
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Decides which single task owns the panel and drives its ticks.
///
/// Everything runs on the caller's thread. The runtime calls [`poll`]
/// when [`next_deadline`] passes, runs the fetches it takes from
/// [`take_fetch_requests`] elsewhere, and brings results back through
/// [`deliver`].
///
/// [`poll`]: Scheduler::poll
/// [`next_deadline`]: Scheduler::next_deadline
/// [`take_fetch_requests`]: Scheduler::take_fetch_requests
/// [`deliver`]: Scheduler::deliver
pub struct Scheduler {
    geometry: PanelGeometry,
    fonts: FontTable,
    policy: SchedulerPolicy,
    sink: BoxedSink,
    active: ActiveTask,
    next_job_id: u64,
    consecutive_failures: u32,
    last_frame: Option<Frame>,
    fetches: Vec<FetchRequest>,
    events: Vec<SchedulerEvent>,
    wall_clock: fn() -> NaiveDateTime,
}

impl Scheduler {
    pub fn new(geometry: PanelGeometry, fonts: FontTable, policy: SchedulerPolicy, sink: BoxedSink) -> Self {
        info!(
            "Scheduler ready: {}x{} panel, sink '{}'",
            geometry.width,
            geometry.height,
            sink.name()
        );
        Self {
            geometry,
            fonts,
            policy: policy.normalized(),
            sink,
            active: ActiveTask::Idle,
            next_job_id: 0,
            consecutive_failures: 0,
            last_frame: None,
            fetches: Vec::new(),
            events: Vec::new(),
            wall_clock: local_now,
        }
    }

    /// Replace the wall clock the clock task reads
    pub fn with_wall_clock(mut self, wall_clock: fn() -> NaiveDateTime) -> Self {
        self.wall_clock = wall_clock;
        self
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    pub fn policy(&self) -> &SchedulerPolicy {
        &self.policy
    }

    pub fn fonts(&self) -> &FontTable {
        &self.fonts
    }

    /// Register or replace a font. Tasks already running keep the font
    /// they started with.
    pub fn register_font(&mut self, font: SpriteFont) -> Result<(), FontError> {
        self.fonts.register(font)
    }

    pub fn current_kind(&self) -> Option<TaskKind> {
        match &self.active {
            ActiveTask::Idle => None,
            ActiveTask::Running { kind, .. } => Some(*kind),
        }
    }

    pub fn is_active(&self, kind: TaskKind) -> bool {
        self.current_kind() == Some(kind)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.active, ActiveTask::Idle)
    }

    /// Armed jobs of the active task
    pub fn job_count(&self) -> usize {
        match &self.active {
            ActiveTask::Idle => 0,
            ActiveTask::Running { jobs, .. } => jobs.len(),
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Earliest instant a job wants to run
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.active {
            ActiveTask::Idle => None,
            ActiveTask::Running { jobs, .. } => jobs.next_deadline(),
        }
    }

    pub fn switch_to(&mut self, spec: TaskSpec) {
        self.switch_to_at(spec, Instant::now());
    }

    /// Silence the current task and start `spec`; its first ticks are due at `now`
    pub fn switch_to_at(&mut self, spec: TaskSpec, now: Instant) {
        let spec = spec.normalized();
        let previous = self.current_kind();
        self.cancel_active();

        let kind = spec.kind();
        let content = Content::build(&spec, self.geometry, &self.fonts, &self.policy);
        let query = spec.fetch_query();
        let mut jobs = JobSet::default();
        let mut refresh = None;

        // refresh first so the opening fetch is requested before the first frame
        if query.is_some() {
            let job = self.new_job(JobClass::Refresh, spec.refresh_every(), now, None);
            refresh = Some(job.liveness.clone());
            jobs.arm(job);
        }
        let budget = match &spec {
            TaskSpec::Animation(a) => a.params.frame_budget(),
            _ => None,
        };
        let display = self.new_job(JobClass::Display, self.display_interval(&spec), now, budget);
        jobs.arm(display);

        info!("Display task changed: {:?} -> {:?} ({} jobs)", previous, kind, jobs.len());
        self.active = ActiveTask::Running { kind, jobs, content, query, refresh };
        self.events.push(SchedulerEvent::Switched { from: previous, to: Some(kind) });
    }

    /// Cancel everything and go idle
    pub fn stop(&mut self) {
        let previous = self.current_kind();
        self.cancel_active();
        if previous.is_some() {
            info!("Display task stopped: {:?}", previous);
            self.events.push(SchedulerEvent::Switched { from: previous, to: None });
        }
    }

    /// Run every job due at `now`, earliest first. Returns ticks fired.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while let Some(id) = self.next_due_job(now) {
            self.fire(id, now);
            fired += 1;
        }
        fired
    }

    pub fn take_fetch_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.fetches)
    }

    pub fn drain_events(&mut self) -> Vec<SchedulerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Apply a fetch result. Results whose refresh job was cancelled are
    /// dropped. Returns true when a ticker took the record.
    pub fn deliver(&mut self, outcome: FetchOutcome) -> bool {
        if !outcome.token.is_live() {
            debug!("Discarding stale {:?} fetch result", outcome.kind);
            return false;
        }
        let ActiveTask::Running { content, .. } = &mut self.active else {
            return false;
        };
        if content.feed() != Some(outcome.kind) {
            debug!("Ignoring {:?} fetch result, no ticker for it", outcome.kind);
            return false;
        }
        let result = outcome.result.map_err(|e| e.to_string());
        if let Err(e) = &result {
            warn!("{:?} fetch failed: {}", outcome.kind, e);
            self.events.push(SchedulerEvent::FetchFailed { kind: outcome.kind, error: e.clone() });
        }
        content.apply(outcome.kind, result)
    }

    fn display_interval(&self, spec: &TaskSpec) -> Option<Duration> {
        match spec {
            TaskSpec::Clock(t) if t.clock.command().is_some() => None,
            TaskSpec::Clock(_) => Some(self.policy.clock_tick),
            TaskSpec::Text(_) => None,
            TaskSpec::Stock(_) | TaskSpec::ChannelStats(_) | TaskSpec::Weather(_) => Some(self.policy.ticker_tick),
            TaskSpec::Animation(a) => Some(a.params.frame_interval()),
            TaskSpec::SpriteScroll(t) => Some(Duration::from_micros(1_000_000 / t.speed.max(1) as u64)),
        }
    }

    fn new_job(&mut self, class: JobClass, every: Option<Duration>, now: Instant, budget: Option<u32>) -> JobHandle {
        self.next_job_id += 1;
        JobHandle {
            id: JobId(self.next_job_id),
            class,
            liveness: Liveness::new(),
            every,
            next_due: now,
            budget,
        }
    }

    fn cancel_active(&mut self) {
        if let ActiveTask::Running { jobs, refresh, .. } = &mut self.active {
            jobs.cancel_all();
            if let Some(token) = refresh.take() {
                token.cancel();
            }
        }
        self.active = ActiveTask::Idle;
        self.fetches.retain(|r| r.token.is_live());
        self.last_frame = None;
        self.consecutive_failures = 0;
    }

    fn next_due_job(&self, now: Instant) -> Option<JobId> {
        match &self.active {
            ActiveTask::Idle => None,
            ActiveTask::Running { jobs, .. } => jobs.next_due(now),
        }
    }

    fn fire(&mut self, id: JobId, now: Instant) {
        let wall = (self.wall_clock)();
        let ActiveTask::Running { kind, jobs, content, query, .. } = &mut self.active else {
            return;
        };
        let kind = *kind;
        let Some(job) = jobs.get(id) else { return };
        if !job.liveness.is_live() {
            jobs.remove(id);
            return;
        }

        let class = job.class;
        match class {
            JobClass::Refresh => {
                if let Some(q) = query.as_ref() {
                    debug!("Requesting {:?} refresh", q.kind());
                    self.fetches.push(FetchRequest { query: q.clone(), token: job.liveness.clone() });
                }
            }
            JobClass::Display => {
                let out = content.produce(self.geometry, now, &wall);
                match self.write(out) {
                    WriteOutcome::Sent => {}
                    WriteOutcome::Stopped => {
                        self.events.push(SchedulerEvent::AutoStopped {
                            kind,
                            failures: self.policy.sink_failure_threshold,
                        });
                        return;
                    }
                    WriteOutcome::Failed => {
                        // one-shot commands are retried rather than lost
                        if let ActiveTask::Running { jobs, .. } = &mut self.active {
                            if let Some(job) = jobs.get_mut(id).filter(|j| j.every.is_none()) {
                                job.next_due = now + COMMAND_RETRY;
                                return;
                            }
                        }
                    }
                }
            }
        }

        let ActiveTask::Running { jobs, .. } = &mut self.active else { return };
        let Some(job) = jobs.get_mut(id) else { return };
        let exhausted = match job.budget.as_mut() {
            Some(left) => {
                *left = left.saturating_sub(1);
                *left == 0
            }
            None => false,
        };
        if exhausted {
            job.liveness.cancel();
            info!("{:?} finished its frame budget", kind);
            self.stop();
            self.events.push(SchedulerEvent::BudgetExhausted(kind));
            return;
        }
        if job.every.is_some() {
            job.rearm(now);
        } else {
            jobs.remove(id);
        }
    }

    fn write(&mut self, out: TickOutput) -> WriteOutcome {
        let result = match &out {
            TickOutput::Frame(frame) => {
                if self.last_frame.as_ref() == Some(frame) {
                    return WriteOutcome::Sent;
                }
                self.geometry
                    .check(frame)
                    .map_err(SinkError::from)
                    .and_then(|_| self.sink.send(frame))
            }
            TickOutput::Command(cmd) => self.sink.send_command(cmd),
        };

        match result {
            Ok(()) => {
                self.consecutive_failures = 0;
                if let TickOutput::Frame(frame) = out {
                    self.last_frame = Some(frame);
                }
                WriteOutcome::Sent
            }
            Err(e) => {
                self.consecutive_failures += 1;
                let n = self.consecutive_failures;
                warn!("Sink '{}' write failed ({} in a row): {}", self.sink.name(), n, e);
                self.events.push(SchedulerEvent::SinkFailed { consecutive: n, error: e.to_string() });
                let threshold = self.policy.sink_failure_threshold;
                if threshold > 0 && n >= threshold {
                    error!("Sink failed {} times in a row, stopping display task", n);
                    self.stop();
                    return WriteOutcome::Stopped;
                }
                WriteOutcome::Failed
            }
        }
    }
}
