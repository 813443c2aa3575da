/*
 *  display/jobs.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Job handles with liveness flags and the set the scheduler arms
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

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared cancel flag. Clones observe the same flag, so a fetch worker
/// holding one can tell its result went stale.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_live(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Idempotent
    pub fn cancel(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobClass {
    /// Produces a frame or command each tick
    Display,
    /// Requests a feed fetch each tick
    Refresh,
}

#[derive(Debug, Clone)]
pub struct JobHandle {
    pub id: JobId,
    pub class: JobClass,
    pub liveness: Liveness,
    /// None for one-shot jobs
    pub every: Option<Duration>,
    pub next_due: Instant,
    /// Ticks left before the task auto-stops
    pub budget: Option<u32>,
}

impl JobHandle {
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due <= now
    }

    /// Advance to the next period. Missed periods are skipped rather than
    /// replayed, so a stalled loop never fires a burst.
    pub fn rearm(&mut self, now: Instant) {
        if let Some(every) = self.every {
            self.next_due += every;
            if self.next_due <= now {
                self.next_due = now + every;
            }
        }
    }
}

/// Job handles belonging to the active task
#[derive(Debug, Default)]
pub struct JobSet {
    jobs: Vec<JobHandle>,
}

impl JobSet {
    pub fn arm(&mut self, job: JobHandle) {
        self.jobs.push(job);
    }

    /// Flip every liveness flag then drop the handles
    pub fn cancel_all(&mut self) {
        for job in &self.jobs {
            job.liveness.cancel();
        }
        self.jobs.clear();
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, id: JobId) -> Option<&JobHandle> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn get_mut(&mut self, id: JobId) -> Option<&mut JobHandle> {
        self.jobs.iter_mut().find(|j| j.id == id)
    }

    pub fn remove(&mut self, id: JobId) -> Option<JobHandle> {
        let pos = self.jobs.iter().position(|j| j.id == id)?;
        Some(self.jobs.remove(pos))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.jobs.iter().map(|j| j.next_due).min()
    }

    /// Earliest due job, ties broken by arming order
    pub fn next_due(&self, now: Instant) -> Option<JobId> {
        self.jobs
            .iter()
            .filter(|j| j.is_due(now))
            .min_by_key(|j| (j.next_due, j.id))
            .map(|j| j.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: u64, due: Instant, every: Option<Duration>) -> JobHandle {
        JobHandle {
            id: JobId(id),
            class: JobClass::Display,
            liveness: Liveness::new(),
            every,
            next_due: due,
            budget: None,
        }
    }

    #[test]
    fn test_cancel_all_flips_shared_flags() {
        let t0 = Instant::now();
        let mut set = JobSet::default();
        let j = job(1, t0, None);
        let token = j.liveness.clone();
        set.arm(j);
        set.cancel_all();
        set.cancel_all();
        assert!(set.is_empty());
        assert!(!token.is_live());
    }

    #[test]
    fn test_rearm_skips_missed_periods() {
        let t0 = Instant::now();
        let mut j = job(1, t0, Some(Duration::from_millis(100)));
        j.rearm(t0);
        assert_eq!(j.next_due, t0 + Duration::from_millis(100));
        // loop stalled for a second
        let late = t0 + Duration::from_secs(1);
        j.rearm(late);
        assert_eq!(j.next_due, late + Duration::from_millis(100));
    }

    #[test]
    fn test_next_due_ordering() {
        let t0 = Instant::now();
        let mut set = JobSet::default();
        set.arm(job(2, t0 + Duration::from_millis(5), None));
        set.arm(job(1, t0 + Duration::from_millis(5), None));
        set.arm(job(3, t0 + Duration::from_millis(50), None));
        let now = t0 + Duration::from_millis(10);
        assert_eq!(set.next_due(now), Some(JobId(1)));
        assert_eq!(set.next_deadline(), Some(t0 + Duration::from_millis(5)));
        set.remove(JobId(1));
        assert_eq!(set.next_due(now), Some(JobId(2)));
    }
}
