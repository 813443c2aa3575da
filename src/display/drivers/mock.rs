/*
 *  display/drivers/mock.rs
 *
 *  PixelDeck - every pixel counts
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock sink - records frames and commands without a panel attached
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

use std::sync::{Arc, Mutex, MutexGuard};

use crate::display::error::SinkError;
use crate::display::traits::{OutputSink, PanelCommand};
use crate::vframebuf::Frame;

/// Mock sink
///
/// Records everything written to it so tests can inspect what the
/// scheduler produced. The `null` sink is the same type with nobody
/// looking at the state.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    state: Arc<Mutex<MockSinkState>>,
}

/// Shared state, cloned out with [`MockSink::state`]
#[derive(Debug, Default)]
pub struct MockSinkState {
    /// Frames accepted, in order
    pub frames: Vec<Frame>,

    /// Commands accepted, in order
    pub commands: Vec<PanelCommand>,

    /// Write attempts including failed ones
    pub attempts: usize,

    /// Fail every write while set
    pub simulate_send_failure: bool,

    /// Fail this many writes, then recover
    pub fail_next: u32,

    /// Keep only the newest frames when set
    pub keep_frames: Option<usize>,
}

impl MockSinkState {
    fn should_fail(&mut self) -> bool {
        self.attempts += 1;
        if self.simulate_send_failure {
            return true;
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return true;
        }
        false
    }
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that only remembers the newest `n` frames
    pub fn bounded(n: usize) -> Self {
        let sink = Self::default();
        if let Ok(mut st) = sink.state.lock() {
            st.keep_frames = Some(n);
        }
        sink
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockSinkState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockSinkState>, SinkError> {
        self.state
            .lock()
            .map_err(|_| SinkError::Disconnected("mock state poisoned".to_string()))
    }
}

impl OutputSink for MockSink {
    fn name(&self) -> &str {
        "mock"
    }

    fn send(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let mut st = self.lock()?;
        if st.should_fail() {
            return Err(SinkError::Disconnected("simulated send failure".to_string()));
        }
        st.frames.push(frame.clone());
        if let Some(keep) = st.keep_frames {
            let excess = st.frames.len().saturating_sub(keep);
            st.frames.drain(..excess);
        }
        Ok(())
    }

    fn send_command(&mut self, command: &PanelCommand) -> Result<(), SinkError> {
        let mut st = self.lock()?;
        if st.should_fail() {
            return Err(SinkError::Disconnected("simulated send failure".to_string()));
        }
        st.commands.push(command.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::traits::PanelGeometry;
    use crate::display::color::BACKGROUND;

    #[test]
    fn test_mock_records_frames() {
        let mut sink = MockSink::new();
        let state = sink.state();
        let frame = PanelGeometry::default().blank(BACKGROUND);
        sink.send(&frame).unwrap();
        sink.send_command(&PanelCommand::Clock { style: 0 }).unwrap();
        let st = state.lock().unwrap();
        assert_eq!(st.frames.len(), 1);
        assert_eq!(st.commands.len(), 1);
        assert_eq!(st.attempts, 2);
    }

    #[test]
    fn test_mock_fail_next_recovers() {
        let mut sink = MockSink::new();
        sink.state().lock().unwrap().fail_next = 2;
        let frame = PanelGeometry::default().blank(BACKGROUND);
        assert!(sink.send(&frame).is_err());
        assert!(sink.send(&frame).is_err());
        assert!(sink.send(&frame).is_ok());
        assert_eq!(sink.state().lock().unwrap().frames.len(), 1);
    }

    #[test]
    fn test_bounded_keeps_newest() {
        let mut sink = MockSink::bounded(2);
        let g = PanelGeometry::default();
        for _ in 0..5 {
            sink.send(&g.blank(BACKGROUND)).unwrap();
        }
        assert_eq!(sink.state().lock().unwrap().frames.len(), 2);
    }
}
