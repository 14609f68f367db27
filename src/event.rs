// SliceSim: Real-time network slice provisioning written in Rust
// Copyright (C) 2023 Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Module containing the definitions for the events and the event queue.

use std::cmp::Reverse;

use ordered_float::NotNan;
use priority_queue::PriorityQueue;

use crate::types::SliceId;

/// Kind of an event. At the same instant, arrivals are processed before departures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum EventKind {
    /// A slice request arrives and should be provisioned.
    Arrival,
    /// An active slice departs and its resources are released.
    Departure,
}

/// Event in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Event {
    /// Time at which the event happens
    pub time: NotNan<f64>,
    /// What happens
    pub kind: EventKind,
    /// Slice to which the event refers
    pub slice: SliceId,
}

impl Event {
    /// Create an arrival event.
    pub fn arrival(time: NotNan<f64>, slice: SliceId) -> Self {
        Self {
            time,
            kind: EventKind::Arrival,
            slice,
        }
    }

    /// Create a departure event.
    pub fn departure(time: NotNan<f64>, slice: SliceId) -> Self {
        Self {
            time,
            kind: EventKind::Departure,
            slice,
        }
    }
}

/// Interface of an event queue.
pub trait EventQueue {
    /// Enqueue a new event.
    fn push(&mut self, event: Event);

    /// pop the next event
    fn pop(&mut self) -> Option<Event>;

    /// peek the next event
    fn peek(&self) -> Option<&Event>;

    /// Get the number of enqueued events
    fn len(&self) -> usize;

    /// Return `True` if no event is enqueued.
    fn is_empty(&self) -> bool;

    /// Remove all events from the queue.
    fn clear(&mut self);

    /// Get the time of the last event that was popped.
    fn get_time(&self) -> f64;
}

/// Priority of an event: the time, then the kind, then the order of insertion.
type Priority = Reverse<(NotNan<f64>, EventKind, usize)>;

/// Event queue that processes events in non-decreasing time. Events at the same time are ordered
/// by their kind (arrivals first), and then by the order in which they were pushed.
#[derive(Debug, Clone, Default)]
pub struct TimedEventQueue {
    /// Enqueued events
    q: PriorityQueue<Event, Priority>,
    /// Number of events pushed so far
    seq: usize,
    /// Time of the last popped event
    current_time: NotNan<f64>,
}

impl TimedEventQueue {
    /// Create a new, empty queue
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventQueue for TimedEventQueue {
    fn push(&mut self, event: Event) {
        let priority = Reverse((event.time, event.kind, self.seq));
        self.seq += 1;
        self.q.push(event, priority);
    }

    fn pop(&mut self) -> Option<Event> {
        let (event, _) = self.q.pop()?;
        self.current_time = event.time;
        Some(event)
    }

    fn peek(&self) -> Option<&Event> {
        self.q.peek().map(|(e, _)| e)
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    fn clear(&mut self) {
        self.q.clear();
        self.seq = 0;
        self.current_time = NotNan::default();
    }

    fn get_time(&self) -> f64 {
        self.current_time.into_inner()
    }
}
