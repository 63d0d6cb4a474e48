// mavtrack - a live GPS track visualizer for MAVLink vehicles
// Copyright (C) 2026  Datong Sun (dndx@idndx.com)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use super::Coordinate;
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

/// A fixed capacity track. Once full, every append evicts the oldest point.
///
/// Reads copy the points out under a shared lock, so a reader always sees
/// whole points and never more than `capacity` of them.
#[derive(Debug)]
pub struct HistoryBuffer {
    capacity: usize,
    points: RwLock<VecDeque<Coordinate>>,
}

impl HistoryBuffer {
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be positive");

        Self {
            capacity,
            points: RwLock::new(VecDeque::new()),
        }
    }

    pub fn append(&self, point: Coordinate) {
        let mut points = self.points.write().unwrap_or_else(PoisonError::into_inner);

        if points.len() == self.capacity {
            points.pop_front();
        }

        points.push_back(point);
    }

    /// Points in arrival order, oldest first
    pub fn snapshot(&self) -> Vec<Coordinate> {
        let points = self.points.read().unwrap_or_else(PoisonError::into_inner);
        let (first, second) = points.as_slices();

        let mut v = Vec::with_capacity(points.len());
        v.extend_from_slice(first);
        v.extend_from_slice(second);
        v
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .copied()
    }

    pub fn len(&self) -> usize {
        self.points.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
