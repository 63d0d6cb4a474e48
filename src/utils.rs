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

/// MAVLink position fields are degrees scaled by 1e7
#[macro_export]
macro_rules! deg_e7 {
    ($x:expr) => (($x as f64) / 1e7_f64);
}

#[macro_export]
macro_rules! cmps_to_mps {
    ($x:expr) => (($x as f64) / 100_f64);
}
