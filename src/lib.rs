// Copyright (C) 2026  Caprica Software Limited
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
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! View-model adapters for a media library.
//!
//! The crate presents the catalog of playlists, each playlist, and filtered
//! views of the music library as flat, randomly addressable lists through the
//! [`TreeModel`](store::TreeModel) protocol, and keeps them in step with the
//! in-memory [`Db`](db::Db) through the [`MutationBridge`](bridge::MutationBridge).
//!
//! The backend may be mutated from any thread; its notifications must be
//! handed to the thread that owns the stores, in order, and dispatched there.

pub mod bridge;
pub mod db;
pub mod model;
pub mod player;
pub mod projection;
pub mod store;
pub mod util;
