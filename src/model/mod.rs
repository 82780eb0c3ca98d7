//! Physical data carried in and out of restart files.
//!
//! - [`cell`] – Unit cell lengths and angles with a derived [`CellShape`].
//! - [`frame`] – A single snapshot: positions, optional velocities and the cell.
//!
//! [`CellShape`]: cell::CellShape

pub mod cell;
pub mod frame;
