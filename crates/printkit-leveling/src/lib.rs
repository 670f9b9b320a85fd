//! # PrintKit Leveling
//!
//! Corrects outbound motion commands for an uneven bed. Probe samples are
//! triangulated, each triangle becomes a plane, and the Z of every move is
//! raised by the height of the plane nearest its destination.

pub mod delaunay;
pub mod functions;
pub mod region;

pub use delaunay::triangulate;
pub use functions::{LevelingData, LevelingFunctions, EXTRA_VERTEX_X};
pub use region::LevelingTriangle;
