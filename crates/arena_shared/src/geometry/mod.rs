//! Spatial value types: dots, areas, locations and shape generators.

mod area;
mod direction;
mod dot;
mod dots_mask;
mod location;
mod rect;

pub use area::Area;
pub use direction::Direction;
pub use dot::Dot;
pub use dots_mask::DotsMask;
pub use location::Location;
pub use rect::Rect;
