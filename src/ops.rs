//! Operators: publishers built on top of another publisher.
//!
//! Value operators (`map`, `try_map`, `map_err`, `scan`, `decode`) wrap the
//! downstream subscriber and hand it the upstream subscription unchanged, so
//! demand flows straight through. The debugging operators interpose a thin
//! subscription to observe requests and cancels.

pub mod breakpoint;
pub mod decode;
pub mod handle_events;
pub mod map;
pub mod map_err;
pub mod multicast;
pub mod print;
pub mod scan;
pub mod try_map;
pub mod values;

pub use breakpoint::Breakpoint;
pub use decode::Decode;
pub use handle_events::{EventHandlers, HandleEvents};
pub use map::Map;
pub use map_err::MapErr;
pub use multicast::{Autoconnect, ConnectablePublisher, Multicast};
pub use print::Print;
pub use scan::Scan;
pub use try_map::TryMap;
pub use values::Values;
