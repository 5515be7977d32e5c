pub mod audio;
pub mod config;
pub mod constants;
pub mod engine;
pub mod frame;
pub mod graph;
pub mod harmony;
pub mod interaction;
pub mod levels;
pub mod polygon;
pub mod render;
pub mod repulsion;
pub mod tessellation;
pub mod territory;
pub mod weights;

pub use audio::*;
pub use config::*;
pub use constants::*;
pub use engine::*;
pub use graph::*;
pub use harmony::*;
pub use interaction::*;
pub use levels::*;
pub use polygon::*;
pub use render::*;
pub use repulsion::*;
pub use tessellation::*;
pub use territory::*;
pub use weights::*;
