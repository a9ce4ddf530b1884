pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod storage;
pub(crate) mod util;
pub mod world;

pub use component::Component;
pub use entity::Entity;
pub use error::{Error, Result};
pub use query::Join;
pub use world::{BarrierStats, Config, Deferred, EntityMut, World};

pub use packed_ecs_macros::Component;
