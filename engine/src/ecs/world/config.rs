use crate::ecs::storage::GrowthStrategy;

/// Settings applied to every component store a world creates.
///
/// ```rust
/// use packed_ecs::ecs::{Config, World, storage::GrowthStrategy};
///
/// let world = World::with_config(
///     Config::default()
///         .with_growth(GrowthStrategy::Buffer(256))
///         .with_initial_capacity(1024),
/// );
/// assert_eq!(world.config().initial_capacity, 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How a store grows when it runs out of room. Defaults to doubling.
    pub growth: GrowthStrategy,

    /// Records allocated up front when a store is created. Defaults to 0.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            growth: GrowthStrategy::default(),
            initial_capacity: 0,
        }
    }
}

impl Config {
    #[inline]
    pub fn with_growth(mut self, growth: GrowthStrategy) -> Self {
        self.growth = growth;
        self
    }

    #[inline]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}
