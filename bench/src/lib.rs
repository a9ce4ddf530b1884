//! Benchmark utilities for the packed ECS.
//!
//! - **Microbenchmarks**: entity creation, joins over one and several stores, and frame
//!   barriers that compact stores after heavy destruction.
//! - **Fixtures**: representative component types and deterministic world setup.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench -p packed_ecs_bench
//!
//! # Run specific benchmark group
//! cargo bench -p packed_ecs_bench -- barrier
//! ```
//!
//! Results are written to `target/criterion/` with HTML reports for visualization.

pub mod components;
pub mod fixtures;
