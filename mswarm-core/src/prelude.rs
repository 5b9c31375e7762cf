//! # Prelude - Re-exportações Convenientes
//!
//! ```
//! use mswarm_core::prelude::*;
//! ```

pub use crate::cost::{Benchmark, CostFn, CostFunction};
pub use crate::error::{CoreError, CoreResult};
pub use crate::position::Position;
pub use crate::world::{BoxWorld, World};
