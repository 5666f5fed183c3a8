// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod editor;
pub mod feed;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod state;
pub mod store;
pub mod totals;
pub mod validation;

pub use editor::*;
pub use feed::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use state::*;
pub use store::*;
pub use totals::*;
pub use validation::*;
