// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod columns;
pub mod forms;
pub mod gateway;
pub mod grid;
pub mod ids;
pub mod model;
pub mod pointer;
pub mod shell;

pub use columns::*;
pub use forms::*;
pub use gateway::*;
pub use grid::*;
pub use ids::*;
pub use model::*;
pub use pointer::*;
pub use shell::*;
