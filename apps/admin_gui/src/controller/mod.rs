//! Controller layer: list query state, form state machine, UI events, and command orchestration.

pub mod events;
pub mod form;
pub mod orchestration;
pub mod page;
pub mod query;
