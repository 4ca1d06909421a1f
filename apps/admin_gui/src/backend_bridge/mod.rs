//! Backend bridge: command queue contract and the worker thread that serves it.

pub mod commands;
pub mod runtime;
