//! Integration Tests Module
//!
//! Drives `AppState` and `Session` end to end against in-memory SQLite with a
//! scripted language model: statement execution and session slots, analysis
//! and chat, visualization and charts, and the session registry.

// Shared fixtures and the scripted language model
mod support;

// Policy gate, dispatcher and session slot transitions
mod pipeline_test;

// Analysis log, row capping and chat
mod analysis_test;

// Visualization data and chart rendering
mod visualization_test;

// Session registry, settings, model selection and optimizer
mod registry_test;
