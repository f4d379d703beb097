//! Cross-platform utilities shared by the detectors.

pub mod platform;
