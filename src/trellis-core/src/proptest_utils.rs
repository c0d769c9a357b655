//! Property-based testing utilities for trellis-core.
//!
//! This module provides proptest strategies for core types and the
//! property tests that pin down the value order and row algebra.
