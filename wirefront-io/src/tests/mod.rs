//! Test modules for wirefront-io
//!
//! This module organizes tests for the OBJ semantic parser, covering the
//! line state machine, face outlines and the diagnostics kept for dropped
//! lines.

mod obj_tests;
