//! Property tests for stack discipline and checkpoint index consistency

mod checkpoint_index;
mod stack_discipline;
