//! Removes frames of a video that are near duplicates of an earlier frame.
//!
//! The frames are split into contiguous partitions, one per worker, and each worker does
//! a greedy forward sweep over its partition comparing single channel color histograms.
//! Frames are never compared across partitions.

pub mod args;
pub mod frame_store;
pub mod histogram;
pub mod partition;
pub mod report;
pub mod sweeper;
