/// Reader and writer traits shared by every item source and sink.
pub mod item;

/// Tasklet steps and their execution record.
pub mod step;
