//! # Tasklet Module
//!
//! This module provides tasklet implementations built on the CSV reader and writer.
//! Tasklets are single-task operations run inside a [`TaskletStep`](crate::core::step::TaskletStep).

#[cfg(feature = "brand-count")]
#[cfg_attr(docsrs, doc(cfg(feature = "brand-count")))]
pub mod brand_count;
