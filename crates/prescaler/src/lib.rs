//! # Prescaler
//!
//! Optional image down-scaling ahead of reconstruction.
//!
//! Responsibilities:
//! - Move `images/` aside to `images_original/` and rebuild `images/`
//! - Resize each supported image through the external `convert` tool
//! - Apply the unscaled-image policy for the 1600px long-edge mode
//!
//! Failures never escape as `Err`: they are logged and returned inside a
//! [`contracts::PrescaleReport`].

mod resize;
mod scaler;

pub use resize::{resize_command, within_long_edge};
pub use scaler::Prescaler;
