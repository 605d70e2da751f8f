//! Streaming merge engine for imgmerge.
//!
//! A [`MergeSession`] bundles the captures, the merged output sink, and the
//! anomaly log sink. A [`MergeDriver`] walks the session sector by sector,
//! hands each set of blocks to the selector, and appends the winning block
//! (or the sentinel) to the output. Memory use is bounded by one sector per
//! capture regardless of image size.
//!
//! ```rust
//! use imgm_merge::{InputSource, MergeConfig, MergeDriver, MergeSession, NoProgress};
//!
//! let image = vec![0u8; 1024];
//! let inputs = vec![
//!     InputSource::new("a", &image[..]),
//!     InputSource::new("b", &image[..]),
//! ];
//! let session = MergeSession::new(inputs, Vec::<u8>::new(), Vec::<u8>::new(), 1024).unwrap();
//! let mut driver = MergeDriver::new(session, MergeConfig::default()).unwrap();
//! let report = driver.run(&mut NoProgress).unwrap();
//! assert_eq!(report.selected, 2);
//! ```

pub mod arena;
pub mod config;
pub mod driver;
pub mod error;
pub mod log;
pub mod progress;
pub mod report;
pub mod session;

pub use arena::SectorArena;
pub use config::{MergeConfig, DEFAULT_PROGRESS_INTERVAL};
pub use driver::{DriverState, MergeDriver};
pub use error::{MergeError, MergeResult};
pub use log::AnomalyLog;
pub use progress::{NoProgress, ProgressObserver};
pub use report::MergeReport;
pub use session::{InputSource, MergeSession};
