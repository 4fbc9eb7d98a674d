pub mod analysis;
pub mod config;
#[cfg(feature = "hepmc2")]
mod convert_hepmc2;
#[cfg(feature = "lhef")]
mod convert_lhef;
pub mod dump;
pub mod error;
pub mod event;
pub mod histogram;
pub mod kinematics;
pub mod output;
pub mod reader;
pub mod track_eff;
mod util;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::event::Event;
