//! Clash Verge profiles
//!
//! The GUI keeps an index of subscription profiles next to the files
//! themselves. The daemon knows nothing about them: switching a profile
//! means loading its file into the daemon and recording it as current.

pub mod store;
pub mod types;

pub use store::ProfileStore;
pub use types::{
    Profile, ProfileFile, ProfileIndex, ProfileItem, ProfileNode, TrafficUsage, find_profile,
};
