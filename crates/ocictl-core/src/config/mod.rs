//! Configuration for ocictl
//!
//! Two files are involved:
//!
//! - the ocictl settings file (TOML, platform config directory) with
//!   defaults such as the profile to use, wait timings and a default
//!   compartment per profile
//! - the OCI credentials file (INI, `~/.oci/config`) shared with the
//!   official tooling, from which a named [`OciProfile`] is read
//!
//! Both are optional to different degrees: missing settings fall back to
//! defaults, a missing or incomplete credentials profile is an error.

pub mod error;
pub mod oci;
pub mod settings;

pub use error::{ConfigError, Result};
pub use oci::{DEFAULT_PROFILE, OciProfile};
pub use settings::{ProfileSettings, Settings, WaitSettings};
