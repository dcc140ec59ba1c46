//! Package index mirror selection and pip invocation.
//!
//! Mirrors from a static [`Registry`] are probed in parallel, the fastest
//! reachable one is chosen, and pip is run against it. The choice can also be
//! written to pip's own configuration file.
//!
//! # Example
//!
//! ```no_run
//! use mirror::{HttpProbe, PROBE_TIMEOUT, Registry, choose_mirror};
//!
//! let registry = Registry::builtin();
//! let probe = HttpProbe::new(PROBE_TIMEOUT).unwrap();
//! let choice = choose_mirror(&registry, &probe, None).unwrap();
//! println!("using {}", choice.selection.mirror().url);
//! ```

mod error;
pub mod command;
pub mod pip_config;
pub mod probe;
pub mod registry;
pub mod select;

pub use command::{
    CommandRunner, InstallTarget, PipCommand, ProcessRunner, RunOutput, default_python,
    trusted_host,
};
pub use error::{Error, Result};
pub use probe::{HttpProbe, PROBE_TIMEOUT, Probe, ProbeResult, probe_all, probe_url};
pub use registry::{DEFAULT_PROBE_SET, MIRRORS, Mirror, OFFICIAL_MIRROR, Registry};
pub use select::{Choice, Selection, choose_mirror, select_fastest};
