pub mod docker;

pub use docker::{BootstrapOutcome, DockerBootstrap};
