pub mod mlp;
pub mod spec;

pub use mlp::{ForwardTrace, Gradients, Mlp};
pub use spec::MlpSpec;
