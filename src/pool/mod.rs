pub mod objectives;
pub mod resources;
pub mod sampler;

pub use objectives::ObjectivePool;
pub use resources::ResourcePool;
pub use sampler::distribute;
