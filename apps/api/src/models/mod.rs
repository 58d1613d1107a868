pub mod literal;
pub mod profile;

pub use profile::{Profile, TechnicalSkills};
