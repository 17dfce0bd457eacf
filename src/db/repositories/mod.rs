pub mod feedback;
pub mod interviews;
