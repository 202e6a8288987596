pub mod agent;
pub mod belief;
pub mod desire;
pub mod phase;
