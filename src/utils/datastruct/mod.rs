pub mod arena;
pub mod heap;
pub mod map;
pub mod queue;
