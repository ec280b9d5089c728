pub mod maintenance;

pub use maintenance::maintenance_middleware;
