mod paths;
mod platform;

pub use paths::DriverPaths;
pub use platform::Platform;
