pub mod coordinator;
pub mod directory;
pub mod links;
pub mod testing;

pub use coordinator::{IngestionCoordinator, ReconcileStats, WALL_FETCH_LIMIT};
pub use directory::{GroupDirectory, WallSource};
pub use links::{extract_screen_name, resolve, validate_screen_name};
