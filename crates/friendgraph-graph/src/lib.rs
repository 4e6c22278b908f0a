pub mod degree;
pub mod engine;
pub mod fixture;
pub mod lister;
pub mod memory_storage;
pub mod mutual;

pub use degree::DegreeCounter;
pub use engine::*;
pub use fixture::*;
pub use lister::FriendLister;
pub use memory_storage::*;
pub use mutual::MutualCounter;
