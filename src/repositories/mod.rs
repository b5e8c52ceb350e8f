pub mod outfit_repository;
pub mod user_repository;

pub use outfit_repository::{
    OutfitRepository, SaveOutcome, SlugAssignment, SqliteOutfitRepository,
};
pub use user_repository::{SqliteUserRepository, UserRepository};
