pub mod outfit;
pub mod user;

pub use outfit::{
    ItemCategory, NewOutfit, NewOutfitItem, Outfit, OutfitDetails, OutfitItem, OutfitItemPayload,
    OutfitPage, OutfitPayload, OwnedOutfitRef, OwnerSummary,
};
pub use user::{User, UserProfile};
