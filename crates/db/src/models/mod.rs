//! Typed document models and their DTOs.

pub mod inventory;
pub mod user;

pub use inventory::{InventoryDraft, InventoryItem, InventoryPatch, InventoryResponse};
pub use user::{AuthToken, User, UserPatch, UserResponse};
