mod food;
mod order;

pub use food::{Food, FoodUpdate, SoldItemsUpdate, StoredFood, PROVIDER_EMAIL, SOLD_ITEMS};
pub use order::{Order, BUYER_EMAIL};
