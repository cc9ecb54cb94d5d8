pub mod cache;
pub mod hash;
pub mod list;
pub mod set;
pub mod sorted_set;
pub mod traits;
