pub mod earley;
pub mod walker;
