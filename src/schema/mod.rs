pub mod scene;
pub mod state;
