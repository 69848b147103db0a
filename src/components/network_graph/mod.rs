//! Interactive network explorer: node/edge data from the API drawn on a canvas, with
//! neighbourhood highlighting, shortest-path selection and URL-backed column choices.

mod api;
mod canvas;
mod click;
mod color;
mod component;
mod controller;
mod highlight;
mod history;
mod render;
mod shortest_path;
mod state;
mod surface;
mod types;

pub use color::{DIM_COLOR, SECONDARY_DIM_COLOR};
pub use component::NetworkExplorer;
pub use types::ColorSpec;
