pub mod detail_panel;
pub mod filters;
pub mod force_graph;
