pub mod network_graph;
