pub mod compliance_graph;
