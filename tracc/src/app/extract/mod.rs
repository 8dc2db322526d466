pub mod extract_ops;
