pub mod foldsort_core;
