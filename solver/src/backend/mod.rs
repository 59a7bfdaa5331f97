pub mod z3;
