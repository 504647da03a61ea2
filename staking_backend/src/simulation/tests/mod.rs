mod stress_tests;
mod integration;
