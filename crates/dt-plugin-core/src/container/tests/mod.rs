// Service container test module
#[cfg(test)]
mod container_tests;
