// Controller test module
#[cfg(test)]
mod controller_tests;
