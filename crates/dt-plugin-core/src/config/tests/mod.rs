#[cfg(test)]
mod loader_tests;
