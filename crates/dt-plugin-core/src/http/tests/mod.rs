#[cfg(test)]
mod response_tests;
