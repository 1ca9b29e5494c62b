#[cfg(test)]
mod support_tests;
