#![allow(dead_code)]

pub mod app;
pub mod factory;

#[allow(unused_imports)]
pub use app::{api_key_config, test_config, TestApp, TEST_API_KEY};
#[allow(unused_imports)]
pub use factory::{Factory, TestAuth};
