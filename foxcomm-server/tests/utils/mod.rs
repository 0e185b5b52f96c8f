pub mod ws_test_client;

pub use relay_helpers::*;
pub use ws_test_client::*;
