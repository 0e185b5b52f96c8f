pub use foxcomm_core::model::{Envelope, PeerId, RoomId};

pub mod model {
    pub use foxcomm_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use foxcomm_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use foxcomm_client::*;
}
