// This is free and unencumbered software released into the public domain.

mod characteristics;
pub use characteristics::*;

mod config;
pub use config::*;

mod dispatch;
pub use dispatch::*;

mod error;
pub use error::*;

mod frame;
pub use frame::*;

mod host;
pub use host::*;

mod select;
pub use select::*;

mod session;
pub use session::*;

pub mod drivers {
    #[cfg(all(feature = "android", target_os = "android"))]
    pub mod android;

    #[cfg(test)]
    pub(crate) mod fake;
}

mod open;
pub use open::*;
