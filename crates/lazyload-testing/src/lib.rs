//! Testing utilities and harness for Lazyload

pub mod testing;
pub mod transport;

pub use testing::*;
pub use transport::*;

pub mod prelude {
    pub use crate::testing::*;
    pub use crate::transport::*;
    pub use lazyload_ui::prelude::*;
}
