//! Infrastructure layer: adapters to the outside world.
//!
//! - **`host_window`** – The contract with the host windowing toolkit
//!   (`HostWindow`, `EventObserver`) and a recording mock window.
//! - **`storage`** – TOML configuration loading and saving.
//!
//! **Dependency rule**: the application layer uses the traits defined here;
//! nothing in here depends on the application layer.

pub mod host_window;
pub mod storage;
