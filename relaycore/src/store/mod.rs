pub mod account;
pub mod device;

pub use account::Account;
pub use device::{Device, DeviceCapabilities};
