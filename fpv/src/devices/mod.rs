pub mod bench;
pub mod tello_device;
