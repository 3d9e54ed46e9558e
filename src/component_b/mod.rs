// Component B: driver (receiver node)
// Validates each datagram, decodes it into an intent, maps the intent to
// actuator commands and pushes them to the drivers.
pub mod receiver;
pub mod decoder;
pub mod actuation;
pub mod drivers;
pub mod audio;
