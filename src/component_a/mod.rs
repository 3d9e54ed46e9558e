// Component A: remote (transmitter node)
// Samples the joystick and buttons, encodes a fixed-size telemetry packet
// and sends it every cycle. The packet codec is shared with component B.

pub mod packet;
pub mod sampler;
pub mod transmitter;
