// Communication module - Transport boundary and wire codec
pub mod message;
pub mod transport;

pub use message::{Envelope, Frame};
pub use transport::{Transport, TransportEvent, TransportLink};
