pub mod transport_network;
pub mod travel_mode;

mod error;
pub use error::NetworkError;
pub use transport_network::{NetworkParameters, StopLink, TransportNetwork};
pub use travel_mode::TravelMode;
