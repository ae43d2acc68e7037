pub mod auto_open;
pub mod client;
pub mod controller;
pub mod protocol;
pub mod transport;

pub use auto_open::AutoOpenTracker;
pub use client::RemoteControlClient;
pub use controller::{ControllerState, EditorController};
pub use protocol::{position_uri, RemoteCommand};
pub use transport::{CommandSocket, SocketConnector, TungsteniteConnector, NORMAL_CLOSURE};
