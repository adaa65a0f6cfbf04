//! Session state, events and the controller that ties the pipeline together

pub mod controller;
pub mod events;
pub mod state;

pub use controller::Controller;
pub use events::{Event, RenderCommand};
pub use state::{NavState, Session};
