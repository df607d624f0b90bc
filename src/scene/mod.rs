pub mod schedule;
pub mod state;

pub use schedule::{FrameClock, FrameGate, StopHandle, StopSignal, stop_channel};
pub use state::{MeshSink, RendererState};
