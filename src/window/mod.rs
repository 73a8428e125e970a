//! Windowed counting: a shared accumulator, a periodic flusher and the
//! report types they produce.

mod aggregator;
mod clock;
pub mod dst;
mod flusher;
mod render;
mod report;

pub use aggregator::{FlushOutcome, WindowAggregator};
pub use clock::{ProductionClock, SimulatedClock, WindowClock, WindowTimestamp};
pub use dst::{
    run_window_batch, summarize_window_batch, WindowDSTConfig, WindowDSTHarness, WindowDSTResult,
};
pub use flusher::{spawn_window_flusher, FlusherHandle};
pub use render::render_table;
pub use report::{ValueCount, WindowReport};
