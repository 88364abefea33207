// Batching writer for metric points
pub mod metric_writer;

// Poll-and-forward loop
pub mod poller;

// System orchestrator
pub mod system;
