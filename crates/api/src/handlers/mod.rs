pub mod event_stream;
pub mod host_events;
