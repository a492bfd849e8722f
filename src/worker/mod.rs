mod poll_worker;

pub use poll_worker::PollWorker;
