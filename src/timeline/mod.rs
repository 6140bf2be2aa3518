pub(crate) mod playback;
pub(crate) mod scheduler;
pub(crate) mod spec;
