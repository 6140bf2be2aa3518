pub(crate) mod applier;
pub(crate) mod recording;
