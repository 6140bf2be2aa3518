pub(crate) mod simulator;
pub(crate) mod surface;
