pub(crate) mod finalize;
pub(crate) mod png;
pub(crate) mod sink;
