pub(crate) mod blend_mode;
pub(crate) mod color;
pub(crate) mod layer;
pub(crate) mod model;
