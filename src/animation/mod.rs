pub(crate) mod curve;
pub(crate) mod keyframes;
pub(crate) mod motion_path;
