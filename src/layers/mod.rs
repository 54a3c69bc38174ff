pub(crate) mod blend;
pub(crate) mod frame;
pub(crate) mod group;
pub(crate) mod track;
