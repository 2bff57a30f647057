pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod record;
pub(crate) mod renderer;
pub(crate) mod surface;
