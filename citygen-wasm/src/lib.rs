use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct World { pub(crate) inner: citygen::World }

impl World {
    pub fn rs_new() -> World { World { inner: citygen::World::default() } }
    pub fn rs_with_config(cfg: citygen::WorldConfig) -> citygen::Result<World> {
        Ok(World { inner: citygen::World::new(cfg)? })
    }
}
