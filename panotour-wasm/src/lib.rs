use wasm_bindgen::prelude::*;
mod api;
mod error;
mod interop;

#[wasm_bindgen]
pub struct Tour {
    pub(crate) inner: panotour::Tour,
}

impl Tour {
    pub fn rs_new(inner: panotour::Tour) -> Tour {
        Tour { inner }
    }
}
