use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;

fn set_kv(obj: &Object, k: &str, v: &JsValue) { let _ = Reflect::set(obj, &JsValue::from_str(k), v); }

fn new_obj() -> Object { Object::new() }

pub fn ok(v: JsValue) -> JsValue {
    let o = new_obj();
    set_kv(&o, "ok", &JsValue::from_bool(true));
    set_kv(&o, "value", &v);
    o.into()
}

pub fn err(code: &'static str, message: impl Into<String>, data: Option<JsValue>) -> JsValue {
    let root = new_obj();
    set_kv(&root, "ok", &JsValue::from_bool(false));
    let e = new_obj();
    set_kv(&e, "code", &JsValue::from_str(code));
    set_kv(&e, "message", &JsValue::from_str(&message.into()));
    if let Some(d) = data { set_kv(&e, "data", &d); }
    set_kv(&root, "error", &e.into());
    root.into()
}

#[inline]
pub fn invalid_id(kind: &str, id: u32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "kind", &JsValue::from_str(kind));
    set_kv(&d, "id", &JsValue::from_f64(id as f64));
    err("invalid_id", format!("invalid {} id", kind), Some(d.into()))
}

#[inline]
pub fn busy() -> JsValue {
    err("busy", "a transition is already in flight", None)
}

#[inline]
pub fn not_adjacent(from: u32, to: u32) -> JsValue {
    let d = new_obj();
    set_kv(&d, "from", &JsValue::from_f64(from as f64));
    set_kv(&d, "to", &JsValue::from_f64(to as f64));
    err("not_adjacent", "no declared edge to target node", Some(d.into()))
}

#[inline]
pub fn invalid_resolution(got: u8) -> JsValue {
    let d = new_obj();
    set_kv(&d, "got", &JsValue::from_f64(got as f64));
    err("invalid_resolution", "resolution must be 0:Low, 1:High", Some(d.into()))
}

#[inline]
pub fn invalid_doc(which: &'static str, message: impl Into<String>) -> JsValue {
    let d = new_obj();
    set_kv(&d, "doc", &JsValue::from_str(which));
    err("invalid_doc", message, Some(d.into()))
}

#[inline]
pub fn invalid_config(message: impl Into<String>) -> JsValue {
    err("invalid_config", message, None)
}
