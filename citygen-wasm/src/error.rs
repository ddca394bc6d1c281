use citygen::Error;
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
pub fn non_finite(param: &str) -> JsValue {
    let d = new_obj(); set_kv(&d, "param", &JsValue::from_str(param));
    err("non_finite", format!("parameter '{}' must be finite", param), Some(d.into()))
}

#[inline]
pub fn out_of_range(param: &str, min: f64, max: f64, got: f64) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "min", &JsValue::from_f64(min));
    set_kv(&d, "max", &JsValue::from_f64(max));
    set_kv(&d, "got", &JsValue::from_f64(got));
    err("out_of_range", format!("parameter '{}' out of range", param), Some(d.into()))
}

#[inline]
pub fn invalid_kind(param: &str, got: &str) -> JsValue {
    let d = new_obj();
    set_kv(&d, "param", &JsValue::from_str(param));
    set_kv(&d, "got", &JsValue::from_str(got));
    err("invalid_kind", format!("unknown {} '{}'", param, got), Some(d.into()))
}

fn point_arr(p: citygen::Point) -> JsValue {
    let a = js_sys::Array::new();
    a.push(&JsValue::from_f64(p.x));
    a.push(&JsValue::from_f64(p.y));
    a.into()
}

/// Stable code plus structured data for a library error.
pub fn from_error(e: &Error) -> JsValue {
    let d = new_obj();
    let code = match e {
        Error::DegenerateGeometry(_) => "degenerate_geometry",
        Error::NoPathFound { from, to } => {
            set_kv(&d, "from", &point_arr(*from));
            set_kv(&d, "to", &point_arr(*to));
            "no_path_found"
        }
        Error::UnknownPoint(id) => {
            set_kv(&d, "id", &JsValue::from_f64(*id as f64));
            "unknown_point"
        }
        Error::UnknownSegment(id) => {
            set_kv(&d, "id", &JsValue::from_f64(*id as f64));
            "unknown_segment"
        }
        Error::WorkerFailure { phase, partition, .. } => {
            set_kv(&d, "phase", &JsValue::from_str(phase));
            set_kv(&d, "partition", &JsValue::from_f64(*partition as f64));
            "worker_failure"
        }
        Error::MalformedDocument { context, .. } => {
            set_kv(&d, "context", &JsValue::from_str(context));
            "malformed_document"
        }
        Error::InvalidConfig { param, .. } => {
            set_kv(&d, "param", &JsValue::from_str(param));
            "invalid_config"
        }
        Error::Busy(kind) => {
            set_kv(&d, "task", &JsValue::from_str(&kind.to_string()));
            "busy"
        }
    };
    err(code, e.to_string(), Some(d.into()))
}

#[inline]
pub fn from_result<T>(r: citygen::Result<T>, f: impl FnOnce(T) -> JsValue) -> JsValue {
    match r {
        Ok(v) => ok(f(v)),
        Err(e) => from_error(&e),
    }
}
