use crate::error;
use crate::interop::{arr_u32, arr_u8, new_obj, points_f64, segments_f64, set_kv, to_js};
use crate::World;
use citygen::{Marking, MarkingKind, Point, ProgressSink, Status, WorldConfig};
use js_sys::Function;
use wasm_bindgen::prelude::*;
type JsValue = wasm_bindgen::JsValue;

#[wasm_bindgen]
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Forwards batch status to an optional JS callback `(status) => void`.
struct JsProgress<'a> {
    callback: Option<&'a Function>,
}

impl ProgressSink for JsProgress<'_> {
    fn report(&mut self, status: Status) {
        let Some(cb) = self.callback else { return };
        if let Err(e) = cb.call1(&JsValue::NULL, &to_js(&status)) {
            web_sys::console::warn_1(&e);
        }
    }
}

fn finite(params: &[(&str, f64)]) -> Option<JsValue> {
    params
        .iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| error::non_finite(name))
}

#[wasm_bindgen]
impl World {
    #[wasm_bindgen(constructor)]
    pub fn new() -> World {
        crate::World::rs_new()
    }

    /// `{ok, value: World}` built from a partial config object.
    pub fn with_config_res(config: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<WorldConfig>(config) {
            Ok(cfg) => error::from_result(crate::World::rs_with_config(cfg), JsValue::from),
            Err(e) => error::err("invalid_config", e.to_string(), None),
        }
    }

    pub fn get_config(&self) -> JsValue {
        to_js(self.inner.config())
    }
    pub fn set_config_res(&mut self, config: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<WorldConfig>(config) {
            Ok(cfg) => error::from_result(self.inner.set_config(cfg), |_| JsValue::TRUE),
            Err(e) => error::err("invalid_config", e.to_string(), None),
        }
    }

    // Graph editing
    pub fn add_point(&mut self, x: f64, y: f64) -> u32 {
        self.inner.graph.add_point(Point::new(x, y))
    }
    pub fn add_point_res(&mut self, x: f64, y: f64) -> JsValue {
        if let Some(e) = finite(&[("x", x), ("y", y)]) {
            return e;
        }
        error::ok(JsValue::from_f64(self.inner.graph.add_point(Point::new(x, y)) as f64))
    }
    pub fn get_point(&self, id: u32) -> JsValue {
        match self.inner.graph.get_point(id) {
            Some(p) => to_js(&[p.x, p.y]),
            None => JsValue::NULL,
        }
    }
    pub fn move_point(&mut self, id: u32, x: f64, y: f64) -> bool {
        self.inner.graph.move_point(id, Point::new(x, y)).unwrap_or(false)
    }
    pub fn move_point_res(&mut self, id: u32, x: f64, y: f64) -> JsValue {
        if let Some(e) = finite(&[("x", x), ("y", y)]) {
            return e;
        }
        error::from_result(self.inner.graph.move_point(id, Point::new(x, y)), JsValue::from_bool)
    }
    pub fn remove_point(&mut self, id: u32) -> bool {
        self.inner.graph.remove_point(id).is_ok()
    }
    pub fn remove_point_res(&mut self, id: u32) -> JsValue {
        error::from_result(self.inner.graph.remove_point(id), |_| JsValue::TRUE)
    }
    pub fn point_count(&self) -> u32 {
        self.inner.graph.point_count() as u32
    }
    pub fn add_segment(&mut self, a: u32, b: u32, oneway: bool) -> Option<u32> {
        self.inner.graph.add_segment(a, b, oneway).ok().flatten()
    }
    pub fn add_segment_res(&mut self, a: u32, b: u32, oneway: bool) -> JsValue {
        match self.inner.graph.add_segment(a, b, oneway) {
            Ok(Some(id)) => error::ok(JsValue::from_f64(id as f64)),
            Ok(None) => error::err(
                "invalid_segment",
                "segment is a self-loop, a duplicate, or exceeds the graph capacity",
                None,
            ),
            Err(e) => error::from_error(&e),
        }
    }
    pub fn remove_segment(&mut self, id: u32) -> bool {
        self.inner.graph.remove_segment(id).is_some()
    }
    pub fn break_segment_res(&mut self, id: u32, x: f64, y: f64) -> JsValue {
        if let Some(e) = finite(&[("x", x), ("y", y)]) {
            return e;
        }
        let r = self.inner.graph.break_segment(id, Point::new(x, y));
        error::from_result(r, |pid| JsValue::from_f64(pid as f64))
    }
    pub fn segment_count(&self) -> u32 {
        self.inner.graph.segment_count() as u32
    }
    pub fn nearest_point(&self, x: f64, y: f64, threshold: f64) -> Option<u32> {
        self.inner.graph.nearest_point(Point::new(x, y), threshold)
    }
    pub fn nearest_segment(&self, x: f64, y: f64, threshold: f64) -> Option<u32> {
        self.inner.graph.nearest_segment(Point::new(x, y), threshold)
    }

    // Typed arrays getters
    pub fn get_point_data(&self) -> JsValue {
        let (ids, pos): (Vec<u32>, Vec<Point>) = self.inner.graph.points().unzip();
        let obj = new_obj();
        set_kv(&obj, "ids", &arr_u32(&ids).into());
        set_kv(&obj, "positions", &points_f64(&pos).into());
        obj.into()
    }
    pub fn get_segment_data(&self) -> JsValue {
        let mut ids = Vec::new();
        let mut endpoints = Vec::new();
        let mut oneway = Vec::new();
        for (id, e) in self.inner.graph.edges() {
            ids.push(id);
            endpoints.extend([e.a, e.b]);
            oneway.push(e.oneway as u8);
        }
        let obj = new_obj();
        set_kv(&obj, "ids", &arr_u32(&ids).into());
        set_kv(&obj, "endpoints", &arr_u32(&endpoints).into());
        set_kv(&obj, "oneway", &arr_u8(&oneway).into());
        obj.into()
    }
    pub fn get_road_borders(&self) -> JsValue {
        segments_f64(&self.inner.road_borders).into()
    }
    pub fn get_roads(&self) -> JsValue {
        to_js(&self.inner.roads)
    }
    pub fn get_buildings(&self) -> JsValue {
        to_js(&self.inner.buildings)
    }
    pub fn get_trees(&self) -> JsValue {
        to_js(&self.inner.trees)
    }
    pub fn get_markings(&self) -> JsValue {
        to_js(&self.inner.markings)
    }

    // Generation
    pub fn generate_roads_res(&mut self, progress: Option<Function>) -> JsValue {
        let mut sink = JsProgress { callback: progress.as_ref() };
        let r = self.inner.generate_roads(&mut sink);
        error::from_result(r, |_| JsValue::from_f64(self.inner.road_borders.len() as f64))
    }
    pub fn lane_guides_res(&self, progress: Option<Function>) -> JsValue {
        let mut sink = JsProgress { callback: progress.as_ref() };
        error::from_result(self.inner.lane_guides(&mut sink), |g| segments_f64(&g).into())
    }
    pub fn generate_buildings_res(&mut self, progress: Option<Function>) -> JsValue {
        let mut sink = JsProgress { callback: progress.as_ref() };
        let r = self.inner.generate_buildings(&mut sink);
        error::from_result(r, |_| JsValue::from_f64(self.inner.buildings.len() as f64))
    }
    pub fn generate_trees_res(&mut self, progress: Option<Function>) -> JsValue {
        let mut sink = JsProgress { callback: progress.as_ref() };
        let r = self.inner.generate_trees(&mut sink);
        error::from_result(r, |_| JsValue::from_f64(self.inner.trees.len() as f64))
    }
    /// `{ok, value: {path, borders}}` as flat `Float64Array`s.
    pub fn corridor_res(&mut self, sx: f64, sy: f64, ex: f64, ey: f64) -> JsValue {
        if let Some(e) = finite(&[("sx", sx), ("sy", sy), ("ex", ex), ("ey", ey)]) {
            return e;
        }
        let mut sink = JsProgress { callback: None };
        let r = self
            .inner
            .generate_corridor(Point::new(sx, sy), Point::new(ex, ey), &mut sink);
        error::from_result(r, |c| {
            let obj = new_obj();
            set_kv(&obj, "path", &points_f64(&c.path).into());
            set_kv(&obj, "borders", &segments_f64(&c.borders).into());
            obj.into()
        })
    }
    pub fn clear_corridor(&mut self) {
        self.inner.clear_corridor();
    }

    // Markings
    pub fn add_marking_res(
        &mut self,
        kind: &str,
        cx: f64,
        cy: f64,
        dx: f64,
        dy: f64,
        width: f64,
        height: f64,
    ) -> JsValue {
        let params = [("cx", cx), ("cy", cy), ("dx", dx), ("dy", dy), ("width", width), ("height", height)];
        if let Some(e) = finite(&params) {
            return e;
        }
        let Ok(kind) = serde_json::from_value::<MarkingKind>(serde_json::Value::from(kind)) else {
            return error::invalid_kind("marking", kind);
        };
        match Marking::new(kind, Point::new(cx, cy), Point::new(dx, dy), width, height) {
            Ok(m) => error::ok(JsValue::from_f64(self.inner.add_marking(m) as f64)),
            Err(e) => error::from_error(&e.into()),
        }
    }
    pub fn remove_marking(&mut self, index: u32) -> bool {
        self.inner.remove_marking(index as usize).is_some()
    }
    /// Advances traffic lights by `dt` milliseconds.
    pub fn update(&mut self, dt: f64) {
        if dt.is_finite() && dt >= 0.0 {
            self.inner.update(dt);
        }
    }
    pub fn update_res(&mut self, dt: f64) -> JsValue {
        if !dt.is_finite() {
            return error::non_finite("dt");
        }
        if dt < 0.0 {
            return error::out_of_range("dt", 0.0, f64::INFINITY, dt);
        }
        self.inner.update(dt);
        error::ok(JsValue::TRUE)
    }

    // Document
    pub fn to_json(&self) -> JsValue {
        to_js(&self.inner.to_json_value())
    }
    pub fn to_json_string(&self) -> String {
        self.inner.to_json()
    }
    pub fn from_json_res(&mut self, v: JsValue) -> JsValue {
        match serde_wasm_bindgen::from_value::<serde_json::Value>(v) {
            Ok(val) => self.replace_from(citygen::World::from_json_value(val)),
            Err(e) => error::err("malformed_document", format!("{}", e), None),
        }
    }
    pub fn from_json_string_res(&mut self, s: &str) -> JsValue {
        self.replace_from(citygen::World::from_json(s))
    }
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl World {
    // State is only swapped in once the whole document loaded.
    fn replace_from(&mut self, loaded: citygen::Result<citygen::World>) -> JsValue {
        match loaded {
            Ok(w) => {
                self.inner = w;
                error::ok(JsValue::TRUE)
            }
            Err(e) => error::from_error(&e),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

