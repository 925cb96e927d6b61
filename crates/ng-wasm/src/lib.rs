//! WASM bridge for NoteGrid: exposes the interaction controller to the
//! JavaScript rendering engine.
//!
//! Compiled via `wasm-pack build --target web`. The engine forwards its
//! callbacks here and re-reads `nodes_json` / `edges_json` whenever a call
//! reports `graphChanged`, and `decorations_json` when it reports
//! `visualChanged`. Ids cross the boundary as plain strings; an id this side
//! has never issued is treated as stale and ignored.

use ng_core::{CanvasConfig, ConnectionAnchor, EdgeId, Handle, NoteId, Point, Size, Vec2};
use ng_editor::{CanvasEvent, InteractionController, Modifiers, NoteIntent, Outcome, PointerTarget};
use ng_render::CanvasTheme;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// The main WASM-facing canvas controller.
#[wasm_bindgen]
pub struct NoteCanvas {
    controller: InteractionController,
    theme: CanvasTheme,
}

#[wasm_bindgen]
impl NoteCanvas {
    /// Create a canvas. `config_json` may be empty or a partial
    /// `CanvasConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<NoteCanvas, String> {
        console_error_panic_hook_setup();

        let config = if config_json.trim().is_empty() {
            CanvasConfig::default()
        } else {
            CanvasConfig::from_json(config_json)?
        };
        Ok(Self {
            controller: InteractionController::new(config),
            theme: CanvasTheme::dark(),
        })
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.theme = if is_dark {
            CanvasTheme::dark()
        } else {
            CanvasTheme::light()
        };
    }

    // ─── Pointer stream ──────────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64) -> String {
        self.send(CanvasEvent::PointerDown {
            point: Point::new(x, y),
        })
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> String {
        self.send(CanvasEvent::PointerMove {
            point: Point::new(x, y),
        })
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> String {
        self.send(CanvasEvent::PointerUp {
            point: Point::new(x, y),
        })
    }

    // ─── Engine callbacks ────────────────────────────────────────────────

    /// `kind` is `"pane"`, `"note"`, `"handle"` or `"edge"`; `handle` is only
    /// read for `"handle"`.
    pub fn double_click(
        &mut self,
        kind: &str,
        id: &str,
        handle: &str,
        x: f64,
        y: f64,
        time_ms: f64,
    ) -> String {
        match parse_target(kind, id, handle) {
            Some(target) => self.send(CanvasEvent::DoubleClick {
                target,
                point: Point::new(x, y),
                time_ms,
            }),
            None => outcome_json(Outcome::NONE),
        }
    }

    pub fn click(&mut self, kind: &str, id: &str, handle: &str) -> String {
        match parse_target(kind, id, handle) {
            Some(target) => self.send(CanvasEvent::Click { target }),
            None => outcome_json(Outcome::NONE),
        }
    }

    pub fn node_drag_start(&mut self, id: &str) -> String {
        match NoteId::lookup(id) {
            Some(id) => self.send(CanvasEvent::NodeDragStart { id }),
            None => stale(id),
        }
    }

    /// `x`, `y` are the node's canvas-space position.
    pub fn node_drag(&mut self, id: &str, x: f64, y: f64) -> String {
        match NoteId::lookup(id) {
            Some(id) => self.send(CanvasEvent::NodeDrag {
                id,
                position: Point::new(x, y),
            }),
            None => stale(id),
        }
    }

    pub fn node_drag_stop(&mut self, id: &str) -> String {
        match NoteId::lookup(id) {
            Some(id) => self.send(CanvasEvent::NodeDragStop { id }),
            None => stale(id),
        }
    }

    pub fn connect_start(&mut self, note: &str, handle: &str) -> String {
        match parse_anchor(note, handle) {
            Some(anchor) => self.send(CanvasEvent::ConnectStart { anchor }),
            None => stale(note),
        }
    }

    pub fn connect_end(&mut self) -> String {
        self.send(CanvasEvent::ConnectEnd)
    }

    pub fn connection_complete(
        &mut self,
        source: &str,
        source_handle: &str,
        target: &str,
        target_handle: &str,
    ) -> String {
        match (
            parse_anchor(source, source_handle),
            parse_anchor(target, target_handle),
        ) {
            (Some(from), Some(to)) => self.send(CanvasEvent::ConnectionComplete { from, to }),
            _ => {
                // Still end the gesture
                self.send(CanvasEvent::ConnectEnd)
            }
        }
    }

    pub fn viewport_change(&mut self, x: f64, y: f64, zoom: f64) -> String {
        self.send(CanvasEvent::ViewportChange {
            pan: Vec2::new(x, y),
            zoom,
        })
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// `focus` is the id of the note whose input has focus, or `""` for the
    /// canvas.
    pub fn key(
        &mut self,
        focus: &str,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let focus = if focus.is_empty() {
            None
        } else {
            match NoteId::lookup(focus) {
                Some(id) => Some(id),
                None => return stale(focus),
            }
        };
        self.send(CanvasEvent::Key {
            focus,
            key: key.to_owned(),
            modifiers: Modifiers {
                ctrl,
                shift,
                alt,
                meta,
            },
        })
    }

    // ─── Note components ─────────────────────────────────────────────────

    pub fn note_content(&mut self, id: &str, text: &str) -> String {
        self.intent(id, NoteIntent::ContentChanged(text.to_owned()))
    }

    pub fn note_commit(&mut self, id: &str) -> String {
        self.intent(id, NoteIntent::CommitEdit)
    }

    pub fn note_cancel(&mut self, id: &str) -> String {
        self.intent(id, NoteIntent::CancelEdit)
    }

    pub fn note_begin_edit(&mut self, id: &str) -> String {
        self.intent(id, NoteIntent::BeginEdit)
    }

    pub fn note_blur(&mut self, id: &str) -> String {
        self.intent(id, NoteIntent::Blur)
    }

    pub fn note_remove(&mut self, id: &str) -> String {
        self.intent(id, NoteIntent::Remove)
    }

    /// Report a note's rendered size so the pointer stream can be hit-tested.
    pub fn set_note_size(&mut self, id: &str, width: f64, height: f64) -> bool {
        NoteId::lookup(id)
            .is_some_and(|id| self.controller.set_note_size(id, Size::new(width, height)))
    }

    /// Canvas-space centre of a handle as `{"x":..,"y":..}`, or `null` while
    /// the note is unknown or unmeasured.
    pub fn handle_position_json(&self, note: &str, handle: &str) -> String {
        let position = parse_anchor(note, handle).and_then(|a| self.controller.handle_position(a));
        serde_json::to_string(&position).unwrap_or_else(|_| "null".to_string())
    }

    /// Advance the clock. Returns `true` if decorations changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.controller.tick(now_ms)
    }

    // ─── Output ──────────────────────────────────────────────────────────

    pub fn note_count(&self) -> u32 {
        u32::try_from(self.controller.store().note_count()).unwrap_or(u32::MAX)
    }

    /// Node array for the rendering engine.
    pub fn nodes_json(&self) -> String {
        let nodes: Vec<NodeView<'_>> = self
            .controller
            .store()
            .notes()
            .map(|n| NodeView {
                id: n.id.as_str(),
                kind: NOTE_TYPE,
                position: n.position,
                draggable: !n.editing,
                connectable: !n.editing,
                data: NodeData {
                    content: &n.content,
                    editing: n.editing,
                    dragging: n.dragging,
                },
            })
            .collect();
        serde_json::to_string(&nodes).unwrap_or_else(|_| "[]".to_string())
    }

    /// Edge array for the rendering engine.
    pub fn edges_json(&self) -> String {
        let edges: Vec<EdgeView<'_>> = self
            .controller
            .store()
            .connections()
            .map(|c| EdgeView {
                id: c.id.as_str(),
                kind: EDGE_TYPE,
                source: c.source.as_str(),
                source_handle: c.source_handle,
                target: c.target.as_str(),
                target_handle: c.target_handle,
                selected: c.selected,
            })
            .collect();
        serde_json::to_string(&edges).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn decorations_json(&self, time_ms: f64) -> String {
        let decorations = self.controller.decorations(&self.theme, time_ms);
        serde_json::to_string(&decorations).unwrap_or_else(|_| "{}".to_string())
    }

    /// Renderer names the engine should register.
    pub fn render_types_json() -> String {
        serde_json::json!({
            "nodeTypes": [NOTE_TYPE],
            "edgeTypes": [EDGE_TYPE],
            "connectionLine": CONNECTION_LINE,
        })
        .to_string()
    }
}

impl NoteCanvas {
    fn send(&mut self, event: CanvasEvent) -> String {
        outcome_json(self.controller.dispatch(&event))
    }

    fn intent(&mut self, id: &str, intent: NoteIntent) -> String {
        match NoteId::lookup(id) {
            Some(id) => self.send(CanvasEvent::note(id, intent)),
            None => stale(id),
        }
    }
}

const NOTE_TYPE: &str = "note";
const EDGE_TYPE: &str = "terminal";
const CONNECTION_LINE: &str = "terminal";

// ─── JSON views ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct NodeData<'a> {
    content: &'a str,
    editing: bool,
    dragging: bool,
}

#[derive(Serialize)]
struct NodeView<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    position: Point,
    draggable: bool,
    connectable: bool,
    data: NodeData<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EdgeView<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    source: &'a str,
    source_handle: Handle,
    target: &'a str,
    target_handle: Handle,
    selected: bool,
}

fn outcome_json(outcome: Outcome) -> String {
    format!(
        r#"{{"graphChanged":{},"visualChanged":{}}}"#,
        outcome.graph_changed, outcome.visual_changed
    )
}

fn stale(id: &str) -> String {
    log::trace!("unknown id {id:?} from host ignored");
    outcome_json(Outcome::NONE)
}

fn parse_anchor(note: &str, handle: &str) -> Option<ConnectionAnchor> {
    Some(ConnectionAnchor::new(
        NoteId::lookup(note)?,
        Handle::parse(handle)?,
    ))
}

fn parse_target(kind: &str, id: &str, handle: &str) -> Option<PointerTarget> {
    match kind {
        "pane" => Some(PointerTarget::Pane),
        "note" => NoteId::lookup(id).map(PointerTarget::Note),
        "handle" => parse_anchor(id, handle).map(PointerTarget::Handle),
        "edge" => EdgeId::lookup(id).map(PointerTarget::Edge),
        _ => {
            log::warn!("unknown target kind {kind:?}");
            None
        }
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("NoteGrid WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    fn spawn(canvas: &mut NoteCanvas, x: f64, y: f64, text: &str) -> String {
        canvas.double_click("pane", "", "", x, y, 0.0);
        let nodes = parse(&canvas.nodes_json());
        let id = nodes.as_array().unwrap().last().unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();
        canvas.note_content(&id, text);
        canvas.note_commit(&id);
        id
    }

    #[test]
    fn rejects_bad_config() {
        assert!(NoteCanvas::new("{\"grid\":{\"cell_size\":0}}").is_err());
        assert!(NoteCanvas::new("not json").is_err());
        assert!(NoteCanvas::new("").is_ok());
    }

    #[test]
    fn double_click_reports_snapped_node() {
        let mut canvas = NoteCanvas::new("").unwrap();
        let out = parse(&canvas.double_click("pane", "", "", 100.0, 100.0, 0.0));
        assert_eq!(out["graphChanged"], Value::Bool(true));

        let nodes = parse(&canvas.nodes_json());
        let node = &nodes[0];
        assert_eq!(node["type"], "note");
        assert_eq!(node["position"]["x"], 97.0);
        assert_eq!(node["position"]["y"], 97.0);
        assert_eq!(node["data"]["editing"], true);
        assert_eq!(node["draggable"], false);
        assert_eq!(canvas.note_count(), 1);
    }

    #[test]
    fn connection_round_trip_through_strings() {
        let mut canvas = NoteCanvas::new("").unwrap();
        let a = spawn(&mut canvas, 100.0, 100.0, "a");
        let b = spawn(&mut canvas, 500.0, 100.0, "b");

        canvas.connect_start(&a, "right");
        let out = parse(&canvas.connection_complete(&a, "right", &b, "left"));
        assert_eq!(out["graphChanged"], true);
        canvas.connect_end();

        let edges = parse(&canvas.edges_json());
        let edge = &edges[0];
        assert_eq!(edge["type"], "terminal");
        assert_eq!(edge["source"], a.as_str());
        assert_eq!(edge["sourceHandle"], "right");
        assert_eq!(edge["target"], b.as_str());
        assert_eq!(edge["targetHandle"], "left");

        assert_eq!(canvas.handle_position_json(&a, "right"), "null");
        assert!(canvas.set_note_size(&a, 200.0, 80.0));
        let pos = parse(&canvas.handle_position_json(&a, "right"));
        assert_eq!(pos["x"], 321.0);
        assert_eq!(pos["y"], 137.0);

        let edge_id = edge["id"].as_str().unwrap().to_string();
        canvas.click("edge", &edge_id, "");
        assert_eq!(parse(&canvas.edges_json())[0]["selected"], true);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut canvas = NoteCanvas::new("").unwrap();
        let none = r#"{"graphChanged":false,"visualChanged":false}"#;
        assert_eq!(canvas.node_drag_start("never_issued_id"), none);
        assert_eq!(canvas.note_remove("never_issued_id"), none);
        assert_eq!(canvas.click("edge", "never_issued_id", ""), none);
        assert_eq!(canvas.connect_start("never_issued_id", "right"), none);
    }

    #[test]
    fn decorations_serialize_camel_case() {
        let mut canvas = NoteCanvas::new("").unwrap();
        canvas.double_click("pane", "", "", 100.0, 100.0, 0.0);
        let deco = parse(&canvas.decorations_json(10.0));
        assert_eq!(deco["notes"][0]["cursor"], "text");
        assert!(deco["notes"][0]["shadowOffset"].is_number());
        assert!(!deco["ripple"].as_array().unwrap().is_empty());
        assert_eq!(deco["connectionLine"], Value::Null);
        assert!(deco["gridDot"].is_string());
        assert!(deco["notes"][0]["handles"][0]["border"].is_string());

        canvas.set_theme(false);
        let light = parse(&canvas.decorations_json(10.0));
        assert_ne!(light["ripple"][0]["color"], deco["ripple"][0]["color"]);
        assert_ne!(light["gridDot"], deco["gridDot"]);
    }

    #[test]
    fn render_types_name_renderers() {
        let types = parse(&NoteCanvas::render_types_json());
        assert_eq!(types["nodeTypes"][0], "note");
        assert_eq!(types["edgeTypes"][0], "terminal");
        assert_eq!(types["connectionLine"], "terminal");
    }
}
