//! The graph store: the single source of truth for notes and connections.
//!
//! Backed by a `StableDiGraph` so removing a note drops every incident edge
//! in one step and indices of surviving elements never shift. Separate order
//! vectors keep insertion order for rendering (later notes stack on top).
//!
//! Every operation on an id that is no longer present is a silent no-op:
//! input events can race with removals and must not fail.

use crate::id::{EdgeId, NoteId};
use crate::model::{Connection, ConnectionAnchor, Handle, Note, NotePatch};
use kurbo::Point;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

// ─── Mutations ───────────────────────────────────────────────────────────

/// A single change to the graph. The interaction controller translates
/// events into these and applies them in order.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    AddNote {
        id: NoteId,
        position: Point,
        content: String,
    },
    RemoveNote {
        id: NoteId,
    },
    UpdateNote {
        id: NoteId,
        patch: NotePatch,
    },
    AddEdge {
        id: EdgeId,
        from: ConnectionAnchor,
        to: ConnectionAnchor,
    },
    RemoveEdge {
        id: EdgeId,
    },
    ToggleEdgeSelection {
        id: EdgeId,
    },
    ClearSelection,
}

// ─── Store ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: StableDiGraph<Note, Connection>,
    note_index: HashMap<NoteId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    /// Insertion order, bottom-most first.
    note_order: Vec<NoteId>,
    edge_order: Vec<EdgeId>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Notes ───────────────────────────────────────────────────────────

    /// Insert a new note in edit mode and return its fresh id.
    pub fn add_node(&mut self, position: Point, content: &str) -> NoteId {
        let id = NoteId::fresh();
        self.insert_note(Note::new(id, position, content));
        id
    }

    /// Insert a fully-formed note. An existing note with the same id is left
    /// in place and `false` is returned.
    pub fn insert_note(&mut self, note: Note) -> bool {
        if self.note_index.contains_key(&note.id) {
            log::debug!("note {} already present, insert skipped", note.id);
            return false;
        }
        let id = note.id;
        let idx = self.graph.add_node(note);
        self.note_index.insert(id, idx);
        self.note_order.push(id);
        true
    }

    /// Remove a note and every connection touching it. Idempotent.
    pub fn remove_node(&mut self, id: NoteId) -> Option<Note> {
        let Some(idx) = self.note_index.remove(&id) else {
            log::trace!("remove of stale note {id}");
            return None;
        };

        let incident: Vec<EdgeId> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        for edge_id in &incident {
            self.edge_index.remove(edge_id);
        }
        if !incident.is_empty() {
            self.edge_order.retain(|e| !incident.contains(e));
            log::debug!("note {id} removed with {} connection(s)", incident.len());
        }

        self.note_order.retain(|n| *n != id);
        // StableGraph drops incident edges together with the node.
        self.graph.remove_node(idx)
    }

    /// Merge `patch` into note `id`. Returns `true` if anything changed.
    pub fn update_node(&mut self, id: NoteId, patch: &NotePatch) -> bool {
        match self.note_mut(id) {
            Some(note) => patch.apply_to(note),
            None => {
                log::trace!("update of stale note {id}");
                false
            }
        }
    }

    pub fn note(&self, id: NoteId) -> Option<&Note> {
        self.note_index.get(&id).map(|idx| &self.graph[*idx])
    }

    fn note_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.note_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn contains_note(&self, id: NoteId) -> bool {
        self.note_index.contains_key(&id)
    }

    /// Notes in insertion order (bottom-most first).
    pub fn notes(&self) -> impl Iterator<Item = &Note> + '_ {
        self.note_order.iter().filter_map(|id| self.note(*id))
    }

    /// Ids of notes currently in edit mode, in insertion order.
    pub fn editing_notes(&self) -> Vec<NoteId> {
        self.notes().filter(|n| n.editing).map(|n| n.id).collect()
    }

    pub fn note_count(&self) -> usize {
        self.note_index.len()
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Connect two notes. Rejected (`None`) when the endpoints are the same
    /// note, when either note is missing, or when either note is editing.
    /// Parallel duplicates are accepted here; see `resolve_connection`.
    pub fn add_edge(
        &mut self,
        source: NoteId,
        source_handle: Handle,
        target: NoteId,
        target_handle: Handle,
    ) -> Option<EdgeId> {
        if !self.can_connect(source, target) {
            return None;
        }
        let id = EdgeId::fresh();
        let from = ConnectionAnchor::new(source, source_handle);
        let to = ConnectionAnchor::new(target, target_handle);
        self.insert_edge(id, from, to).then_some(id)
    }

    /// Distinct, present and committed endpoints. Logs the reason otherwise.
    fn can_connect(&self, source: NoteId, target: NoteId) -> bool {
        if source == target {
            log::debug!("rejected self-connection on {source}");
            return false;
        }
        let (Some(src), Some(dst)) = (self.note(source), self.note(target)) else {
            log::trace!("connection {source} → {target} references a stale note");
            return false;
        };
        if src.editing || dst.editing {
            log::debug!("rejected connection {source} → {target}: endpoint is editing");
            return false;
        }
        true
    }

    fn insert_edge(&mut self, id: EdgeId, from: ConnectionAnchor, to: ConnectionAnchor) -> bool {
        if self.edge_index.contains_key(&id) || !self.can_connect(from.note, to.note) {
            return false;
        }

        let src_idx = self.note_index[&from.note];
        let dst_idx = self.note_index[&to.note];
        let edge_idx = self
            .graph
            .add_edge(src_idx, dst_idx, Connection::new(id, from, to));
        self.edge_index.insert(id, edge_idx);
        self.edge_order.push(id);
        true
    }

    /// Remove a connection. Idempotent.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Connection> {
        let Some(idx) = self.edge_index.remove(&id) else {
            log::trace!("remove of stale connection {id}");
            return None;
        };
        self.edge_order.retain(|e| *e != id);
        self.graph.remove_edge(idx)
    }

    /// Flip one connection's selection flag. Other connections are untouched.
    pub fn toggle_edge_selection(&mut self, id: EdgeId) -> bool {
        match self.edge_index.get(&id).copied() {
            Some(idx) => {
                let edge = &mut self.graph[idx];
                edge.selected = !edge.selected;
                true
            }
            None => {
                log::trace!("selection toggle on stale connection {id}");
                false
            }
        }
    }

    /// Deselect every connection. Returns `true` if any was selected.
    pub fn clear_selection(&mut self) -> bool {
        let mut changed = false;
        for edge in self.graph.edge_weights_mut() {
            if edge.selected {
                edge.selected = false;
                changed = true;
            }
        }
        changed
    }

    pub fn connection(&self, id: EdgeId) -> Option<&Connection> {
        self.edge_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.edge_order.iter().filter_map(|id| self.connection(*id))
    }

    /// Connections touching `note`, in either direction.
    pub fn connections_of(&self, note: NoteId) -> Vec<&Connection> {
        match self.note_index.get(&note) {
            Some(&idx) => self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .chain(self.graph.edges_directed(idx, Direction::Incoming))
                .map(|e| e.weight())
                .collect(),
            None => Vec::new(),
        }
    }

    /// No connection touches `note`.
    pub fn is_isolated(&self, note: NoteId) -> bool {
        match self.note_index.get(&note) {
            Some(&idx) => self.graph.neighbors_undirected(idx).next().is_none(),
            None => true,
        }
    }

    pub fn selected_edges(&self) -> Vec<EdgeId> {
        self.connections()
            .filter(|c| c.selected)
            .map(|c| c.id)
            .collect()
    }

    /// A connection with exactly these endpoints and handles exists.
    pub fn has_connection(&self, from: ConnectionAnchor, to: ConnectionAnchor) -> bool {
        let (Some(&src), Some(&dst)) = (self.note_index.get(&from.note), self.note_index.get(&to.note))
        else {
            return false;
        };
        self.graph
            .edges_connecting(src, dst)
            .any(|e| e.weight().joins(from, to))
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// Decide whether a gesture from `start` to `end` may become a
    /// connection, and orient it source → target.
    ///
    /// The pair must join two distinct, non-editing notes and pair one source
    /// handle (`right`/`bottom`) with one target handle (`top`/`left`). A
    /// gesture started on a target handle is reversed. With `dedupe` set, an
    /// exact repeat of an existing connection is refused.
    pub fn resolve_connection(
        &self,
        start: ConnectionAnchor,
        end: ConnectionAnchor,
        dedupe: bool,
    ) -> Option<(ConnectionAnchor, ConnectionAnchor)> {
        if start.note == end.note {
            return None;
        }
        let (from, to) = match (start.handle.is_source(), end.handle.is_target()) {
            (true, true) => (start, end),
            (false, false) => (end, start),
            _ => return None,
        };
        let src = self.note(from.note)?;
        let dst = self.note(to.note)?;
        if src.editing || dst.editing {
            return None;
        }
        if dedupe && self.has_connection(from, to) {
            return None;
        }
        Some((from, to))
    }

    // ─── Mutation dispatch ───────────────────────────────────────────────

    /// Apply one mutation. Returns `true` if the graph changed.
    pub fn apply_mutation(&mut self, mutation: GraphMutation) -> bool {
        match mutation {
            GraphMutation::AddNote {
                id,
                position,
                content,
            } => self.insert_note(Note::new(id, position, content)),
            GraphMutation::RemoveNote { id } => self.remove_node(id).is_some(),
            GraphMutation::UpdateNote { id, patch } => self.update_node(id, &patch),
            GraphMutation::AddEdge { id, from, to } => self.insert_edge(id, from, to),
            GraphMutation::RemoveEdge { id } => self.remove_edge(id).is_some(),
            GraphMutation::ToggleEdgeSelection { id } => self.toggle_edge_selection(id),
            GraphMutation::ClearSelection => self.clear_selection(),
        }
    }

    /// Apply a batch in order. Returns `true` if any mutation changed the graph.
    pub fn apply_all(&mut self, mutations: impl IntoIterator<Item = GraphMutation>) -> bool {
        let mut changed = false;
        for mutation in mutations {
            changed |= self.apply_mutation(mutation);
        }
        changed
    }
}
