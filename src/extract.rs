//! Solution extraction: fold a satisfying assignment back into placements
//! and belt segments, re-checking the geometric invariants on the way out.
//!
//! Extraction never trusts the encoder: an assignment that decodes into
//! overlapping or touching machines, or into an incoherent belt, is an
//! internal error and aborts the session instead of producing a bogus
//! layout.

use crate::cnf::Model;
use crate::encode::{Anchor, CellModel};
use crate::graph::FlowGraph;
use crate::packing::RectModel;
use crate::types::{BeltSegment, Direction, PlacedBuilding, TileState};

/// Read placements and belt segments out of a satisfying cell model.
pub fn extract_cells(
    graph: &FlowGraph,
    model: &CellModel,
    assignment: &Model,
) -> Result<(Vec<PlacedBuilding>, Vec<BeltSegment>), String> {
    let placements = read_placements(graph, &model.anchors, assignment)?;
    let tiles = read_tiles(graph, model, assignment)?;
    let segments = read_segments(graph, model, assignment, &tiles)?;
    verify(model.width, model.height, &placements, &tiles, &segments)?;
    Ok((placements, segments))
}

/// Read placements out of a satisfying rectangle-packing model. The
/// fallback encoding routes no belts, so segments are always empty.
pub fn extract_rects(
    graph: &FlowGraph,
    model: &RectModel,
    assignment: &Model,
) -> Result<(Vec<PlacedBuilding>, Vec<BeltSegment>), String> {
    let placements = read_placements(graph, &model.anchors, assignment)?;
    for (i, a) in placements.iter().enumerate() {
        for b in &placements[i + 1..] {
            if a.overlaps(b) {
                return Err(format!("machines '{}' and '{}' overlap", a.node_id, b.node_id));
            }
        }
    }
    Ok((placements, Vec::new()))
}

fn read_placements(
    graph: &FlowGraph,
    anchors: &[Vec<Anchor>],
    assignment: &Model,
) -> Result<Vec<PlacedBuilding>, String> {
    let mut placements = Vec::with_capacity(graph.nodes().len());
    for (n, node) in graph.nodes().iter().enumerate() {
        let mut chosen = None;
        for anchor in &anchors[n] {
            if assignment.is_true(anchor.var) {
                if chosen.is_some() {
                    return Err(format!("node '{}' has two anchors set", node.id));
                }
                chosen = Some((anchor.x, anchor.y));
            }
        }
        let (x, y) =
            chosen.ok_or_else(|| format!("node '{}' has no anchor in the model", node.id))?;
        let (long, short) = graph.footprint(n);
        placements.push(PlacedBuilding { node_id: node.id.clone(), x, y, w: long, h: short });
    }
    Ok(placements)
}

fn read_direction(
    assignment: &Model,
    vars: &[varisat::Var; 4],
    filter: fn(Direction) -> bool,
    what: &str,
) -> Result<Direction, String> {
    let mut found = None;
    for d in Direction::ALL {
        if filter(d) && assignment.is_true(vars[d.index()]) {
            if found.is_some() {
                return Err(format!("two {what} directions set on one tile"));
            }
            found = Some(d);
        }
    }
    found.ok_or_else(|| format!("no {what} direction set on a belt tile"))
}

fn read_tiles(
    graph: &FlowGraph,
    model: &CellModel,
    assignment: &Model,
) -> Result<Vec<TileState>, String> {
    let mut tiles = Vec::with_capacity(model.cells.len());
    for (i, cell) in model.cells.iter().enumerate() {
        let flags = [
            assignment.is_true(cell.empty),
            assignment.is_true(cell.machine),
            assignment.is_true(cell.conveyor),
            assignment.is_true(cell.bridge),
        ];
        if flags.iter().filter(|&&f| f).count() != 1 {
            return Err(format!("cell {i} does not have exactly one tile type"));
        }
        let tile = if flags[0] {
            TileState::Empty
        } else if flags[1] {
            let mut owner = None;
            for n in 0..graph.nodes().len() {
                if assignment.is_true(cell.owner[n]) {
                    if owner.is_some() {
                        return Err(format!("cell {i} is owned by two machines"));
                    }
                    owner = Some(n);
                }
            }
            TileState::Machine(owner.ok_or_else(|| format!("machine cell {i} has no owner"))?)
        } else if flags[2] {
            let input = read_direction(assignment, &cell.input, |_| true, "input")?;
            let output = read_direction(assignment, &cell.output, |_| true, "output")?;
            if input == output {
                return Err(format!("conveyor at cell {i} loops back on itself"));
            }
            TileState::Conveyor { input, output }
        } else {
            let vertical_in =
                read_direction(assignment, &cell.input, Direction::is_vertical, "vertical input")?;
            let horizontal_in = read_direction(
                assignment,
                &cell.input,
                |d| !d.is_vertical(),
                "horizontal input",
            )?;
            TileState::Bridge {
                vertical_in,
                vertical_out: vertical_in.opposite(),
                horizontal_in,
                horizontal_out: horizontal_in.opposite(),
            }
        };
        tiles.push(tile);
    }
    Ok(tiles)
}

/// Edge id of the commodity whose axis-usage variable is set at `cell`.
fn carried_edge(
    graph: &FlowGraph,
    model: &CellModel,
    assignment: &Model,
    cell: usize,
    vertical_only: bool,
) -> Option<String> {
    for (k, flow) in model.flows.iter().enumerate() {
        let used = if vertical_only { flow.used_v[cell] } else { flow.used[cell] };
        if assignment.is_true(used) {
            let edge = model.commodities[k].edge;
            return Some(graph.edges()[edge].id.clone());
        }
    }
    None
}

fn read_segments(
    graph: &FlowGraph,
    model: &CellModel,
    assignment: &Model,
    tiles: &[TileState],
) -> Result<Vec<BeltSegment>, String> {
    let mut segments = Vec::new();
    for y in 0..model.height {
        for x in 0..model.width {
            let i = model.cell_index(x, y);
            match tiles[i] {
                TileState::Conveyor { input, output } => segments.push(BeltSegment {
                    x,
                    y,
                    in_dir: input,
                    out_dir: output,
                    is_bridge: false,
                    edge_id: carried_edge(graph, model, assignment, i, false),
                }),
                // Vertical pair first: it is the primary axis by convention.
                TileState::Bridge { vertical_in, vertical_out, .. } => segments.push(BeltSegment {
                    x,
                    y,
                    in_dir: vertical_in,
                    out_dir: vertical_out,
                    is_bridge: true,
                    edge_id: carried_edge(graph, model, assignment, i, true),
                }),
                TileState::Empty | TileState::Machine(_) => {}
            }
        }
    }
    Ok(segments)
}

fn verify(
    width: u32,
    height: u32,
    placements: &[PlacedBuilding],
    tiles: &[TileState],
    segments: &[BeltSegment],
) -> Result<(), String> {
    // Containment and pairwise separation.
    for p in placements {
        if p.x + p.w > width || p.y + p.h > height {
            return Err(format!("machine '{}' leaves the board", p.node_id));
        }
    }
    for (i, a) in placements.iter().enumerate() {
        for b in &placements[i + 1..] {
            if a.overlaps(b) {
                return Err(format!("machines '{}' and '{}' overlap", a.node_id, b.node_id));
            }
            if a.touches(b) {
                return Err(format!(
                    "machines '{}' and '{}' are edge-adjacent",
                    a.node_id, b.node_id
                ));
            }
        }
    }

    // Every machine cell is accounted for by the footprints.
    let machine_cells = tiles.iter().filter(|t| matches!(t, TileState::Machine(_))).count() as u64;
    let expected: u64 = placements.iter().map(|p| (p.w * p.h) as u64).sum();
    if machine_cells != expected {
        return Err(format!("{machine_cells} machine cells, footprints need {expected}"));
    }

    // Belt coherence: each output points at a belt that accepts it, or
    // delivers downward into a machine.
    let at = |x: i64, y: i64| -> Option<&TileState> {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            None
        } else {
            Some(&tiles[(y as u32 * width + x as u32) as usize])
        }
    };
    for s in segments {
        let (dx, dy) = s.out_dir.delta();
        let target = at(s.x as i64 + dx, s.y as i64 + dy);
        let coherent = match target {
            Some(TileState::Conveyor { input, .. }) => *input == s.out_dir.opposite(),
            Some(TileState::Bridge { vertical_in, horizontal_in, .. }) => {
                *vertical_in == s.out_dir.opposite() || *horizontal_in == s.out_dir.opposite()
            }
            Some(TileState::Machine(_)) => s.out_dir == Direction::Down,
            Some(TileState::Empty) | None => false,
        };
        if !coherent {
            return Err(format!(
                "belt at ({}, {}) outputs {:?} into nothing that accepts it",
                s.x, s.y, s.out_dir
            ));
        }
    }

    Ok(())
}
