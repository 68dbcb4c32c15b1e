//! Virtual table: a logical grid view over a table element
//!
//! A `VirtualTable` projects a `<table>` onto a rectangular grid. Distinct
//! cells live in an arena; the grid stores arena indices, so a merged cell
//! occupies several grid slots that all resolve to the same record.
//! Unclaimed slots of irregular tables stay empty rather than failing.
//!
//! Instances are derived, disposable views: each editing operation builds
//! its own, mutates the grid in memory, writes back once, and drops it.
//! The table element's lifetime belongs to the document tree.

use std::collections::HashSet;

use crate::dom::NodeRef;
use crate::models::Coordinate;
use crate::table::format::{cell_width_for_columns, TableFormat};

/// Index of a distinct cell record in the arena.
pub type CellId = usize;

/// A cell as seen through the grid. `td` is `None` for the placeholder
/// returned on out-of-bounds or unclaimed slots.
#[derive(Clone, Debug, Default)]
pub struct VCell {
    pub td: Option<NodeRef>,
}

pub struct VirtualTable {
    /// The owning table element. The grid is a view; the tree owns the node.
    pub table: NodeRef,
    /// Distinct cell records.
    arena: Vec<VCell>,
    /// Row-major grid of arena indices. `None` marks an unclaimed slot.
    pub cells: Vec<Vec<Option<CellId>>>,
    /// Grid coordinates of the current cell.
    pub row: usize,
    pub col: usize,
    /// Selection rectangle scoping bulk operations.
    pub start_range: Option<Coordinate>,
    pub end_range: Option<Coordinate>,
}

impl VirtualTable {
    /// Build the grid from a table element. Cells claim `rowspan` ×
    /// `colspan` slots starting at the first unclaimed slot of their row;
    /// slots already claimed by an earlier spanning cell are skipped.
    pub fn from_table(table: &NodeRef) -> VirtualTable {
        let mut vtable = VirtualTable {
            table: table.clone(),
            arena: Vec::new(),
            cells: Vec::new(),
            row: 0,
            col: 0,
            start_range: None,
            end_range: None,
        };
        for (r, tr) in collect_rows(table).iter().enumerate() {
            vtable.ensure_row(r);
            let mut c = 0;
            for td in tr.children() {
                if !(td.is_tag("td") || td.is_tag("th")) {
                    continue;
                }
                while vtable.slot(r, c).is_some() {
                    c += 1;
                }
                let row_span = td.attr_usize("rowspan", 1);
                let col_span = td.attr_usize("colspan", 1);
                let id = vtable.arena.len();
                vtable.arena.push(VCell { td: Some(td.clone()) });
                for rr in r..r + row_span {
                    vtable.ensure_row(rr);
                    for cc in c..c + col_span {
                        vtable.ensure_slot(rr, cc);
                        // An overlapping claim keeps the earlier owner.
                        if vtable.cells[rr][cc].is_none() {
                            vtable.cells[rr][cc] = Some(id);
                        }
                    }
                }
                c += col_span;
            }
        }
        vtable.normalize_grid();
        vtable
    }

    /// Build from a cell, recording the cell's origin slot as current.
    /// Returns `None` when the node has no containing table.
    pub fn from_cell(cell: &NodeRef) -> Option<VirtualTable> {
        let td = cell.closest(&["TD", "TH"])?;
        let table = td.closest(&["TABLE"])?;
        let mut vtable = VirtualTable::from_table(&table);
        let (row, col) = vtable.find_cell(&td)?;
        vtable.row = row;
        vtable.col = col;
        Some(vtable)
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    /// Cell at a grid coordinate. Out-of-bounds (including negative)
    /// coordinates and unclaimed slots return the null-cell placeholder;
    /// this never fails.
    pub fn get_cell(&self, row: isize, col: isize) -> VCell {
        if row < 0 || col < 0 {
            return VCell::default();
        }
        match self.slot(row as usize, col as usize) {
            Some(id) => self.arena[id].clone(),
            None => VCell::default(),
        }
    }

    /// Arena index at a grid coordinate, if the slot is claimed.
    pub fn slot(&self, row: usize, col: usize) -> Option<CellId> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// True when (row, col) is the top-left slot of its cell.
    pub fn is_origin(&self, row: usize, col: usize) -> bool {
        match self.slot(row, col) {
            None => false,
            Some(id) => {
                (row == 0 || self.slot(row - 1, col) != Some(id))
                    && (col == 0 || self.slot(row, col - 1) != Some(id))
            }
        }
    }

    /// True when the slot continues the cell to its left.
    pub fn is_spanned_left(&self, row: usize, col: usize) -> bool {
        col > 0 && self.slot(row, col).is_some() && self.slot(row, col) == self.slot(row, col - 1)
    }

    /// True when the slot continues the cell above it.
    pub fn is_spanned_above(&self, row: usize, col: usize) -> bool {
        row > 0 && self.slot(row, col).is_some() && self.slot(row, col) == self.slot(row - 1, col)
    }

    /// Grid coordinates of the origin slot of the cell owning `td`.
    pub fn find_cell(&self, td: &NodeRef) -> Option<(usize, usize)> {
        for r in 0..self.row_count() {
            for c in 0..self.cells[r].len() {
                if let Some(id) = self.cells[r][c] {
                    if let Some(owned) = &self.arena[id].td {
                        if owned.same(td) {
                            return Some((r, c));
                        }
                    }
                }
            }
        }
        None
    }

    /// Bounding rectangle (r0, c0, r1, c1) of the cell's claimed slots.
    pub fn extent_of(&self, id: CellId) -> Option<(usize, usize, usize, usize)> {
        let mut extent: Option<(usize, usize, usize, usize)> = None;
        for r in 0..self.row_count() {
            for c in 0..self.cells[r].len() {
                if self.cells[r][c] == Some(id) {
                    extent = Some(match extent {
                        None => (r, c, r, c),
                        Some((r0, c0, r1, c1)) => (r0.min(r), c0.min(c), r1.max(r), c1.max(c)),
                    });
                }
            }
        }
        extent
    }

    pub fn current_cell_id(&self) -> Option<CellId> {
        self.slot(self.row, self.col)
    }

    /// Normalized selection rectangle (r0, c0, r1, c1) clamped to the
    /// grid, if both corners are set.
    pub fn selection_rect(&self) -> Option<(usize, usize, usize, usize)> {
        let start = self.start_range?;
        let end = self.end_range?;
        if self.row_count() == 0 || self.column_count() == 0 {
            return None;
        }
        let max_row = self.row_count() - 1;
        let max_col = self.column_count() - 1;
        Some((
            start.y.min(end.y).min(max_row),
            start.x.min(end.x).min(max_col),
            start.y.max(end.y).min(max_row),
            start.x.max(end.x).min(max_col),
        ))
    }

    /// Invoke `callback` once per distinct cell inside the selection
    /// rectangle, in row-major order of each cell's first covered slot.
    /// A merged cell spanning several slots is visited once.
    pub fn for_each_selected_cell(&self, mut callback: impl FnMut(&VCell)) {
        let Some((r0, c0, r1, c1)) = self.selection_rect() else {
            return;
        };
        let mut seen: HashSet<CellId> = HashSet::new();
        for r in r0..=r1 {
            for c in c0..=c1 {
                if let Some(id) = self.slot(r, c) {
                    if seen.insert(id) {
                        callback(&self.arena[id]);
                    }
                }
            }
        }
    }

    /// Remove the selected slots from the grid. With `keep_content` the
    /// removed cells' contents move into the nearest surviving cell of the
    /// selection's first row; otherwise they are discarded with the cells.
    /// Cells spanning across the rectangle boundary simply shrink: their
    /// spans are re-derived from the remaining slots at write-back.
    pub fn remove_cells_by_selection(&mut self, keep_content: bool) {
        let Some((r0, c0, r1, c1)) = self.selection_rect() else {
            return;
        };
        if keep_content {
            let target = self.nearest_surviving_cell(r0, c0, c1);
            if let Some(target_td) = target {
                let mut moved: HashSet<CellId> = HashSet::new();
                for r in r0..=r1 {
                    for c in c0..=c1 {
                        if let Some(id) = self.slot(r, c) {
                            if moved.insert(id) {
                                if let Some(td) = self.arena[id].td.clone() {
                                    if !td.same(&target_td) {
                                        for child in td.children() {
                                            target_td.append_child(&child);
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        for r in r0..=r1 {
            let row = &mut self.cells[r];
            let end = (c1 + 1).min(row.len());
            if c0 < end {
                row.drain(c0..end);
            }
        }
        self.normalize_grid();
        self.row = self.row.min(self.row_count().saturating_sub(1));
        self.col = self.col.min(self.column_count().saturating_sub(1));
        log::debug!(
            "removed cells ({},{})-({},{}), grid now {}x{}",
            r0,
            c0,
            r1,
            c1,
            self.row_count(),
            self.column_count()
        );
    }

    fn nearest_surviving_cell(&self, row: usize, c0: usize, c1: usize) -> Option<NodeRef> {
        let width = self.cells.get(row)?.len();
        let candidate = if c0 > 0 {
            self.slot(row, c0 - 1)
        } else if c1 + 1 < width {
            self.slot(row, c1 + 1)
        } else {
            None
        };
        candidate.and_then(|id| self.arena[id].td.clone())
    }

    /// Insert a row adjacent to the current cell. Cells whose span crosses
    /// the insertion seam grow by one row; every other column gets a fresh
    /// cell modeled on the current row's cell in that column. Returns the
    /// grid index of the inserted row.
    pub fn insert_row(&mut self, above: bool) -> usize {
        if self.row_count() == 0 {
            return 0;
        }
        let (r0, _, r1, _) = self
            .current_cell_id()
            .and_then(|id| self.extent_of(id))
            .unwrap_or((self.row, self.col, self.row, self.col));
        let index = if above { r0 } else { r1 + 1 };
        let width = self.column_count();
        let mut new_row: Vec<Option<CellId>> = Vec::with_capacity(width);
        for c in 0..width {
            let above_id = if index > 0 { self.slot(index - 1, c) } else { None };
            let below_id = if index < self.row_count() { self.slot(index, c) } else { None };
            if above_id.is_some() && above_id == below_id {
                new_row.push(above_id);
            } else {
                let template = self.slot(self.row, c).and_then(|id| self.arena[id].td.clone());
                new_row.push(Some(self.new_arena_cell(template.as_ref())));
            }
        }
        self.cells.insert(index, new_row);
        if above {
            self.row += 1;
        }
        log::debug!("inserted row at {}, grid now {} rows", index, self.row_count());
        index
    }

    /// Insert a column adjacent to the current cell; the symmetric
    /// counterpart of `insert_row`. Returns the grid index of the inserted
    /// column.
    pub fn insert_column(&mut self, left: bool) -> usize {
        if self.column_count() == 0 {
            return 0;
        }
        let (_, c0, _, c1) = self
            .current_cell_id()
            .and_then(|id| self.extent_of(id))
            .unwrap_or((self.row, self.col, self.row, self.col));
        let index = if left { c0 } else { c1 + 1 };
        let mut additions: Vec<Option<CellId>> = Vec::with_capacity(self.row_count());
        for r in 0..self.row_count() {
            let left_id = if index > 0 { self.slot(r, index - 1) } else { None };
            let right_id = self.slot(r, index);
            if left_id.is_some() && left_id == right_id {
                additions.push(left_id);
            } else {
                let template = self.slot(r, self.col).and_then(|id| self.arena[id].td.clone());
                additions.push(Some(self.new_arena_cell(template.as_ref())));
            }
        }
        for (r, addition) in additions.into_iter().enumerate() {
            let row = &mut self.cells[r];
            let at = index.min(row.len());
            row.insert(at, addition);
        }
        if left {
            self.col += 1;
        }
        log::debug!("inserted column at {}, grid now {} columns", index, self.column_count());
        index
    }

    /// Delete the current row. Cells spanning other rows keep their
    /// remaining slots; cells living only here become unreferenced and are
    /// dropped at write-back.
    pub fn delete_row(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let index = self.row.min(self.row_count() - 1);
        self.cells.remove(index);
        self.row = self.row.min(self.row_count().saturating_sub(1));
        log::debug!("deleted row {}, grid now {} rows", index, self.row_count());
    }

    /// Delete the current column.
    pub fn delete_column(&mut self) {
        if self.column_count() == 0 {
            return;
        }
        let index = self.col.min(self.column_count() - 1);
        for row in &mut self.cells {
            if index < row.len() {
                row.remove(index);
            }
        }
        self.col = self.col.min(self.column_count().saturating_sub(1));
        log::debug!("deleted column {}, grid now {} columns", index, self.column_count());
    }

    /// Merge the selection rectangle into its top-left cell. Contents of
    /// the other distinct cells are appended to the surviving cell.
    pub fn merge_selection(&mut self) {
        let Some((r0, c0, r1, c1)) = self.selection_rect() else {
            return;
        };
        let target_id = match self.first_cell_in_rect(r0, c0, r1, c1) {
            Some(id) => id,
            None => return,
        };
        let target_td = self.arena[target_id].td.clone();
        let mut moved: HashSet<CellId> = HashSet::new();
        moved.insert(target_id);
        for r in r0..=r1 {
            for c in c0..=c1 {
                if let Some(id) = self.slot(r, c) {
                    if moved.insert(id) {
                        if let (Some(target), Some(source)) = (&target_td, self.arena[id].td.clone()) {
                            for child in source.children() {
                                target.append_child(&child);
                            }
                        }
                    }
                }
                self.cells[r][c] = Some(target_id);
            }
        }
        self.row = r0;
        self.col = c0;
    }

    /// Split the current cell in two along a vertical seam. A cell
    /// spanning several columns is halved; a single-column cell gets a new
    /// grid column in which every other cell extends its span.
    pub fn split_horizontally(&mut self) {
        let Some(id) = self.current_cell_id() else {
            return;
        };
        let Some((r0, c0, r1, c1)) = self.extent_of(id) else {
            return;
        };
        if c1 > c0 {
            let mid = c0 + (c1 - c0 + 1) / 2;
            let template = self.arena[id].td.clone();
            let new_id = self.new_arena_cell(template.as_ref());
            for r in r0..=r1 {
                for c in mid..=c1 {
                    if self.cells[r][c] == Some(id) {
                        self.cells[r][c] = Some(new_id);
                    }
                }
            }
        } else {
            let template = self.arena[id].td.clone();
            let new_id = self.new_arena_cell(template.as_ref());
            let mut additions: Vec<Option<CellId>> = Vec::with_capacity(self.row_count());
            for r in 0..self.row_count() {
                if self.slot(r, c0) == Some(id) && (r0..=r1).contains(&r) {
                    additions.push(Some(new_id));
                } else {
                    additions.push(self.slot(r, c0));
                }
            }
            for (r, addition) in additions.into_iter().enumerate() {
                let row = &mut self.cells[r];
                let at = (c0 + 1).min(row.len());
                row.insert(at, addition);
            }
        }
    }

    /// Split the current cell along a horizontal seam; the vertical
    /// counterpart of `split_horizontally`.
    pub fn split_vertically(&mut self) {
        let Some(id) = self.current_cell_id() else {
            return;
        };
        let Some((r0, c0, r1, c1)) = self.extent_of(id) else {
            return;
        };
        if r1 > r0 {
            let mid = r0 + (r1 - r0 + 1) / 2;
            let template = self.arena[id].td.clone();
            let new_id = self.new_arena_cell(template.as_ref());
            for r in mid..=r1 {
                for c in c0..=c1 {
                    if self.cells[r][c] == Some(id) {
                        self.cells[r][c] = Some(new_id);
                    }
                }
            }
        } else {
            let template = self.arena[id].td.clone();
            let new_id = self.new_arena_cell(template.as_ref());
            let width = self.column_count();
            let mut new_row: Vec<Option<CellId>> = Vec::with_capacity(width);
            for c in 0..width {
                if self.slot(r0, c) == Some(id) && (c0..=c1).contains(&c) {
                    new_row.push(Some(new_id));
                } else {
                    new_row.push(self.slot(r0, c));
                }
            }
            self.cells.insert(r0 + 1, new_row);
        }
    }

    /// Regenerate the table element's rows and cells from the grid.
    ///
    /// Each origin slot emits its cell with spans re-derived from the
    /// contiguous run of slots it still owns; slots covered by an emitted
    /// span are skipped even if bookkeeping left a different record there,
    /// and unclaimed holes are synthesized as empty cells, so the result is
    /// always a geometrically consistent table. Writing back an unmodified
    /// grid reproduces an equivalent table.
    pub fn write_back(&mut self) {
        let rows = self.row_count();
        let width = self.column_count();
        let mut covered = vec![vec![false; width]; rows];
        self.table.clear_children();
        for r in 0..rows {
            let tr = NodeRef::element("tr");
            for c in 0..width {
                if covered[r][c] {
                    continue;
                }
                match self.slot(r, c) {
                    Some(id) if self.is_origin(r, c) => {
                        let td = match self.arena[id].td.clone() {
                            Some(td) => td,
                            None => empty_cell(),
                        };
                        let mut col_span = 1;
                        while c + col_span < width && self.slot(r, c + col_span) == Some(id) {
                            col_span += 1;
                        }
                        let mut row_span = 1;
                        while r + row_span < rows && self.slot(r + row_span, c) == Some(id) {
                            row_span += 1;
                        }
                        set_span_attr(&td, "colspan", col_span);
                        set_span_attr(&td, "rowspan", row_span);
                        for rr in r..r + row_span {
                            for cc in c..c + col_span {
                                covered[rr][cc] = true;
                            }
                        }
                        tr.append_child(&td);
                    }
                    Some(_) => {
                        // Non-origin slot whose origin's span did not cover
                        // it: irregular bookkeeping, degrade to a hole.
                        covered[r][c] = true;
                        tr.append_child(&empty_cell());
                    }
                    None => {
                        covered[r][c] = true;
                        tr.append_child(&empty_cell());
                    }
                }
            }
            self.table.append_child(&tr);
        }
        log::debug!("wrote back table as {}x{} grid", rows, width);
    }

    /// Apply a uniform visual format: table background, cell borders, and
    /// the column-count width bands.
    pub fn apply_format(&mut self, format: &TableFormat) {
        self.table.set_attr("cellspacing", "0");
        self.table.set_attr("cellpadding", "1");
        self.table.set_style("border-collapse", "collapse");
        self.table
            .set_style("background-color", &format.background_color);
        let width = cell_width_for_columns(self.column_count());
        let border = format!("1px solid {}", format.border_color);
        for cell in &self.arena {
            if let Some(td) = &cell.td {
                td.set_style("border", &border);
                td.set_style("width", width);
            }
        }
    }

    fn first_cell_in_rect(&self, r0: usize, c0: usize, r1: usize, c1: usize) -> Option<CellId> {
        for r in r0..=r1 {
            for c in c0..=c1 {
                if let Some(id) = self.slot(r, c) {
                    return Some(id);
                }
            }
        }
        None
    }

    fn new_arena_cell(&mut self, template: Option<&NodeRef>) -> CellId {
        let td = match template {
            Some(template) => {
                let td = template.shallow_clone_element();
                td.remove_attr("rowspan");
                td.remove_attr("colspan");
                td.append_child(&NodeRef::element("br"));
                td
            }
            None => empty_cell(),
        };
        let id = self.arena.len();
        self.arena.push(VCell { td: Some(td) });
        id
    }

    fn ensure_row(&mut self, row: usize) {
        while self.cells.len() <= row {
            self.cells.push(Vec::new());
        }
    }

    fn ensure_slot(&mut self, row: usize, col: usize) {
        let r = &mut self.cells[row];
        while r.len() <= col {
            r.push(None);
        }
    }

    /// Pad every row to the widest row so the grid is rectangular.
    fn normalize_grid(&mut self) {
        let width = self.cells.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut self.cells {
            while row.len() < width {
                row.push(None);
            }
        }
    }
}

/// Table rows in visual order, looking through section wrappers.
fn collect_rows(table: &NodeRef) -> Vec<NodeRef> {
    let mut rows = Vec::new();
    for child in table.children() {
        if child.is_tag("tr") {
            rows.push(child);
        } else if child.is_tag("thead") || child.is_tag("tbody") || child.is_tag("tfoot") {
            for inner in child.children() {
                if inner.is_tag("tr") {
                    rows.push(inner);
                }
            }
        }
    }
    rows
}

fn empty_cell() -> NodeRef {
    let td = NodeRef::element("td");
    td.append_child(&NodeRef::element("br"));
    td
}

fn set_span_attr(td: &NodeRef, name: &str, value: usize) {
    if value > 1 {
        td.set_attr(name, &value.to_string());
    } else {
        td.remove_attr(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_html;

    /// 3x3 table with a 2x2 merged cell at the top left.
    fn merged_table() -> NodeRef {
        parse_html(
            "<table>\
             <tr><td rowspan=\"2\" colspan=\"2\">a</td><td>b</td></tr>\
             <tr><td>c</td></tr>\
             <tr><td>d</td><td>e</td><td>f</td></tr>\
             </table>",
        )
        .unwrap()
        .remove(0)
    }

    #[test]
    fn test_grid_span_projection() {
        let vtable = VirtualTable::from_table(&merged_table());
        assert_eq!(vtable.row_count(), 3);
        assert_eq!(vtable.column_count(), 3);

        let merged = vtable.get_cell(0, 0).td.unwrap();
        for (r, c) in [(0, 1), (1, 0), (1, 1)] {
            let cell = vtable.get_cell(r, c).td.unwrap();
            assert!(cell.same(&merged), "slot ({},{}) should alias the merged cell", r, c);
        }
        assert!(!vtable.get_cell(0, 2).td.unwrap().same(&merged));
    }

    #[test]
    fn test_get_cell_out_of_bounds_returns_placeholder() {
        let vtable = VirtualTable::from_table(&merged_table());
        assert!(vtable.get_cell(-1, 0).td.is_none());
        assert!(vtable.get_cell(0, -1).td.is_none());
        assert!(vtable.get_cell(3, 0).td.is_none());
        assert!(vtable.get_cell(0, 99).td.is_none());
    }

    #[test]
    fn test_for_each_selected_cell_deduplicates_spans() {
        let mut vtable = VirtualTable::from_table(&merged_table());
        vtable.start_range = Some(Coordinate::new(0, 0));
        vtable.end_range = Some(Coordinate::new(2, 2));

        let mut visited = Vec::new();
        vtable.for_each_selected_cell(|cell| {
            visited.push(cell.td.clone().unwrap());
        });

        // 2x2 merged cell counts once: a, b, c, d, e, f
        assert_eq!(visited.len(), 6);
        let merged = vtable.get_cell(0, 0).td.unwrap();
        assert_eq!(visited.iter().filter(|td| td.same(&merged)).count(), 1);
    }

    #[test]
    fn test_selection_rect_partial_is_none() {
        let mut vtable = VirtualTable::from_table(&merged_table());
        vtable.start_range = Some(Coordinate::new(0, 0));
        assert_eq!(vtable.selection_rect(), None);
        let mut count = 0;
        vtable.for_each_selected_cell(|_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_write_back_is_idempotent() {
        let table = merged_table();
        let mut vtable = VirtualTable::from_table(&table);
        vtable.write_back();
        let first = crate::dom::to_html(&table);

        let mut again = VirtualTable::from_table(&table);
        again.write_back();
        assert_eq!(crate::dom::to_html(&table), first);
        assert!(first.contains("rowspan=\"2\""));
        assert!(first.contains("colspan=\"2\""));
    }

    #[test]
    fn test_insert_row_below_extends_crossing_span() {
        let table = merged_table();
        let mut vtable = VirtualTable::from_cell(&table.child(0).unwrap().child(0).unwrap()).unwrap();
        // Current cell is the 2x2 merge; inserting below lands after its extent.
        vtable.insert_row(false);
        assert_eq!(vtable.row_count(), 4);
        // New row is all fresh cells (seam is below the span).
        for c in 0..3 {
            assert!(vtable.is_origin(2, c), "column {} should be a fresh cell", c);
        }
    }

    #[test]
    fn test_insert_row_through_span_extends_it() {
        let table = merged_table();
        // Current cell: "c" at grid (1, 2).
        let c_td = table.child(1).unwrap().child(0).unwrap();
        let mut vtable = VirtualTable::from_cell(&c_td).unwrap();
        assert_eq!((vtable.row, vtable.col), (1, 2));
        vtable.insert_row(true);
        // Seam runs between rows 0 and 1, through the 2x2 span.
        let merged = vtable.get_cell(0, 0).td.unwrap();
        assert!(vtable.get_cell(1, 0).td.unwrap().same(&merged));
        assert!(vtable.get_cell(1, 1).td.unwrap().same(&merged));
        assert!(vtable.get_cell(1, 2).td.is_some());
        assert!(!vtable.get_cell(1, 2).td.unwrap().same(&merged));
        assert_eq!(vtable.row, 2);
    }

    #[test]
    fn test_delete_column_through_span_shrinks_it() {
        let table = merged_table();
        let mut vtable = VirtualTable::from_cell(&table.child(0).unwrap().child(0).unwrap()).unwrap();
        vtable.delete_column();
        vtable.write_back();
        let html = crate::dom::to_html(&table);
        assert!(!html.contains("colspan"), "span should shrink to one column: {}", html);
        assert!(html.contains("rowspan=\"2\""));
        assert_eq!(vtable.column_count(), 2);
    }

    #[test]
    fn test_remove_cells_by_selection_keeps_grid_consistent() {
        let table = merged_table();
        let mut vtable = VirtualTable::from_table(&table);
        vtable.start_range = Some(Coordinate::new(2, 0));
        vtable.end_range = Some(Coordinate::new(2, 2));
        vtable.remove_cells_by_selection(false);
        vtable.write_back();

        assert_eq!(vtable.column_count(), 2);
        assert_eq!(table.child_count(), 3);

        // Re-projecting the written table yields a fully claimed 3x2 grid:
        // no dangling spans survive the removal.
        let reread = VirtualTable::from_table(&table);
        assert_eq!(reread.row_count(), 3);
        assert_eq!(reread.column_count(), 2);
        for r in 0..3 {
            for c in 0..2 {
                assert!(
                    reread.get_cell(r as isize, c as isize).td.is_some(),
                    "slot ({},{}) should be claimed",
                    r,
                    c
                );
            }
        }
    }

    #[test]
    fn test_merge_selection_moves_content() {
        let table = parse_html(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>",
        )
        .unwrap()
        .remove(0);
        let mut vtable = VirtualTable::from_table(&table);
        vtable.start_range = Some(Coordinate::new(0, 0));
        vtable.end_range = Some(Coordinate::new(1, 0));
        vtable.merge_selection();
        vtable.write_back();

        let html = crate::dom::to_html(&table);
        assert!(html.contains("colspan=\"2\""));
        let first_td = table.child(0).unwrap().child(0).unwrap();
        assert_eq!(first_td.inner_text(), "ab");
    }

    #[test]
    fn test_irregular_table_gets_null_placeholders() {
        // Second row is short; the grid pads it with a hole.
        let table = parse_html("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>")
            .unwrap()
            .remove(0);
        let vtable = VirtualTable::from_table(&table);
        assert_eq!(vtable.column_count(), 2);
        assert!(vtable.get_cell(1, 1).td.is_none());
    }

    #[test]
    fn test_write_back_synthesizes_holes() {
        let table = parse_html("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>")
            .unwrap()
            .remove(0);
        let mut vtable = VirtualTable::from_table(&table);
        vtable.write_back();
        let second_row = table.child(1).unwrap();
        assert_eq!(second_row.child_count(), 2);
        assert_eq!(second_row.child(1).unwrap().inner_text(), "");
    }

    #[test]
    fn test_apply_format_sets_width_bands() {
        let table = parse_html(
            "<table><tr><td>1</td><td>2</td><td>3</td><td>4</td><td>5</td></tr></table>",
        )
        .unwrap()
        .remove(0);
        let mut vtable = VirtualTable::from_table(&table);
        vtable.apply_format(&TableFormat::default());

        assert_eq!(vtable.table.style("background-color").as_deref(), Some("#FFF"));
        let td = vtable.get_cell(0, 0).td.unwrap();
        assert_eq!(td.style("width").as_deref(), Some("100px"));
        assert_eq!(td.style("border").as_deref(), Some("1px solid #ABABAB"));
    }

    #[test]
    fn test_split_horizontally_single_column_cell() {
        let table = parse_html("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>")
            .unwrap()
            .remove(0);
        let a_td = table.child(0).unwrap().child(0).unwrap();
        let mut vtable = VirtualTable::from_cell(&a_td).unwrap();
        vtable.split_horizontally();
        vtable.write_back();

        assert_eq!(vtable.column_count(), 3);
        // Cells in other rows extend across the new column.
        let html = crate::dom::to_html(&table);
        assert!(html.contains("colspan=\"2\""));
    }
}
