//! Table detection: bordered grids from vector segments, borderless
//! regions from column alignment scoring.
//!
//! The bordered strategy clusters the page's horizontal and vertical
//! segments into grid lines and assigns line spans to the cells they fall
//! in; a valid grid is trusted outright (confidence 1.0). The borderless
//! strategy scores deferred candidate regions on four component heuristics
//! and accepts only when the weighted composite clears the configured
//! threshold. Rejected candidates are re-classified as ordinary text, so
//! no input is ever dropped.

use crate::config::Settings;
use crate::geom::BBox;
use crate::input::Segment;
use crate::model::{Table, TableScore};

use super::classify::{classify_fallback, Run, RunClass};
use super::lines::Line;

/// Orientation tolerance for treating a segment as axis-aligned.
const AXIS_TOLERANCE: f32 = 2.0;

/// Collinear merge tolerance when clustering segments into grid lines.
const CLUSTER_TOLERANCE: f32 = 3.0;

/// A run resolved against table detection: either a table or a text run
/// passed through to block materialization.
#[derive(Debug, Clone)]
pub(crate) enum Resolved {
    Run(Run),
    Table { table: Table, bbox: BBox },
}

/// A clustered grid line: its position on one axis and its extent along
/// the other.
#[derive(Debug, Clone, Copy)]
struct GridLine {
    position: f32,
    lo: f32,
    hi: f32,
}

impl GridLine {
    fn length(&self) -> f32 {
        self.hi - self.lo
    }
}

/// A bordered grid: row band boundaries (ys) and column boundaries (xs).
#[derive(Debug, Clone)]
struct Grid {
    ys: Vec<f32>,
    xs: Vec<f32>,
    bbox: BBox,
}

impl Grid {
    fn contains(&self, bbox: &BBox) -> bool {
        self.bbox.contains_point(bbox.x_center(), bbox.y_center())
    }

    fn row_of(&self, y: f32) -> Option<usize> {
        self.ys.windows(2).position(|w| y >= w[0] && y < w[1])
    }

    fn column_of(&self, x: f32) -> Option<usize> {
        self.xs.windows(2).position(|w| x >= w[0] && x < w[1])
    }
}

/// Resolve classified runs against the page's vector segments.
///
/// Runs falling inside a detected grid are consumed into one bordered
/// table each, emitted at the position of the grid's first run. Deferred
/// borderless candidates are scored; rejections fall back to default
/// paragraph and list handling.
pub(crate) fn resolve_tables(
    runs: Vec<Run>,
    segments: &[Segment],
    settings: &Settings,
) -> Vec<Resolved> {
    let grids = detect_grids(segments, settings);

    enum Slot {
        Grid(usize),
        Plain(Run),
    }

    let mut grid_lines: Vec<Vec<Line>> = grids.iter().map(|_| Vec::new()).collect();
    let mut slots: Vec<Slot> = Vec::new();

    for run in runs {
        let bbox = run.bbox();
        match grids.iter().position(|g| g.contains(&bbox)) {
            Some(gi) => {
                if grid_lines[gi].is_empty() {
                    slots.push(Slot::Grid(gi));
                }
                grid_lines[gi].extend(run.lines);
            }
            None => slots.push(Slot::Plain(run)),
        }
    }

    let mut resolved = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Slot::Grid(gi) => {
                let table = fill_grid(&grids[gi], &grid_lines[gi]);
                log::debug!(
                    "bordered table: {} rows x {} columns",
                    table.row_count(),
                    table.column_count()
                );
                resolved.push(Resolved::Table {
                    table,
                    bbox: grids[gi].bbox,
                });
            }
            Slot::Plain(run) if run.class == RunClass::TableCandidate => {
                match score_borderless(&run.lines, settings) {
                    Some(table) => {
                        let bbox = run.bbox();
                        resolved.push(Resolved::Table { table, bbox });
                    }
                    None => {
                        log::debug!(
                            "borderless candidate rejected, {} lines fall back to text",
                            run.lines.len()
                        );
                        resolved.extend(
                            classify_fallback(run.lines, settings)
                                .into_iter()
                                .map(Resolved::Run),
                        );
                    }
                }
            }
            Slot::Plain(run) => resolved.push(Resolved::Run(run)),
        }
    }
    resolved
}

/// Detect bordered grids from the page's vector segments.
fn detect_grids(segments: &[Segment], settings: &Settings) -> Vec<Grid> {
    let horizontals: Vec<(f32, f32, f32)> = segments
        .iter()
        .filter(|s| s.is_horizontal(AXIS_TOLERANCE))
        .map(|s| ((s.y0 + s.y1) * 0.5, s.x0.min(s.x1), s.x0.max(s.x1)))
        .collect();
    let verticals: Vec<(f32, f32, f32)> = segments
        .iter()
        .filter(|s| s.is_vertical(AXIS_TOLERANCE))
        .map(|s| ((s.x0 + s.x1) * 0.5, s.y0.min(s.y1), s.y0.max(s.y1)))
        .collect();

    let h_lines = cluster_grid_lines(horizontals, settings.edge_min_length);
    let v_lines = cluster_grid_lines(verticals, settings.edge_min_length);

    if h_lines.is_empty() || v_lines.is_empty() {
        return vec![];
    }

    let mut grids = Vec::new();
    for band in split_line_bands(&h_lines) {
        let y_min = band.first().map(|l| l.position).unwrap_or(0.0);
        let y_max = band.last().map(|l| l.position).unwrap_or(0.0);
        let height = y_max - y_min;

        // Verticals must span at least half the band to belong to it.
        let mut xs: Vec<f32> = v_lines
            .iter()
            .filter(|v| {
                let overlap = v.hi.min(y_max) - v.lo.max(y_min);
                height > 0.0 && overlap >= height * 0.5
            })
            .map(|v| v.position)
            .collect();
        xs.sort_by(f32::total_cmp);

        // A grid needs min_rows row bands and at least two column bands.
        if band.len() >= settings.min_rows + 1 && xs.len() >= 3 {
            let ys: Vec<f32> = band.iter().map(|l| l.position).collect();
            let bbox = BBox::new(xs[0], ys[0], xs[xs.len() - 1], ys[ys.len() - 1]);
            grids.push(Grid { ys, xs, bbox });
        }
    }
    grids
}

/// Greedy 1-D clustering of segments into grid lines. Segments whose
/// positions fall within the merge tolerance become one line with the
/// union of their extents; lines shorter than `min_length` are discarded.
fn cluster_grid_lines(mut items: Vec<(f32, f32, f32)>, min_length: f32) -> Vec<GridLine> {
    items.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut lines: Vec<GridLine> = Vec::new();
    for (position, lo, hi) in items {
        match lines.last_mut() {
            Some(last) if (position - last.position).abs() <= CLUSTER_TOLERANCE => {
                last.lo = last.lo.min(lo);
                last.hi = last.hi.max(hi);
            }
            _ => lines.push(GridLine { position, lo, hi }),
        }
    }
    lines.retain(|l| l.length() >= min_length);
    lines
}

/// Split sorted horizontal grid lines into bands at unusually large gaps,
/// so two stacked tables do not fuse into one grid.
fn split_line_bands(lines: &[GridLine]) -> Vec<Vec<GridLine>> {
    if lines.is_empty() {
        return vec![];
    }
    let gaps: Vec<f32> = lines
        .windows(2)
        .map(|w| w[1].position - w[0].position)
        .collect();
    let mut sorted = gaps.clone();
    sorted.sort_by(f32::total_cmp);
    let median = sorted.get(sorted.len() / 2).copied().unwrap_or(0.0);

    let mut bands = vec![vec![lines[0]]];
    for (i, line) in lines.iter().enumerate().skip(1) {
        if median > 0.0 && gaps[i - 1] > median * 3.0 {
            bands.push(vec![*line]);
        } else if let Some(last) = bands.last_mut() {
            last.push(*line);
        }
    }
    bands
}

/// Assign line spans to grid cells by their center point.
fn fill_grid(grid: &Grid, lines: &[Line]) -> Table {
    let row_count = grid.ys.len() - 1;
    let column_count = grid.xs.len() - 1;
    let mut cells = vec![vec![String::new(); column_count]; row_count];

    let mut ordered: Vec<&Line> = lines.iter().collect();
    ordered.sort_by(|a, b| {
        a.y_center()
            .total_cmp(&b.y_center())
            .then(a.x0().total_cmp(&b.x0()))
    });

    for line in ordered {
        let Some(row) = grid.row_of(line.y_center()) else {
            continue;
        };
        for span in &line.spans {
            let Some(col) = grid.column_of(span.bbox.x_center()) else {
                continue;
            };
            let cell = &mut cells[row][col];
            if !cell.is_empty() {
                cell.push(' ');
            }
            cell.push_str(span.text.trim());
        }
    }

    Table::new(cells, 1.0, None)
}

/// Score a borderless candidate region. Returns the table when the
/// composite clears the threshold and the region meets the minimum
/// three-row, two-column shape.
fn score_borderless(lines: &[Line], settings: &Settings) -> Option<Table> {
    let columns = cluster_columns(lines, settings.alignment_tolerance);
    let retained: Vec<&ColumnCluster> = columns
        .iter()
        .filter(|c| c.support(lines.len()) >= 0.5)
        .collect();

    let alignment = if retained.is_empty() {
        0.0
    } else {
        retained.iter().map(|c| c.support(lines.len())).sum::<f32>() / retained.len() as f32
    };

    let regularity = row_regularity(lines);

    let rows_component = (lines.len() as f32 / 3.0).min(1.0);
    let cols_component = (retained.len() as f32 / 2.0).min(1.0);
    let size = rows_component * cols_component;

    let content = content_validity(lines);

    let score = TableScore {
        alignment,
        regularity,
        size,
        content,
    };
    let composite = score.composite();
    log::debug!(
        "borderless score: alignment={:.2} regularity={:.2} size={:.2} content={:.2} composite={:.2}",
        alignment,
        regularity,
        size,
        content,
        composite
    );

    let shape_ok =
        lines.len() >= 3.max(settings.min_rows) && retained.len() >= 2;
    if !shape_ok || composite <= settings.table_confidence_threshold {
        return None;
    }

    let rows = build_rows(lines, &retained);
    Some(Table::new(rows, composite, Some(score)))
}

/// One detected column position and the rows supporting it.
#[derive(Debug, Clone)]
struct ColumnCluster {
    center: f32,
    rows: Vec<usize>,
}

impl ColumnCluster {
    /// Fraction of rows with a span starting at this column.
    fn support(&self, total_rows: usize) -> f32 {
        if total_rows == 0 {
            return 0.0;
        }
        let mut distinct = self.rows.clone();
        distinct.dedup();
        distinct.len() as f32 / total_rows as f32
    }
}

/// Cluster span left edges across rows into column positions.
fn cluster_columns(lines: &[Line], tolerance: f32) -> Vec<ColumnCluster> {
    let mut edges: Vec<(f32, usize)> = lines
        .iter()
        .enumerate()
        .flat_map(|(row, line)| line.spans.iter().map(move |s| (s.bbox.x0, row)))
        .collect();
    edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut clusters: Vec<ColumnCluster> = Vec::new();
    for (x0, row) in edges {
        match clusters.last_mut() {
            Some(last) if (x0 - last.center).abs() <= tolerance => {
                let n = last.rows.len() as f32;
                last.center = (last.center * n + x0) / (n + 1.0);
                last.rows.push(row);
            }
            _ => clusters.push(ColumnCluster {
                center: x0,
                rows: vec![row],
            }),
        }
    }
    for cluster in &mut clusters {
        cluster.rows.sort_unstable();
    }
    clusters
}

/// Fraction of rows matching the modal span count.
fn row_regularity(lines: &[Line]) -> f32 {
    if lines.is_empty() {
        return 0.0;
    }
    let mut counts: Vec<usize> = lines.iter().map(|l| l.spans.len()).collect();
    counts.sort_unstable();
    let mut modal = counts[0];
    let mut modal_freq = 0;
    let mut i = 0;
    while i < counts.len() {
        let j = counts[i..].iter().take_while(|&&c| c == counts[i]).count();
        if j > modal_freq {
            modal_freq = j;
            modal = counts[i];
        }
        i += j;
    }
    let matching = lines.iter().filter(|l| l.spans.len() == modal).count();
    matching as f32 / lines.len() as f32
}

/// Fraction of spans carrying real cell content rather than stray
/// single-glyph fragments.
fn content_validity(lines: &[Line]) -> f32 {
    let mut total = 0usize;
    let mut valid = 0usize;
    for line in lines {
        for span in &line.spans {
            total += 1;
            let text = span.text.trim();
            let substantial =
                text.chars().count() >= 2 || text.chars().all(|c| c.is_alphanumeric());
            if !text.is_empty() && substantial {
                valid += 1;
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        valid as f32 / total as f32
    }
}

/// Materialize rows by assigning each span to the nearest retained column.
fn build_rows(lines: &[Line], retained: &[&ColumnCluster]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(lines.len());
    for line in lines {
        let mut cells = vec![String::new(); retained.len()];
        for span in &line.spans {
            let col = retained
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    (span.bbox.x0 - a.center)
                        .abs()
                        .total_cmp(&(span.bbox.x0 - b.center).abs())
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            let cell = &mut cells[col];
            if !cell.is_empty() {
                cell.push(' ');
            }
            cell.push_str(span.text.trim());
        }
        rows.push(cells);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Atom;
    use crate::pipeline::classify::classify_page;
    use crate::pipeline::lines::group_lines;

    fn atom(text: &str, x: f32, y: f32) -> Atom {
        let width = text.chars().count() as f32 * 6.0;
        Atom::new(text, BBox::new(x, y, x + width, y + 12.0), 12.0, "Helvetica")
    }

    fn grid_segments(xs: &[f32], ys: &[f32]) -> Vec<Segment> {
        let mut segments = Vec::new();
        let (x0, x1) = (xs[0], xs[xs.len() - 1]);
        let (y0, y1) = (ys[0], ys[ys.len() - 1]);
        for &y in ys {
            segments.push(Segment::new(x0, y, x1, y));
        }
        for &x in xs {
            segments.push(Segment::new(x, y0, x, y1));
        }
        segments
    }

    fn candidate_lines(words: &[&[&str]], col_xs: &[f32]) -> Vec<super::super::lines::Line> {
        let mut atoms = Vec::new();
        for (row, cells) in words.iter().enumerate() {
            for (col, text) in cells.iter().enumerate() {
                atoms.push(atom(text, col_xs[col], 20.0 + row as f32 * 16.0));
            }
        }
        group_lines(&atoms, &Settings::default())
    }

    #[test]
    fn test_bordered_grid_detection() {
        let xs = [50.0, 150.0, 250.0, 350.0];
        let ys = [100.0, 130.0, 160.0];
        let grids = detect_grids(&grid_segments(&xs, &ys), &Settings::default());
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].ys.len(), 3);
        assert_eq!(grids[0].xs.len(), 4);
    }

    #[test]
    fn test_bordered_cells_filled() {
        let xs = [50.0, 150.0, 250.0, 350.0];
        let ys = [100.0, 130.0, 160.0];
        let mut atoms = Vec::new();
        for (row, y) in [105.0, 135.0].iter().enumerate() {
            for (col, x) in [60.0, 160.0, 260.0].iter().enumerate() {
                atoms.push(atom(&format!("r{row}c{col}"), *x, *y));
            }
        }
        let settings = Settings::default();
        let lines = group_lines(&atoms, &settings);
        let runs = classify_page(lines, 612.0, &settings);
        let resolved = resolve_tables(runs, &grid_segments(&xs, &ys), &settings);

        let tables: Vec<&Table> = resolved
            .iter()
            .filter_map(|r| match r {
                Resolved::Table { table, .. } => Some(table),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 1);
        let table = tables[0];
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.confidence, 1.0);
        assert!(table.score.is_none());
        assert_eq!(table.rows[0][0], "r0c0");
        assert_eq!(table.rows[1][2], "r1c2");
    }

    #[test]
    fn test_short_segments_ignored() {
        // Strokes under edge_min_length never become grid lines.
        let segments = vec![
            Segment::new(50.0, 100.0, 60.0, 100.0),
            Segment::new(50.0, 130.0, 60.0, 130.0),
            Segment::new(50.0, 160.0, 60.0, 160.0),
            Segment::new(50.0, 100.0, 50.0, 160.0),
            Segment::new(55.0, 100.0, 55.0, 160.0),
            Segment::new(60.0, 100.0, 60.0, 160.0),
        ];
        let grids = detect_grids(&segments, &Settings::default());
        assert!(grids.is_empty());
    }

    #[test]
    fn test_borderless_aligned_grid_accepted() {
        let lines = candidate_lines(
            &[
                &["alpha", "beta", "gamma", "delta"],
                &["one", "two", "three", "four"],
                &["red", "green", "blue", "cyan"],
            ],
            &[50.0, 150.0, 250.0, 350.0],
        );
        let table = score_borderless(&lines, &Settings::default()).expect("accepted");
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 4);
        let score = table.score.expect("component scores recorded");
        assert!(score.alignment > 0.9);
        assert!(table.confidence > Settings::default().table_confidence_threshold);
    }

    #[test]
    fn test_borderless_misaligned_rejected() {
        // Offsets beyond the alignment tolerance break column support.
        let mut atoms = Vec::new();
        let offsets = [0.0, 15.0, -15.0];
        for (row, offset) in offsets.iter().enumerate() {
            for (col, text) in ["alpha", "beta", "gamma", "delta"].iter().enumerate() {
                atoms.push(atom(
                    text,
                    50.0 + col as f32 * 120.0 + offset * (1.0 + col as f32),
                    20.0 + row as f32 * 16.0,
                ));
            }
        }
        let lines = group_lines(&atoms, &Settings::default());
        assert!(score_borderless(&lines, &Settings::default()).is_none());
    }

    #[test]
    fn test_rejected_candidate_falls_back_to_text() {
        let mut atoms = Vec::new();
        let offsets = [0.0, 15.0, -15.0];
        for (row, offset) in offsets.iter().enumerate() {
            for (col, text) in ["alpha", "beta", "gamma", "delta"].iter().enumerate() {
                atoms.push(atom(
                    text,
                    50.0 + col as f32 * 120.0 + offset * (1.0 + col as f32),
                    20.0 + row as f32 * 16.0,
                ));
            }
        }
        let settings = Settings::default();
        let lines = group_lines(&atoms, &settings);
        let runs = classify_page(lines, 612.0, &settings);
        let resolved = resolve_tables(runs, &[], &settings);

        assert!(resolved
            .iter()
            .all(|r| matches!(r, Resolved::Run(_))));
        let words: String = resolved
            .iter()
            .filter_map(|r| match r {
                Resolved::Run(run) => Some(
                    run.lines
                        .iter()
                        .map(|l| l.text())
                        .collect::<Vec<_>>()
                        .join(" "),
                ),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ");
        for word in ["alpha", "beta", "gamma", "delta"] {
            assert!(words.contains(word), "lost {word}");
        }
    }

    #[test]
    fn test_two_row_region_not_borderless() {
        let lines = candidate_lines(
            &[
                &["alpha", "beta", "gamma", "delta"],
                &["one", "two", "three", "four"],
            ],
            &[50.0, 150.0, 250.0, 350.0],
        );
        assert!(score_borderless(&lines, &Settings::default()).is_none());
    }
}
